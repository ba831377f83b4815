//! Example: public REST market data.
//!
//! Run with: cargo run --example rest_market

use bybit_api_client::rest::BybitRestClient;
use bybit_api_client::rest::market::{KlineRequest, OrderbookRequest, TickersRequest};
use bybit_api_client::types::{Category, Interval};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    tracing_subscriber::fmt::init();

    let client = BybitRestClient::new();

    let time = client.get_server_time().await?;
    println!("Server time: {}s", time.time_second);

    let tickers = client
        .get_tickers(&TickersRequest::new(Category::Linear).symbol("BTCUSDT"))
        .await?;
    if let Some(ticker) = tickers.list.first() {
        println!(
            "{}: last={}, 24h volume={}",
            ticker.symbol, ticker.last_price, ticker.volume24h
        );
    }

    let book = client
        .get_orderbook(&OrderbookRequest::new(Category::Linear, "BTCUSDT").limit(5))
        .await?;
    if let (Some(bid), Some(ask)) = (book.bids.first(), book.asks.first()) {
        println!(
            "Top of book: bid {} x {}, ask {} x {}",
            bid.price, bid.size, ask.price, ask.size
        );
    }

    let klines = client
        .get_kline(&KlineRequest::new(Category::Linear, "BTCUSDT", Interval::Hour1).limit(3))
        .await?;
    for kline in &klines.list {
        println!(
            "Kline {}: O={} H={} L={} C={}",
            kline.start_ms, kline.open, kline.high, kline.low, kline.close
        );
    }

    Ok(())
}
