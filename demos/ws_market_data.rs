//! Example: public market data over the self-healing WebSocket session.
//!
//! Run with: cargo run --example ws_market_data

use bybit_api_client::types::Interval;
use bybit_api_client::ws::{BybitWsClient, StreamEndpoint, topics};
use futures_util::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    tracing_subscriber::fmt::init();

    let client = BybitWsClient::new(StreamEndpoint::PublicLinear)?;
    let session = client.start();

    // Log lifecycle transitions in the background.
    let mut states = session.state_stream();
    tokio::spawn(async move {
        while let Some(state) = states.next().await {
            println!("Session state: {state}");
        }
    });

    session.connect();
    let mut book = session.subscribe(topics::orderbook(50, "BTCUSDT")).await?;
    let mut ticker = session.subscribe(topics::tickers("BTCUSDT")).await?;
    let mut trades = session.subscribe(topics::public_trade("BTCUSDT")).await?;
    let mut klines = session
        .subscribe(topics::kline(Interval::Min1, "BTCUSDT"))
        .await?;

    let mut seen = 0;
    while seen < 40 {
        let message = tokio::select! {
            Some(m) = book.recv() => m,
            Some(m) = ticker.recv() => m,
            Some(m) = trades.recv() => m,
            Some(m) = klines.recv() => m,
            else => break,
        };
        let kind = message.message_type.as_deref().unwrap_or("push");
        println!("{} ({kind}): {}", message.topic, message.data);
        seen += 1;
    }

    session.close().await;
    Ok(())
}
