//! Example: authenticated account and trading flow on testnet.
//!
//! Run with: cargo run --example rest_trading

use std::env;

use bybit_api_client::auth::EnvCredentials;
use bybit_api_client::rest::BybitRestClient;
use bybit_api_client::rest::account::{PositionListRequest, WalletBalanceRequest};
use bybit_api_client::rest::trade::{AmendOrderRequest, CancelOrderRequest, CreateOrderRequest};
use bybit_api_client::types::{AccountType, Category, Network, Side};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    tracing_subscriber::fmt::init();

    let credentials = match EnvCredentials::try_from_env() {
        Some(creds) => creds,
        None => {
            println!("Set BYBIT_API_KEY and BYBIT_API_SECRET (testnet keys) to run this example.");
            return Ok(());
        }
    };

    let client = BybitRestClient::builder()
        .network(Network::Testnet)
        .credentials(credentials)
        .build();

    let offset = client.sync_time().await?;
    println!("Request clock offset: {offset}ms");

    let balance = client
        .get_wallet_balance(&WalletBalanceRequest::new(AccountType::Unified))
        .await?;
    for account in &balance.list {
        for coin in &account.coin {
            println!("{}: wallet balance {}", coin.coin, coin.wallet_balance);
        }
    }

    let positions = client
        .get_positions(&PositionListRequest::new(Category::Linear).settle_coin("USDT"))
        .await?;
    for position in positions.list.iter().filter(|p| p.is_open()) {
        println!(
            "Open position {} {} size {}",
            position.symbol, position.side, position.size
        );
    }

    // Order placement is opt-in. The limit price sits far below market, so
    // the order rests instead of filling.
    if env::var("BYBIT_PLACE_ORDER").is_ok() {
        let order = CreateOrderRequest::limit(
            Category::Linear,
            "BTCUSDT",
            Side::Buy,
            "0.001".parse::<Decimal>()?,
            "10000".parse::<Decimal>()?,
        )
        .post_only();
        let ack = client.create_order(&order).await?;
        println!("Placed order {}", ack.order_id);

        let amend = AmendOrderRequest::by_order_id(Category::Linear, "BTCUSDT", ack.order_id.as_str())
            .price("11000".parse::<Decimal>()?);
        let amended = client.amend_order(&amend).await?;
        println!("Amended order {}", amended.order_id);

        let cancel =
            CancelOrderRequest::by_order_id(Category::Linear, "BTCUSDT", ack.order_id.as_str());
        let cancelled = client.cancel_order(&cancel).await?;
        println!("Cancelled order {}", cancelled.order_id);
    } else {
        println!("Set BYBIT_PLACE_ORDER=1 to place, amend and cancel a resting test order.");
    }

    Ok(())
}
