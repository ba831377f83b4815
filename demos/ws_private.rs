//! Example: private order, execution and wallet streams.
//!
//! Run with: cargo run --example ws_private

use std::time::Duration;

use bybit_api_client::auth::EnvCredentials;
use bybit_api_client::ws::{BybitWsClient, StreamEndpoint, topics};
use futures_util::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    tracing_subscriber::fmt::init();

    let credentials = match EnvCredentials::try_from_env() {
        Some(creds) => creds,
        None => {
            println!("Set BYBIT_API_KEY and BYBIT_API_SECRET to run this example.");
            return Ok(());
        }
    };

    let client = BybitWsClient::builder(StreamEndpoint::Private)
        .credentials(credentials)
        .build()?;
    let session = client.start();

    let mut states = session.state_stream();
    tokio::spawn(async move {
        while let Some(state) = states.next().await {
            println!("Session state: {state}");
        }
    });

    // Subscribing on a disconnected session triggers the connect and auth
    // flow; the topics are replayed once the session is authenticated.
    let mut orders = session.subscribe(topics::ORDER).await?;
    let mut executions = session.subscribe(topics::EXECUTION).await?;
    let mut wallet = session.subscribe(topics::WALLET).await?;

    println!("Listening for account events for 60s; trade on the account to see some.");
    let listen = async {
        loop {
            let message = tokio::select! {
                Some(m) = orders.recv() => m,
                Some(m) = executions.recv() => m,
                Some(m) = wallet.recv() => m,
                else => break,
            };
            println!("{}: {}", message.topic, message.data);
        }
    };
    let _ = tokio::time::timeout(Duration::from_secs(60), listen).await;

    session.close().await;
    Ok(())
}
