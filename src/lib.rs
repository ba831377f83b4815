//! # Bybit Client
//!
//! An async Rust client library for the Bybit V5 REST and WebSocket APIs.
//!
//! ## Features
//!
//! - REST API support for market data, orders, positions, and account
//! - WebSocket streams with automatic reconnection and resubscription
//! - Built-in rate limiting
//! - Strong typing for all request/response types
//! - Financial precision with `rust_decimal`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bybit_api_client::rest::BybitRestClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BybitRestClient::new();
//!     let time = client.get_server_time().await?;
//!     println!("Server time: {} ms", time.time_ms());
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! ```rust,no_run
//! use bybit_api_client::ws::{BybitWsClient, StreamEndpoint, topics};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = BybitWsClient::new(StreamEndpoint::PublicLinear)?.start();
//!     session.connect();
//!     let mut stream = session.subscribe(topics::orderbook(50, "BTCUSDT")).await?;
//!     while let Some(message) = stream.recv().await {
//!         println!("{}: {}", message.topic, message.data);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod rest;
pub mod types;
pub mod ws;

// Re-export commonly used types at crate root
pub use error::BybitError;
pub use types::common::{Category, Network, OrderType, Side};

/// Result type alias using BybitError
pub type Result<T> = std::result::Result<T, BybitError>;
