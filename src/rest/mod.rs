//! Bybit V5 REST API client.
//!
//! Provides access to market data, order, position, and account endpoints.
//!
//! # Trait-based API
//!
//! The [`BybitClient`] trait abstracts all REST API operations, enabling:
//! - Mock implementations for testing
//! - Decorator pattern (e.g., rate limiting wrapper)
//! - Alternative implementations
//!
//! ```rust,ignore
//! use bybit_api_client::rest::{BybitClient, BybitRestClient};
//!
//! async fn use_client<C: BybitClient>(client: &C) -> Result<(), bybit_api_client::BybitError> {
//!     let time = client.get_server_time().await?;
//!     println!("Server time: {} ms", time.time_ms());
//!     Ok(())
//! }
//! ```

pub mod account;
mod client;
mod endpoints;
pub mod market;
pub mod trade;
mod traits;

pub use client::{BybitRestClient, BybitRestClientBuilder};
pub use endpoints::*;
pub use traits::BybitClient;
