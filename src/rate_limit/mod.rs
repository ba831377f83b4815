//! Rate limiting for the Bybit API.
//!
//! Bybit enforces request-per-second limits separately for public market
//! data (per IP), private account endpoints (per UID), and order
//! endpoints (per UID, per category). This module provides automatic
//! client-side throttling to stay under those limits.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bybit_api_client::rate_limit::{RateLimitConfig, RateLimitedClient};
//! use bybit_api_client::rest::BybitRestClient;
//!
//! // Wrap a client with automatic rate limiting
//! let client = BybitRestClient::new();
//! let rate_limited = RateLimitedClient::new(client);
//!
//! // All requests are automatically throttled
//! let time = rate_limited.get_server_time().await?;
//! ```
//!
//! Accounts with raised limits can pass their own budget:
//!
//! ```rust,ignore
//! let config = RateLimitConfig {
//!     order_rps: 20,
//!     ..RateLimitConfig::default()
//! };
//! let rate_limited = RateLimitedClient::with_config(client, config);
//! ```

mod client;

pub use client::RateLimitedClient;

/// Default sustained rate for public market data endpoints.
const DEFAULT_PUBLIC_RPS: u32 = 50;

/// Default sustained rate for private account endpoints.
const DEFAULT_PRIVATE_RPS: u32 = 10;

/// Default sustained rate for order endpoints.
const DEFAULT_ORDER_RPS: u32 = 10;

/// Rate limiter configuration.
///
/// The defaults match the limits of a fresh account. Rates are floored
/// at one request per second.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per second for public market data endpoints.
    pub public_rps: u32,
    /// Requests per second for private account endpoints.
    pub private_rps: u32,
    /// Requests per second for order placement, amendment, and
    /// cancellation.
    pub order_rps: u32,
    /// Whether to enable rate limiting.
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            public_rps: DEFAULT_PUBLIC_RPS,
            private_rps: DEFAULT_PRIVATE_RPS,
            order_rps: DEFAULT_ORDER_RPS,
            enabled: true,
        }
    }
}
