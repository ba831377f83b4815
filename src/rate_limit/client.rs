//! Rate-limited REST client wrapper.
//!
//! Provides a wrapper around any [`BybitClient`] implementation that
//! automatically throttles requests to Bybit's per-second limits.
//!
//! # Example
//!
//! ```rust,ignore
//! use bybit_api_client::rate_limit::RateLimitedClient;
//! use bybit_api_client::rest::BybitRestClient;
//!
//! let client = BybitRestClient::new();
//! let rate_limited = RateLimitedClient::new(client);
//!
//! // All requests will be automatically rate limited
//! let time = rate_limited.get_server_time().await?;
//! ```

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use crate::error::BybitError;
use crate::rate_limit::RateLimitConfig;
use crate::rest::BybitClient;
use crate::rest::account::{
    PositionList, PositionListRequest, SetCollateralSwitchRequest, SetLeverageRequest,
    WalletBalance, WalletBalanceRequest,
};
use crate::rest::market::{
    FundingHistoryRequest, FundingRateHistory, InstrumentsInfo, InstrumentsInfoRequest,
    KlineRequest, KlineResponse, Orderbook, OrderbookRequest, ServerTime, TickersRequest,
    TickersResponse,
};
use crate::rest::trade::{AmendOrderRequest, CancelOrderRequest, CreateOrderRequest, OrderAck};

/// A rate-limited wrapper around any [`BybitClient`] implementation.
///
/// Maintains three token buckets matching Bybit's limit groups:
/// - Public market data endpoints (per IP)
/// - Private account endpoints (per UID)
/// - Order endpoints (per UID)
///
/// A request that would exceed its bucket's rate waits until a slot
/// frees up instead of failing. Clones share the buckets.
///
/// # Example
///
/// ```rust,ignore
/// use bybit_api_client::rate_limit::RateLimitedClient;
/// use bybit_api_client::rest::BybitRestClient;
///
/// let client = BybitRestClient::new();
/// let rate_limited = RateLimitedClient::new(client);
///
/// // Requests are automatically rate limited
/// let time = rate_limited.get_server_time().await?;
/// ```
#[derive(Clone)]
pub struct RateLimitedClient<C> {
    inner: C,
    config: RateLimitConfig,
    public_limiter: Arc<DefaultDirectRateLimiter>,
    private_limiter: Arc<DefaultDirectRateLimiter>,
    order_limiter: Arc<DefaultDirectRateLimiter>,
}

impl<C> RateLimitedClient<C> {
    /// Wrap a client with the default rate limit budget.
    pub fn new(inner: C) -> Self {
        Self::with_config(inner, RateLimitConfig::default())
    }

    /// Wrap a client with a custom rate limit budget.
    pub fn with_config(inner: C, config: RateLimitConfig) -> Self {
        Self {
            public_limiter: Arc::new(RateLimiter::direct(quota(config.public_rps))),
            private_limiter: Arc::new(RateLimiter::direct(quota(config.private_rps))),
            order_limiter: Arc::new(RateLimiter::direct(quota(config.order_rps))),
            inner,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Access the wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap into the inner client.
    pub fn into_inner(self) -> C {
        self.inner
    }

    async fn acquire(&self, limiter: &DefaultDirectRateLimiter) {
        if self.config.enabled {
            limiter.until_ready().await;
        }
    }
}

impl<C> std::fmt::Debug for RateLimitedClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Sustained per-second quota, floored at one request per second.
fn quota(rps: u32) -> Quota {
    Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN))
}

impl<C: BybitClient> BybitClient for RateLimitedClient<C> {
    // ========== Market Data ==========

    async fn get_server_time(&self) -> Result<ServerTime, BybitError> {
        self.acquire(&self.public_limiter).await;
        self.inner.get_server_time().await
    }

    async fn get_instruments_info(
        &self,
        request: &InstrumentsInfoRequest,
    ) -> Result<InstrumentsInfo, BybitError> {
        self.acquire(&self.public_limiter).await;
        self.inner.get_instruments_info(request).await
    }

    async fn get_orderbook(&self, request: &OrderbookRequest) -> Result<Orderbook, BybitError> {
        self.acquire(&self.public_limiter).await;
        self.inner.get_orderbook(request).await
    }

    async fn get_kline(&self, request: &KlineRequest) -> Result<KlineResponse, BybitError> {
        self.acquire(&self.public_limiter).await;
        self.inner.get_kline(request).await
    }

    async fn get_tickers(&self, request: &TickersRequest) -> Result<TickersResponse, BybitError> {
        self.acquire(&self.public_limiter).await;
        self.inner.get_tickers(request).await
    }

    async fn get_funding_rate_history(
        &self,
        request: &FundingHistoryRequest,
    ) -> Result<FundingRateHistory, BybitError> {
        self.acquire(&self.public_limiter).await;
        self.inner.get_funding_rate_history(request).await
    }

    // ========== Trading ==========

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderAck, BybitError> {
        self.acquire(&self.order_limiter).await;
        self.inner.create_order(request).await
    }

    async fn amend_order(&self, request: &AmendOrderRequest) -> Result<OrderAck, BybitError> {
        self.acquire(&self.order_limiter).await;
        self.inner.amend_order(request).await
    }

    async fn cancel_order(&self, request: &CancelOrderRequest) -> Result<OrderAck, BybitError> {
        self.acquire(&self.order_limiter).await;
        self.inner.cancel_order(request).await
    }

    // ========== Positions and Account ==========

    async fn get_positions(
        &self,
        request: &PositionListRequest,
    ) -> Result<PositionList, BybitError> {
        self.acquire(&self.private_limiter).await;
        self.inner.get_positions(request).await
    }

    async fn set_leverage(&self, request: &SetLeverageRequest) -> Result<(), BybitError> {
        self.acquire(&self.private_limiter).await;
        self.inner.set_leverage(request).await
    }

    async fn get_wallet_balance(
        &self,
        request: &WalletBalanceRequest,
    ) -> Result<WalletBalance, BybitError> {
        self.acquire(&self.private_limiter).await;
        self.inner.get_wallet_balance(request).await
    }

    async fn set_collateral_switch(
        &self,
        request: &SetCollateralSwitchRequest,
    ) -> Result<(), BybitError> {
        self.acquire(&self.private_limiter).await;
        self.inner.set_collateral_switch(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use super::*;

    /// Stub client that counts calls and never touches the network.
    #[derive(Default)]
    struct StubClient {
        calls: AtomicUsize,
    }

    impl StubClient {
        fn server_time() -> ServerTime {
            ServerTime {
                time_second: 1,
                time_nano: 1_500_000_000,
            }
        }
    }

    impl BybitClient for StubClient {
        async fn get_server_time(&self) -> Result<ServerTime, BybitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::server_time())
        }

        async fn get_instruments_info(
            &self,
            _request: &InstrumentsInfoRequest,
        ) -> Result<InstrumentsInfo, BybitError> {
            unimplemented!()
        }

        async fn get_orderbook(
            &self,
            _request: &OrderbookRequest,
        ) -> Result<Orderbook, BybitError> {
            unimplemented!()
        }

        async fn get_kline(&self, _request: &KlineRequest) -> Result<KlineResponse, BybitError> {
            unimplemented!()
        }

        async fn get_tickers(
            &self,
            _request: &TickersRequest,
        ) -> Result<TickersResponse, BybitError> {
            unimplemented!()
        }

        async fn get_funding_rate_history(
            &self,
            _request: &FundingHistoryRequest,
        ) -> Result<FundingRateHistory, BybitError> {
            unimplemented!()
        }

        async fn create_order(
            &self,
            _request: &CreateOrderRequest,
        ) -> Result<OrderAck, BybitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(OrderAck {
                order_id: "stub-order".to_string(),
                order_link_id: String::new(),
            })
        }

        async fn amend_order(&self, _request: &AmendOrderRequest) -> Result<OrderAck, BybitError> {
            unimplemented!()
        }

        async fn cancel_order(
            &self,
            _request: &CancelOrderRequest,
        ) -> Result<OrderAck, BybitError> {
            unimplemented!()
        }

        async fn get_positions(
            &self,
            _request: &PositionListRequest,
        ) -> Result<PositionList, BybitError> {
            unimplemented!()
        }

        async fn set_leverage(&self, _request: &SetLeverageRequest) -> Result<(), BybitError> {
            unimplemented!()
        }

        async fn get_wallet_balance(
            &self,
            _request: &WalletBalanceRequest,
        ) -> Result<WalletBalance, BybitError> {
            unimplemented!()
        }

        async fn set_collateral_switch(
            &self,
            _request: &SetCollateralSwitchRequest,
        ) -> Result<(), BybitError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn delegates_to_inner_client() {
        let rate_limited = RateLimitedClient::new(StubClient::default());
        let time = rate_limited.get_server_time().await.unwrap();
        assert_eq!(time.time_second, 1);
        assert_eq!(rate_limited.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_config_passes_straight_through() {
        let config = RateLimitConfig {
            enabled: false,
            order_rps: 1,
            ..RateLimitConfig::default()
        };
        let rate_limited = RateLimitedClient::with_config(StubClient::default(), config);

        let request = CreateOrderRequest::market(
            crate::types::Category::Spot,
            "BTCUSDT",
            crate::types::Side::Buy,
            "0.1".parse().unwrap(),
        );
        let start = Instant::now();
        for _ in 0..3 {
            rate_limited.create_order(&request).await.unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(500));
        assert_eq!(rate_limited.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn order_bucket_throttles_burst() {
        let config = RateLimitConfig {
            order_rps: 2,
            ..RateLimitConfig::default()
        };
        let rate_limited = RateLimitedClient::with_config(StubClient::default(), config);

        let request = CreateOrderRequest::market(
            crate::types::Category::Spot,
            "BTCUSDT",
            crate::types::Side::Buy,
            "0.1".parse().unwrap(),
        );
        let start = Instant::now();
        for _ in 0..3 {
            rate_limited.create_order(&request).await.unwrap();
        }
        // Two slots burst immediately, the third waits for the bucket.
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert_eq!(rate_limited.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_rate_is_floored_not_rejected() {
        let config = RateLimitConfig {
            public_rps: 0,
            ..RateLimitConfig::default()
        };
        let rate_limited = RateLimitedClient::with_config(StubClient::default(), config);
        let time = rate_limited.get_server_time().await.unwrap();
        assert_eq!(time.time_nano, 1_500_000_000);
    }
}
