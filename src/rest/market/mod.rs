//! Market data endpoints (no authentication required).

mod types;

pub use types::*;

use crate::error::BybitError;
use crate::rest::BybitRestClient;
use crate::rest::endpoints::market;

impl BybitRestClient {
    /// Get the server time.
    ///
    /// This is useful for measuring clock drift and checking API
    /// availability. See [`BybitRestClient::sync_time`] for applying the
    /// drift to signed requests.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use bybit_api_client::rest::BybitRestClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = BybitRestClient::new();
    ///     let time = client.get_server_time().await?;
    ///     println!("Server time: {} ms", time.time_ms());
    ///     Ok(())
    /// }
    /// ```
    pub async fn get_server_time(&self) -> Result<ServerTime, BybitError> {
        self.public_get(market::TIME).await
    }

    /// Get instrument specifications for a product category.
    ///
    /// Returns tick sizes, lot sizes, and leverage ranges needed to build
    /// valid orders. Results are paginated; pass the returned cursor to
    /// fetch the next page.
    ///
    /// # Arguments
    ///
    /// * `request` - Category plus optional symbol and pagination filters.
    pub async fn get_instruments_info(
        &self,
        request: &InstrumentsInfoRequest,
    ) -> Result<InstrumentsInfo, BybitError> {
        self.public_get_with_params(market::INSTRUMENTS_INFO, request)
            .await
    }

    /// Get an order book snapshot.
    ///
    /// # Arguments
    ///
    /// * `request` - Category, symbol, and optional depth.
    pub async fn get_orderbook(&self, request: &OrderbookRequest) -> Result<Orderbook, BybitError> {
        self.public_get_with_params(market::ORDERBOOK, request).await
    }

    /// Get candlestick data.
    ///
    /// Returns up to 1000 candles, most recent first.
    ///
    /// # Arguments
    ///
    /// * `request` - Category, symbol, interval, and optional time range.
    pub async fn get_kline(&self, request: &KlineRequest) -> Result<KlineResponse, BybitError> {
        self.public_get_with_params(market::KLINE, request).await
    }

    /// Get ticker snapshots.
    ///
    /// Returns 24-hour statistics for one symbol, or for every symbol in
    /// the category when no symbol is given.
    ///
    /// # Arguments
    ///
    /// * `request` - Category and optional symbol.
    pub async fn get_tickers(&self, request: &TickersRequest) -> Result<TickersResponse, BybitError> {
        self.public_get_with_params(market::TICKERS, request).await
    }

    /// Get historical funding rates.
    ///
    /// Only valid for linear and inverse perpetuals.
    ///
    /// # Arguments
    ///
    /// * `request` - Category, symbol, and optional time range.
    pub async fn get_funding_rate_history(
        &self,
        request: &FundingHistoryRequest,
    ) -> Result<FundingRateHistory, BybitError> {
        self.public_get_with_params(market::FUNDING_HISTORY, request)
            .await
    }
}
