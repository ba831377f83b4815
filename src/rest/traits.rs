//! Trait definition for the Bybit REST API client.
//!
//! This module provides the `BybitClient` trait which abstracts all REST API
//! operations. This enables:
//! - Mock implementations for testing
//! - Decorator pattern (e.g., rate limiting wrapper)
//! - Alternative implementations
//!
//! # Example
//!
//! ```rust,ignore
//! use bybit_api_client::rest::{BybitClient, BybitRestClient};
//!
//! async fn print_time<C: BybitClient>(client: &C) -> Result<(), bybit_api_client::BybitError> {
//!     let time = client.get_server_time().await?;
//!     println!("Server time: {} ms", time.time_ms());
//!     Ok(())
//! }
//! ```

use std::future::Future;

use crate::error::BybitError;
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

/// Trait defining all Bybit REST API operations.
///
/// This trait enables dependency injection and allows for:
/// - Testing with mock implementations
/// - Wrapping with decorators (e.g., rate limiting)
/// - Alternative implementations
///
/// All methods are async and return `Result<T, BybitError>`.
pub trait BybitClient: Send + Sync {
    // ========== Market Data ==========

    /// Get the server time.
    fn get_server_time(&self) -> impl Future<Output = Result<ServerTime, BybitError>> + Send;

    /// Get instrument specifications for a product category.
    fn get_instruments_info(
        &self,
        request: &InstrumentsInfoRequest,
    ) -> impl Future<Output = Result<InstrumentsInfo, BybitError>> + Send;

    /// Get an order book snapshot.
    fn get_orderbook(
        &self,
        request: &OrderbookRequest,
    ) -> impl Future<Output = Result<Orderbook, BybitError>> + Send;

    /// Get candlestick data.
    fn get_kline(
        &self,
        request: &KlineRequest,
    ) -> impl Future<Output = Result<KlineResponse, BybitError>> + Send;

    /// Get ticker snapshots.
    fn get_tickers(
        &self,
        request: &TickersRequest,
    ) -> impl Future<Output = Result<TickersResponse, BybitError>> + Send;

    /// Get historical funding rates.
    fn get_funding_rate_history(
        &self,
        request: &FundingHistoryRequest,
    ) -> impl Future<Output = Result<FundingRateHistory, BybitError>> + Send;

    // ========== Trading ==========

    /// Place an order.
    fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> impl Future<Output = Result<OrderAck, BybitError>> + Send;

    /// Amend an open order.
    fn amend_order(
        &self,
        request: &AmendOrderRequest,
    ) -> impl Future<Output = Result<OrderAck, BybitError>> + Send;

    /// Cancel an open order.
    fn cancel_order(
        &self,
        request: &CancelOrderRequest,
    ) -> impl Future<Output = Result<OrderAck, BybitError>> + Send;

    // ========== Positions and Account ==========

    /// List open positions.
    fn get_positions(
        &self,
        request: &PositionListRequest,
    ) -> impl Future<Output = Result<PositionList, BybitError>> + Send;

    /// Set position leverage.
    fn set_leverage(
        &self,
        request: &SetLeverageRequest,
    ) -> impl Future<Output = Result<(), BybitError>> + Send;

    /// Get wallet balances.
    fn get_wallet_balance(
        &self,
        request: &WalletBalanceRequest,
    ) -> impl Future<Output = Result<WalletBalance, BybitError>> + Send;

    /// Toggle a coin's use as collateral.
    fn set_collateral_switch(
        &self,
        request: &SetCollateralSwitchRequest,
    ) -> impl Future<Output = Result<(), BybitError>> + Send;
}
