//! Position and account endpoints (authentication required).

mod types;

pub use types::*;

use crate::error::BybitError;
use crate::rest::BybitRestClient;
use crate::rest::endpoints::{account, position};

impl BybitRestClient {
    /// List open positions.
    ///
    /// For the linear category, restrict the request to a symbol or a
    /// settlement coin; the exchange rejects unfiltered queries.
    ///
    /// # Arguments
    ///
    /// * `request` - Category plus symbol or settlement coin filters.
    pub async fn get_positions(
        &self,
        request: &PositionListRequest,
    ) -> Result<PositionList, BybitError> {
        self.signed_get(position::LIST, request).await
    }

    /// Set position leverage.
    ///
    /// Fails with ret code 110043 when the leverage already matches;
    /// [`ApiError`](crate::error::ApiError) exposes the code for callers
    /// that want to treat that as success.
    ///
    /// # Arguments
    ///
    /// * `request` - Symbol and per-side leverage.
    pub async fn set_leverage(&self, request: &SetLeverageRequest) -> Result<(), BybitError> {
        let _: serde_json::Value = self.signed_post(position::SET_LEVERAGE, request).await?;
        Ok(())
    }

    /// Get wallet balances.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use bybit_api_client::auth::EnvCredentials;
    /// use bybit_api_client::rest::BybitRestClient;
    /// use bybit_api_client::rest::account::WalletBalanceRequest;
    /// use bybit_api_client::types::AccountType;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = BybitRestClient::builder()
    ///         .credentials(EnvCredentials::from_env())
    ///         .build();
    ///     let request = WalletBalanceRequest::new(AccountType::Unified);
    ///     let balance = client.get_wallet_balance(&request).await?;
    ///     for account in &balance.list {
    ///         for coin in &account.coin {
    ///             println!("{}: {}", coin.coin, coin.wallet_balance);
    ///         }
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn get_wallet_balance(
        &self,
        request: &WalletBalanceRequest,
    ) -> Result<WalletBalance, BybitError> {
        self.signed_get(account::WALLET_BALANCE, request).await
    }

    /// Toggle a coin's use as collateral in the unified account.
    ///
    /// # Arguments
    ///
    /// * `request` - Coin and desired state.
    pub async fn set_collateral_switch(
        &self,
        request: &SetCollateralSwitchRequest,
    ) -> Result<(), BybitError> {
        let _: serde_json::Value = self
            .signed_post(account::SET_COLLATERAL_SWITCH, request)
            .await?;
        Ok(())
    }
}
