//! Types for position and account endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, NoneAsEmptyString, serde_as};

use crate::types::{AccountType, Category, CollateralSwitch};

/// Request parameters for listing positions.
///
/// For the linear category the exchange requires either a symbol or a
/// settlement coin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionListRequest {
    /// Product category (linear or inverse).
    pub category: Category,
    /// Instrument symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Settlement coin, e.g. "USDT".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settle_coin: Option<String>,
    /// Maximum number of results per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Pagination cursor from a previous response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl PositionListRequest {
    /// Create a new position list request.
    pub fn new(category: Category) -> Self {
        Self {
            category,
            symbol: None,
            settle_coin: None,
            limit: None,
            cursor: None,
        }
    }

    /// Restrict to a single symbol.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Restrict to positions settled in a coin.
    pub fn settle_coin(mut self, settle_coin: impl Into<String>) -> Self {
        self.settle_coin = Some(settle_coin.into());
        self
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Continue from a pagination cursor.
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// One page of positions.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionList {
    /// Product category.
    pub category: Category,
    /// Positions on this page.
    pub list: Vec<Position>,
    /// Cursor for the next page, if any.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub next_page_cursor: Option<String>,
}

/// Open position on one instrument.
///
/// Fields the exchange sends as empty strings decode to `None`.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Instrument symbol.
    pub symbol: String,
    /// Position side: "Buy", "Sell", or "None" for a flat position.
    pub side: String,
    /// Position size in base coin.
    pub size: Decimal,
    /// Position index (0: one-way, 1: hedge buy, 2: hedge sell).
    #[serde(default)]
    pub position_idx: u8,
    /// Applied leverage.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub leverage: Option<Decimal>,
    /// Average entry price.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub avg_price: Option<Decimal>,
    /// Position value in quote coin.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub position_value: Option<Decimal>,
    /// Current mark price.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub mark_price: Option<Decimal>,
    /// Liquidation price, absent when the position cannot be liquidated.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub liq_price: Option<Decimal>,
    /// Unrealised profit and loss.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub unrealised_pnl: Option<Decimal>,
    /// Realised profit and loss of the current holding.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub cur_realised_pnl: Option<Decimal>,
    /// Cumulative realised profit and loss.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub cum_realised_pnl: Option<Decimal>,
    /// Take profit price.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    /// Stop loss price.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    /// Position status: "Normal", "Liq", or "Adl".
    #[serde(default)]
    pub position_status: Option<String>,
    /// Creation time in milliseconds.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub created_time: Option<i64>,
    /// Last update time in milliseconds.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub updated_time: Option<i64>,
}

impl Position {
    /// Whether any size is held.
    pub fn is_open(&self) -> bool {
        !self.size.is_zero()
    }
}

/// Request parameters for setting position leverage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLeverageRequest {
    /// Product category (linear or inverse).
    pub category: Category,
    /// Instrument symbol.
    pub symbol: String,
    /// Leverage for the buy side.
    pub buy_leverage: Decimal,
    /// Leverage for the sell side.
    pub sell_leverage: Decimal,
}

impl SetLeverageRequest {
    /// Set the same leverage for both sides.
    ///
    /// One-way mode requires both sides to match; hedge mode may differ
    /// via the field setters.
    pub fn new(category: Category, symbol: impl Into<String>, leverage: Decimal) -> Self {
        Self {
            category,
            symbol: symbol.into(),
            buy_leverage: leverage,
            sell_leverage: leverage,
        }
    }

    /// Set the buy side leverage.
    pub fn buy_leverage(mut self, leverage: Decimal) -> Self {
        self.buy_leverage = leverage;
        self
    }

    /// Set the sell side leverage.
    pub fn sell_leverage(mut self, leverage: Decimal) -> Self {
        self.sell_leverage = leverage;
        self
    }
}

/// Request parameters for wallet balances.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalanceRequest {
    /// Account type to query.
    pub account_type: AccountType,
    /// Comma-separated coins to return. When omitted, all coins with
    /// balance are returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin: Option<String>,
}

impl WalletBalanceRequest {
    /// Create a new wallet balance request.
    pub fn new(account_type: AccountType) -> Self {
        Self {
            account_type,
            coin: None,
        }
    }

    /// Restrict to specific coins, comma separated.
    pub fn coin(mut self, coin: impl Into<String>) -> Self {
        self.coin = Some(coin.into());
        self
    }
}

/// Wallet balances grouped by account.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletBalance {
    /// One entry per account type.
    pub list: Vec<WalletAccount>,
}

/// Balances of a single account.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    /// Account type.
    pub account_type: AccountType,
    /// Total equity in USD.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub total_equity: Option<Decimal>,
    /// Total wallet balance in USD.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub total_wallet_balance: Option<Decimal>,
    /// Total margin balance in USD.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub total_margin_balance: Option<Decimal>,
    /// Balance available for new orders in USD.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub total_available_balance: Option<Decimal>,
    /// Unrealised profit and loss across perpetuals in USD.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, rename = "totalPerpUPL")]
    pub total_perp_upl: Option<Decimal>,
    /// Per-coin balances.
    pub coin: Vec<CoinBalance>,
}

/// Balance of a single coin.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinBalance {
    /// Coin name, e.g. "BTC".
    pub coin: String,
    /// Wallet balance.
    pub wallet_balance: Decimal,
    /// Equity including unrealised profit and loss.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub equity: Option<Decimal>,
    /// Balance value in USD.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub usd_value: Option<Decimal>,
    /// Unrealised profit and loss.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub unrealised_pnl: Option<Decimal>,
    /// Cumulative realised profit and loss.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub cum_realised_pnl: Option<Decimal>,
    /// Balance available for withdrawal.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub available_to_withdraw: Option<Decimal>,
    /// Balance locked in open orders.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub locked: Option<Decimal>,
    /// Borrowed amount.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub borrow_amount: Option<Decimal>,
    /// Interest accrued on borrows.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub accrued_interest: Option<Decimal>,
    /// Whether the coin currently counts as collateral.
    #[serde(default)]
    pub collateral_switch: Option<bool>,
    /// Whether the coin is eligible as margin collateral.
    #[serde(default)]
    pub margin_collateral: Option<bool>,
}

/// Request parameters for toggling a coin's use as collateral.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCollateralSwitchRequest {
    /// Coin name, e.g. "BTC".
    pub coin: String,
    /// Desired collateral state.
    pub collateral_switch: CollateralSwitch,
}

impl SetCollateralSwitchRequest {
    /// Create a new collateral switch request.
    pub fn new(coin: impl Into<String>, collateral_switch: CollateralSwitch) -> Self {
        Self {
            coin: coin.into(),
            collateral_switch,
        }
    }
}
