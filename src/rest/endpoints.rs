//! REST API endpoint URLs and paths.

use crate::types::Network;

/// Mainnet REST API base URL.
pub const BYBIT_MAINNET_URL: &str = "https://api.bybit.com";

/// Testnet REST API base URL.
pub const BYBIT_TESTNET_URL: &str = "https://api-testnet.bybit.com";

/// Demo trading REST API base URL.
pub const BYBIT_DEMO_URL: &str = "https://api-demo.bybit.com";

/// Resolve the REST base URL for a network.
///
/// Unlike the stream endpoints, every network has a full REST surface,
/// so this never fails.
pub fn rest_base_url(network: Network) -> &'static str {
    match network {
        Network::Mainnet => BYBIT_MAINNET_URL,
        Network::Testnet => BYBIT_TESTNET_URL,
        Network::Demo => BYBIT_DEMO_URL,
    }
}

/// Authentication headers attached to signed requests.
pub mod headers {
    /// API key header.
    pub const API_KEY: &str = "X-BAPI-API-KEY";
    /// Request timestamp in milliseconds.
    pub const TIMESTAMP: &str = "X-BAPI-TIMESTAMP";
    /// Signature validity window in milliseconds.
    pub const RECV_WINDOW: &str = "X-BAPI-RECV-WINDOW";
    /// HMAC-SHA256 signature, hex encoded.
    pub const SIGN: &str = "X-BAPI-SIGN";
    /// Signature algorithm selector (always "2" for HMAC-SHA256).
    pub const SIGN_TYPE: &str = "X-BAPI-SIGN-TYPE";
    /// Response header carrying the epoch millisecond at which the
    /// current rate limit window resets.
    pub const LIMIT_RESET_TIMESTAMP: &str = "X-Bapi-Limit-Reset-Timestamp";
}

/// Market data endpoint paths (no authentication required).
pub mod market {
    /// Get server time.
    pub const TIME: &str = "/v5/market/time";
    /// Get instrument specifications.
    pub const INSTRUMENTS_INFO: &str = "/v5/market/instruments-info";
    /// Get order book snapshot.
    pub const ORDERBOOK: &str = "/v5/market/orderbook";
    /// Get candlestick data.
    pub const KLINE: &str = "/v5/market/kline";
    /// Get ticker snapshots.
    pub const TICKERS: &str = "/v5/market/tickers";
    /// Get historical funding rates.
    pub const FUNDING_HISTORY: &str = "/v5/market/funding/history";
}

/// Order endpoint paths (authentication required).
pub mod trade {
    /// Place an order.
    pub const CREATE_ORDER: &str = "/v5/order/create";
    /// Amend an open order.
    pub const AMEND_ORDER: &str = "/v5/order/amend";
    /// Cancel an open order.
    pub const CANCEL_ORDER: &str = "/v5/order/cancel";
}

/// Position endpoint paths (authentication required).
pub mod position {
    /// List open positions.
    pub const LIST: &str = "/v5/position/list";
    /// Set position leverage.
    pub const SET_LEVERAGE: &str = "/v5/position/set-leverage";
}

/// Account endpoint paths (authentication required).
pub mod account {
    /// Get wallet balances.
    pub const WALLET_BALANCE: &str = "/v5/account/wallet-balance";
    /// Toggle a coin's use as collateral.
    pub const SET_COLLATERAL_SWITCH: &str = "/v5/account/set-collateral-switch";
}
