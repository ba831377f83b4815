//! Types for market data endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, NoneAsEmptyString, serde_as};

use crate::types::{Category, Interval};

/// Server time response.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    /// Seconds since the Unix epoch.
    #[serde_as(as = "DisplayFromStr")]
    pub time_second: i64,
    /// Nanoseconds since the Unix epoch.
    #[serde_as(as = "DisplayFromStr")]
    pub time_nano: i64,
}

impl ServerTime {
    /// Server time in milliseconds since the Unix epoch.
    pub fn time_ms(&self) -> i64 {
        self.time_nano / 1_000_000
    }
}

/// Request parameters for instrument specifications.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentsInfoRequest {
    /// Product category.
    pub category: Category,
    /// Instrument symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Instrument status filter (e.g., "Trading").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Base coin filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_coin: Option<String>,
    /// Maximum number of results per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Pagination cursor from a previous response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl InstrumentsInfoRequest {
    /// Create a new request for all instruments in a category.
    pub fn new(category: Category) -> Self {
        Self {
            category,
            symbol: None,
            status: None,
            base_coin: None,
            limit: None,
            cursor: None,
        }
    }

    /// Restrict to a single symbol.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
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

/// Instrument specifications for one page of a category.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentsInfo {
    /// Product category.
    pub category: Category,
    /// Instruments on this page.
    pub list: Vec<Instrument>,
    /// Cursor for the next page, if any.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub next_page_cursor: Option<String>,
}

/// Specification of a single instrument.
///
/// Derivative-only fields are `None` for spot instruments and vice versa.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// Instrument symbol.
    pub symbol: String,
    /// Contract type (derivatives only).
    #[serde(default)]
    pub contract_type: Option<String>,
    /// Instrument status.
    pub status: String,
    /// Base coin.
    pub base_coin: String,
    /// Quote coin.
    pub quote_coin: String,
    /// Settlement coin (derivatives only).
    #[serde(default)]
    pub settle_coin: Option<String>,
    /// Launch time in milliseconds (derivatives only).
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub launch_time: Option<i64>,
    /// Price decimal places (derivatives only).
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub price_scale: Option<u32>,
    /// Leverage range (derivatives only).
    #[serde(default)]
    pub leverage_filter: Option<LeverageFilter>,
    /// Price constraints.
    #[serde(default)]
    pub price_filter: Option<PriceFilter>,
    /// Order size constraints.
    #[serde(default)]
    pub lot_size_filter: Option<LotSizeFilter>,
    /// Funding interval in minutes (perpetuals only).
    #[serde(default)]
    pub funding_interval: Option<i64>,
}

/// Allowed leverage range for an instrument.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageFilter {
    /// Minimum leverage.
    pub min_leverage: Decimal,
    /// Maximum leverage.
    pub max_leverage: Decimal,
    /// Leverage increment.
    pub leverage_step: Decimal,
}

/// Price constraints for an instrument.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilter {
    /// Minimum price increment.
    pub tick_size: Decimal,
    /// Minimum order price (derivatives only).
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub min_price: Option<Decimal>,
    /// Maximum order price (derivatives only).
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub max_price: Option<Decimal>,
}

/// Order size constraints for an instrument.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizeFilter {
    /// Minimum order quantity in base coin.
    pub min_order_qty: Decimal,
    /// Maximum order quantity in base coin.
    pub max_order_qty: Decimal,
    /// Quantity increment (derivatives only).
    #[serde(default)]
    pub qty_step: Option<Decimal>,
    /// Base coin precision (spot only).
    #[serde(default)]
    pub base_precision: Option<Decimal>,
    /// Quote coin precision (spot only).
    #[serde(default)]
    pub quote_precision: Option<Decimal>,
    /// Minimum order value in quote coin (spot only).
    #[serde(default)]
    pub min_order_amt: Option<Decimal>,
    /// Maximum order value in quote coin (spot only).
    #[serde(default)]
    pub max_order_amt: Option<Decimal>,
    /// Maximum market order quantity (derivatives only).
    #[serde(default)]
    pub max_mkt_order_qty: Option<Decimal>,
    /// Minimum order value (derivatives only).
    #[serde(default)]
    pub min_notional_value: Option<Decimal>,
}

/// Request parameters for an order book snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderbookRequest {
    /// Product category.
    pub category: Category,
    /// Instrument symbol.
    pub symbol: String,
    /// Book depth per side (maximum depends on category).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u16>,
}

impl OrderbookRequest {
    /// Create a new order book request.
    pub fn new(category: Category, symbol: impl Into<String>) -> Self {
        Self {
            category,
            symbol: symbol.into(),
            limit: None,
        }
    }

    /// Set the depth per side.
    pub fn limit(mut self, limit: u16) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Order book snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct Orderbook {
    /// Instrument symbol.
    #[serde(rename = "s")]
    pub symbol: String,
    /// Bid levels, best first.
    #[serde(rename = "b")]
    pub bids: Vec<OrderbookLevel>,
    /// Ask levels, best first.
    #[serde(rename = "a")]
    pub asks: Vec<OrderbookLevel>,
    /// Snapshot timestamp in milliseconds.
    #[serde(rename = "ts")]
    pub timestamp_ms: u64,
    /// Update sequence of the snapshot.
    #[serde(rename = "u")]
    pub update_id: u64,
    /// Cross sequence (derivatives only).
    #[serde(default)]
    pub seq: Option<u64>,
}

/// Single order book level.
/// Format: [price, size]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderbookLevel {
    /// Price level.
    pub price: Decimal,
    /// Quantity resting at the level.
    pub size: Decimal,
}

impl<'de> Deserialize<'de> for OrderbookLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let arr: (Decimal, Decimal) = Deserialize::deserialize(deserializer)?;
        Ok(OrderbookLevel {
            price: arr.0,
            size: arr.1,
        })
    }
}

/// Request parameters for candlestick data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KlineRequest {
    /// Product category.
    pub category: Category,
    /// Instrument symbol.
    pub symbol: String,
    /// Candle interval.
    pub interval: Interval,
    /// Start timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// End timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    /// Maximum number of candles (default: 200, max: 1000).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl KlineRequest {
    /// Create a new candlestick request.
    pub fn new(category: Category, symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            category,
            symbol: symbol.into(),
            interval,
            start: None,
            end: None,
            limit: None,
        }
    }

    /// Set the start of the requested range.
    pub fn start(mut self, start_ms: i64) -> Self {
        self.start = Some(start_ms);
        self
    }

    /// Set the end of the requested range.
    pub fn end(mut self, end_ms: i64) -> Self {
        self.end = Some(end_ms);
        self
    }

    /// Set the maximum number of candles.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.min(1000));
        self
    }
}

/// Candlestick data, most recent candle first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KlineResponse {
    /// Product category.
    pub category: Category,
    /// Instrument symbol.
    pub symbol: String,
    /// Candles in the requested range.
    pub list: Vec<Kline>,
}

/// Single candlestick entry.
/// Format: [startTime, open, high, low, close, volume, turnover]
#[derive(Debug, Clone)]
pub struct Kline {
    /// Candle start time in milliseconds.
    pub start_ms: i64,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Volume in base coin.
    pub volume: Decimal,
    /// Turnover in quote coin.
    pub turnover: Decimal,
}

impl<'de> Deserialize<'de> for Kline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let arr: (
            String,
            Decimal,
            Decimal,
            Decimal,
            Decimal,
            Decimal,
            Decimal,
        ) = Deserialize::deserialize(deserializer)?;
        Ok(Kline {
            start_ms: arr.0.parse().map_err(serde::de::Error::custom)?,
            open: arr.1,
            high: arr.2,
            low: arr.3,
            close: arr.4,
            volume: arr.5,
            turnover: arr.6,
        })
    }
}

/// Request parameters for ticker snapshots.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickersRequest {
    /// Product category.
    pub category: Category,
    /// Instrument symbol. When omitted, all symbols in the category
    /// are returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl TickersRequest {
    /// Create a new request for all tickers in a category.
    pub fn new(category: Category) -> Self {
        Self {
            category,
            symbol: None,
        }
    }

    /// Restrict to a single symbol.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// Ticker snapshots for a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickersResponse {
    /// Product category.
    pub category: Category,
    /// One snapshot per instrument.
    pub list: Vec<Ticker>,
}

/// 24-hour ticker snapshot for one instrument.
///
/// Derivative-only fields are `None` for spot instruments. Fields the
/// exchange sends as empty strings also decode to `None`.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    /// Instrument symbol.
    pub symbol: String,
    /// Last traded price.
    pub last_price: Decimal,
    /// Index price (derivatives only).
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub index_price: Option<Decimal>,
    /// Mark price (derivatives only).
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub mark_price: Option<Decimal>,
    /// Price 24 hours ago.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub prev_price24h: Option<Decimal>,
    /// Price change over 24 hours as a fraction.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub price24h_pcnt: Option<Decimal>,
    /// Highest price in 24 hours.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub high_price24h: Option<Decimal>,
    /// Lowest price in 24 hours.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub low_price24h: Option<Decimal>,
    /// Volume in 24 hours, base coin.
    pub volume24h: Decimal,
    /// Turnover in 24 hours, quote coin.
    pub turnover24h: Decimal,
    /// Best bid price.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub bid1_price: Option<Decimal>,
    /// Best bid size.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub bid1_size: Option<Decimal>,
    /// Best ask price.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub ask1_price: Option<Decimal>,
    /// Best ask size.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub ask1_size: Option<Decimal>,
    /// Current funding rate (perpetuals only).
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub funding_rate: Option<Decimal>,
    /// Next funding settlement in milliseconds (perpetuals only).
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub next_funding_time: Option<i64>,
    /// Open interest in base coin (derivatives only).
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub open_interest: Option<Decimal>,
    /// Open interest value in quote coin (derivatives only).
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub open_interest_value: Option<Decimal>,
    /// USD index price (spot only).
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub usd_index_price: Option<Decimal>,
}

/// Request parameters for historical funding rates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingHistoryRequest {
    /// Product category (linear or inverse).
    pub category: Category,
    /// Instrument symbol.
    pub symbol: String,
    /// Start timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// End timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Maximum number of entries (default: 200).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl FundingHistoryRequest {
    /// Create a new funding history request.
    pub fn new(category: Category, symbol: impl Into<String>) -> Self {
        Self {
            category,
            symbol: symbol.into(),
            start_time: None,
            end_time: None,
            limit: None,
        }
    }

    /// Set the start of the requested range.
    pub fn start_time(mut self, start_ms: i64) -> Self {
        self.start_time = Some(start_ms);
        self
    }

    /// Set the end of the requested range.
    pub fn end_time(mut self, end_ms: i64) -> Self {
        self.end_time = Some(end_ms);
        self
    }

    /// Set the maximum number of entries.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Historical funding rates, most recent first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRateHistory {
    /// Product category.
    pub category: Category,
    /// Funding settlements in the requested range.
    pub list: Vec<FundingRate>,
}

/// Single funding rate settlement.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRate {
    /// Instrument symbol.
    pub symbol: String,
    /// Funding rate applied at settlement.
    pub funding_rate: Decimal,
    /// Settlement time in milliseconds.
    #[serde_as(as = "DisplayFromStr")]
    pub funding_rate_timestamp: i64,
}
