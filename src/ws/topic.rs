//! Stream topic identifiers.
//!
//! A topic names one logical channel on a Bybit v5 stream, e.g.
//! `orderbook.50.BTCUSDT` or the private `order` channel. Topics key the
//! subscription registry, so they are value-equal and hashable.

use serde::{Deserialize, Serialize};

use crate::error::BybitError;
use crate::types::Interval;

/// First dot-segment of every private stream topic.
const PRIVATE_TOPIC_PREFIXES: &[&str] = &["order", "execution", "position", "wallet", "greeks", "dcp"];

/// A validated Bybit stream topic.
///
/// Construction checks the basic dot-separated shape (non-empty, no empty
/// segments, no whitespace); the venue remains the authority on whether the
/// topic actually exists. Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Validate and wrap a topic string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bybit_api_client::ws::Topic;
    ///
    /// let topic = Topic::new("publicTrade.BTCUSDT").unwrap();
    /// assert!(!topic.is_private());
    /// assert!(Topic::new("orderbook..BTCUSDT").is_err());
    /// ```
    pub fn new(topic: impl Into<String>) -> Result<Self, BybitError> {
        let topic = topic.into();
        if topic.is_empty() {
            return Err(BybitError::InvalidTopic("empty topic".to_string()));
        }
        if topic.contains(char::is_whitespace) {
            return Err(BybitError::InvalidTopic(format!(
                "topic '{topic}' contains whitespace"
            )));
        }
        if topic.split('.').any(str::is_empty) {
            return Err(BybitError::InvalidTopic(format!(
                "topic '{topic}' has an empty segment"
            )));
        }
        Ok(Self(topic))
    }

    /// The canonical topic string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this topic belongs to the private (authenticated) stream.
    pub fn is_private(&self) -> bool {
        let first = self.0.split('.').next().unwrap_or_default();
        PRIVATE_TOPIC_PREFIXES.contains(&first)
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Topic {
    type Err = BybitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Well-known topic names and format helpers.
pub mod topics {
    use super::Interval;

    /// Private order updates.
    pub const ORDER: &str = "order";
    /// Private execution (fill) updates.
    pub const EXECUTION: &str = "execution";
    /// Private position updates.
    pub const POSITION: &str = "position";
    /// Private wallet balance updates.
    pub const WALLET: &str = "wallet";

    /// Orderbook stream at the given depth, e.g. `orderbook.50.BTCUSDT`.
    pub fn orderbook(depth: u16, symbol: &str) -> String {
        format!("orderbook.{depth}.{symbol}")
    }

    /// Public trade stream, e.g. `publicTrade.BTCUSDT`.
    pub fn public_trade(symbol: &str) -> String {
        format!("publicTrade.{symbol}")
    }

    /// Ticker stream, e.g. `tickers.BTCUSDT`.
    pub fn tickers(symbol: &str) -> String {
        format!("tickers.{symbol}")
    }

    /// Candlestick stream, e.g. `kline.5.BTCUSDT`.
    pub fn kline(interval: Interval, symbol: &str) -> String {
        format!("kline.{interval}.{symbol}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_topics() {
        assert!(Topic::new("orderbook.50.BTCUSDT").is_ok());
        assert!(Topic::new("publicTrade.BTCUSDT").is_ok());
        assert!(Topic::new("order").is_ok());
        assert!(Topic::new(topics::kline(Interval::Min5, "ETHUSDT")).is_ok());
    }

    #[test]
    fn test_invalid_topics() {
        assert!(Topic::new("").is_err());
        assert!(Topic::new("orderbook..BTCUSDT").is_err());
        assert!(Topic::new(".orderbook").is_err());
        assert!(Topic::new("orderbook.").is_err());
        assert!(Topic::new("tickers BTCUSDT").is_err());
    }

    #[test]
    fn test_private_classification() {
        assert!(Topic::new("order").unwrap().is_private());
        assert!(Topic::new("execution").unwrap().is_private());
        assert!(Topic::new("wallet").unwrap().is_private());
        assert!(!Topic::new("tickers.BTCUSDT").unwrap().is_private());
        assert!(!Topic::new("orderbook.1.BTCUSDT").unwrap().is_private());
    }

    #[test]
    fn test_value_equality() {
        let a = Topic::new("tickers.BTCUSDT").unwrap();
        let b = Topic::new("tickers.BTCUSDT").unwrap();
        assert_eq!(a, b);
        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_topic_helpers() {
        assert_eq!(topics::orderbook(50, "BTCUSDT"), "orderbook.50.BTCUSDT");
        assert_eq!(topics::public_trade("BTCUSDT"), "publicTrade.BTCUSDT");
        assert_eq!(topics::tickers("ETHUSDT"), "tickers.ETHUSDT");
        assert_eq!(topics::kline(Interval::Hour1, "BTCUSDT"), "kline.60.BTCUSDT");
    }

    #[test]
    fn test_serde_transparent() {
        let topic = Topic::new("tickers.BTCUSDT").unwrap();
        assert_eq!(serde_json::to_string(&topic).unwrap(), "\"tickers.BTCUSDT\"");
        let parsed: Topic = serde_json::from_str("\"order\"").unwrap();
        assert!(parsed.is_private());
    }
}
