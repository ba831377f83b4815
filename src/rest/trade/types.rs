//! Types for order endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Category, OrderType, Side, TimeInForce};

/// Request parameters for placing an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Product category.
    pub category: Category,
    /// Instrument symbol.
    pub symbol: String,
    /// Order side.
    pub side: Side,
    /// Order type.
    pub order_type: OrderType,
    /// Order quantity in base coin (quote coin for spot market buys).
    pub qty: Decimal,
    /// Limit price. Required for limit orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Execution policy (default: good till canceled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    /// Client-assigned order ID, unique per account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_link_id: Option<String>,
    /// Only reduce an existing position (derivatives only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<bool>,
    /// Close the position on trigger (derivatives only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_on_trigger: Option<bool>,
    /// Position index for hedge mode (0: one-way, 1: hedge buy, 2: hedge sell).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_idx: Option<u8>,
    /// Borrow for a margin trade (spot only, 0: no, 1: yes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_leverage: Option<u8>,
}

impl CreateOrderRequest {
    /// Create a market order request.
    pub fn market(category: Category, symbol: impl Into<String>, side: Side, qty: Decimal) -> Self {
        Self {
            category,
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            qty,
            price: None,
            time_in_force: None,
            order_link_id: None,
            reduce_only: None,
            close_on_trigger: None,
            position_idx: None,
            is_leverage: None,
        }
    }

    /// Create a limit order request.
    pub fn limit(
        category: Category,
        symbol: impl Into<String>,
        side: Side,
        qty: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            price: Some(price),
            order_type: OrderType::Limit,
            ..Self::market(category, symbol, side, qty)
        }
    }

    /// Set the time in force.
    pub fn time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    /// Set as post-only: the order only makes liquidity, never takes it.
    pub fn post_only(mut self) -> Self {
        self.time_in_force = Some(TimeInForce::PostOnly);
        self
    }

    /// Set a client-assigned order ID.
    pub fn order_link_id(mut self, order_link_id: impl Into<String>) -> Self {
        self.order_link_id = Some(order_link_id.into());
        self
    }

    /// Set the reduce-only flag.
    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = Some(reduce_only);
        self
    }

    /// Set the position index for hedge mode.
    pub fn position_idx(mut self, position_idx: u8) -> Self {
        self.position_idx = Some(position_idx);
        self
    }
}

/// Request parameters for amending an open order.
///
/// The order is addressed by either the exchange order ID or the
/// client-assigned order link ID.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendOrderRequest {
    /// Product category.
    pub category: Category,
    /// Instrument symbol.
    pub symbol: String,
    /// Exchange-assigned order ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Client-assigned order ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_link_id: Option<String>,
    /// New quantity. Leave unset to keep the current quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<Decimal>,
    /// New price. Leave unset to keep the current price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

impl AmendOrderRequest {
    /// Amend an order by its exchange-assigned ID.
    pub fn by_order_id(
        category: Category,
        symbol: impl Into<String>,
        order_id: impl Into<String>,
    ) -> Self {
        Self {
            category,
            symbol: symbol.into(),
            order_id: Some(order_id.into()),
            order_link_id: None,
            qty: None,
            price: None,
        }
    }

    /// Amend an order by its client-assigned ID.
    pub fn by_order_link_id(
        category: Category,
        symbol: impl Into<String>,
        order_link_id: impl Into<String>,
    ) -> Self {
        Self {
            category,
            symbol: symbol.into(),
            order_id: None,
            order_link_id: Some(order_link_id.into()),
            qty: None,
            price: None,
        }
    }

    /// Set the new quantity.
    pub fn qty(mut self, qty: Decimal) -> Self {
        self.qty = Some(qty);
        self
    }

    /// Set the new price.
    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }
}

/// Request parameters for canceling an open order.
///
/// The order is addressed by either the exchange order ID or the
/// client-assigned order link ID.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    /// Product category.
    pub category: Category,
    /// Instrument symbol.
    pub symbol: String,
    /// Exchange-assigned order ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Client-assigned order ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_link_id: Option<String>,
}

impl CancelOrderRequest {
    /// Cancel an order by its exchange-assigned ID.
    pub fn by_order_id(
        category: Category,
        symbol: impl Into<String>,
        order_id: impl Into<String>,
    ) -> Self {
        Self {
            category,
            symbol: symbol.into(),
            order_id: Some(order_id.into()),
            order_link_id: None,
        }
    }

    /// Cancel an order by its client-assigned ID.
    pub fn by_order_link_id(
        category: Category,
        symbol: impl Into<String>,
        order_link_id: impl Into<String>,
    ) -> Self {
        Self {
            category,
            symbol: symbol.into(),
            order_id: None,
            order_link_id: Some(order_link_id.into()),
        }
    }
}

/// Acknowledgment returned by order endpoints.
///
/// Order state changes are not reflected here; track them over the
/// private `order` stream or poll the order endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    /// Exchange-assigned order ID.
    pub order_id: String,
    /// Client-assigned order ID, empty if none was given.
    #[serde(default)]
    pub order_link_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_order_serializes_decimal_fields_as_strings() {
        let request = CreateOrderRequest::limit(
            Category::Linear,
            "BTCUSDT",
            Side::Buy,
            "0.001".parse().unwrap(),
            "50000.5".parse().unwrap(),
        )
        .post_only()
        .order_link_id("test-order-1");

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""qty":"0.001""#));
        assert!(json.contains(r#""price":"50000.5""#));
        assert!(json.contains(r#""orderType":"Limit""#));
        assert!(json.contains(r#""timeInForce":"PostOnly""#));
        assert!(json.contains(r#""orderLinkId":"test-order-1""#));
    }

    #[test]
    fn market_order_omits_unset_fields() {
        let request = CreateOrderRequest::market(
            Category::Spot,
            "BTCUSDT",
            Side::Sell,
            "0.5".parse().unwrap(),
        );

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""orderType":"Market""#));
        assert!(!json.contains("price"));
        assert!(!json.contains("timeInForce"));
        assert!(!json.contains("reduceOnly"));
    }

    #[test]
    fn cancel_request_carries_one_identifier() {
        let by_id = CancelOrderRequest::by_order_id(Category::Linear, "ETHUSDT", "abc-123");
        let json = serde_json::to_string(&by_id).unwrap();
        assert!(json.contains(r#""orderId":"abc-123""#));
        assert!(!json.contains("orderLinkId"));

        let by_link = CancelOrderRequest::by_order_link_id(Category::Linear, "ETHUSDT", "mine-7");
        let json = serde_json::to_string(&by_link).unwrap();
        assert!(json.contains(r#""orderLinkId":"mine-7""#));
        assert!(!json.contains(r#""orderId""#));
    }
}
