//! Order endpoints (authentication required).

mod types;

pub use types::*;

use crate::error::BybitError;
use crate::rest::BybitRestClient;
use crate::rest::endpoints::trade;

impl BybitRestClient {
    /// Place an order.
    ///
    /// The acknowledgment only confirms the order was accepted for
    /// matching. Fills and rejections arrive on the private `order`
    /// stream.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use bybit_api_client::rest::BybitRestClient;
    /// use bybit_api_client::rest::trade::CreateOrderRequest;
    /// use bybit_api_client::auth::EnvCredentials;
    /// use bybit_api_client::types::{Category, Side};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = BybitRestClient::builder()
    ///         .credentials(EnvCredentials::from_env())
    ///         .build();
    ///     let request = CreateOrderRequest::limit(
    ///         Category::Linear,
    ///         "BTCUSDT",
    ///         Side::Buy,
    ///         "0.001".parse()?,
    ///         "50000".parse()?,
    ///     )
    ///     .post_only();
    ///     let ack = client.create_order(&request).await?;
    ///     println!("Order accepted: {}", ack.order_id);
    ///     Ok(())
    /// }
    /// ```
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderAck, BybitError> {
        self.signed_post(trade::CREATE_ORDER, request).await
    }

    /// Amend an open order's price or quantity.
    ///
    /// # Arguments
    ///
    /// * `request` - Order identifier plus the fields to change.
    pub async fn amend_order(&self, request: &AmendOrderRequest) -> Result<OrderAck, BybitError> {
        self.signed_post(trade::AMEND_ORDER, request).await
    }

    /// Cancel an open order.
    ///
    /// # Arguments
    ///
    /// * `request` - Order identifier.
    pub async fn cancel_order(&self, request: &CancelOrderRequest) -> Result<OrderAck, BybitError> {
        self.signed_post(trade::CANCEL_ORDER, request).await
    }
}
