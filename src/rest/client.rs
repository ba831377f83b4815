//! REST API client implementation.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::auth::{
    Credentials, CredentialsProvider, SystemTimestamp, TimestampProvider, sign_request,
};
use crate::error::{ApiError, BybitError, ret_codes};
use crate::rest::account::{
    PositionList, PositionListRequest, SetCollateralSwitchRequest, SetLeverageRequest,
    WalletBalance, WalletBalanceRequest,
};
use crate::rest::endpoints::{self, headers};
use crate::rest::market::{
    FundingHistoryRequest, FundingRateHistory, InstrumentsInfo, InstrumentsInfoRequest,
    KlineRequest, KlineResponse, Orderbook, OrderbookRequest, ServerTime, TickersRequest,
    TickersResponse,
};
use crate::rest::trade::{AmendOrderRequest, CancelOrderRequest, CreateOrderRequest, OrderAck};
use crate::rest::traits::BybitClient;
use crate::types::Network;

/// Default signature validity window in milliseconds.
const DEFAULT_RECV_WINDOW: u64 = 5_000;

/// Default number of retries for transient HTTP failures.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Envelope wrapping every V5 REST response.
#[derive(Debug, Deserialize)]
struct BybitResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    #[serde(default)]
    result: Option<Value>,
}

/// Bybit V5 REST API client.
///
/// Handles request signing, retries on transient failures, and unwrapping
/// of the `retCode`/`retMsg`/`result` response envelope. Clones share the
/// underlying connection pool and request clock.
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
#[derive(Clone)]
pub struct BybitRestClient {
    http_client: ClientWithMiddleware,
    base_url: String,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    clock: Arc<dyn TimestampProvider>,
    recv_window: u64,
}

impl BybitRestClient {
    /// Create a client for the mainnet with no credentials.
    ///
    /// Only public market data endpoints will be available. Use
    /// [`BybitRestClient::builder`] to attach credentials or select
    /// another network.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for configuring the client.
    pub fn builder() -> BybitRestClientBuilder {
        BybitRestClientBuilder::default()
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Synchronize the request clock with the server.
    ///
    /// Fetches the server time and stores the difference to the local
    /// clock, so subsequent signed requests carry timestamps the server
    /// accepts even when the local clock drifts beyond `recv_window`.
    /// Returns the measured offset in milliseconds.
    pub async fn sync_time(&self) -> Result<i64, BybitError> {
        let server_time = self.get_server_time().await?;
        let offset_ms = server_time.time_ms() - wall_clock_ms();
        self.clock.set_offset_ms(offset_ms);
        debug!(offset_ms, "synchronized request clock with server time");
        Ok(offset_ms)
    }

    /// Perform a GET request to a public endpoint.
    pub(crate) async fn public_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<T, BybitError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.http_client.get(&url).send().await?;
        self.parse_response(response).await
    }

    /// Perform a GET request to a public endpoint with query parameters.
    pub(crate) async fn public_get_with_params<T, Q>(
        &self,
        endpoint: &str,
        params: &Q,
    ) -> Result<T, BybitError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let query_string = serde_urlencoded::to_string(params)
            .map_err(|e| BybitError::InvalidResponse(e.to_string()))?;
        let url = if query_string.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, query_string)
        };
        let response = self.http_client.get(&url).send().await?;
        self.parse_response(response).await
    }

    /// Perform a signed GET request to a private endpoint.
    ///
    /// The query string doubles as the signed payload, so the exact same
    /// encoding is used for both.
    pub(crate) async fn signed_get<T, Q>(&self, endpoint: &str, params: &Q) -> Result<T, BybitError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let credentials = self.signing_credentials()?;
        let query_string = serde_urlencoded::to_string(params)
            .map_err(|e| BybitError::InvalidResponse(e.to_string()))?;
        let timestamp = self.clock.timestamp_ms();
        let signature = sign_request(credentials, timestamp, self.recv_window, &query_string)?;
        let url = if query_string.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, query_string)
        };
        let response = self
            .http_client
            .get(&url)
            .header(headers::API_KEY, credentials.api_key.as_str())
            .header(headers::TIMESTAMP, timestamp.to_string())
            .header(headers::RECV_WINDOW, self.recv_window.to_string())
            .header(headers::SIGN, signature)
            .header(headers::SIGN_TYPE, "2")
            .send()
            .await?;
        self.parse_response(response).await
    }

    /// Perform a signed POST request to a private endpoint.
    ///
    /// The JSON body is the signed payload, byte for byte.
    pub(crate) async fn signed_post<T, P>(
        &self,
        endpoint: &str,
        request: &P,
    ) -> Result<T, BybitError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let credentials = self.signing_credentials()?;
        let body = serde_json::to_string(request)?;
        let timestamp = self.clock.timestamp_ms();
        let signature = sign_request(credentials, timestamp, self.recv_window, &body)?;
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http_client
            .post(&url)
            .header(headers::API_KEY, credentials.api_key.as_str())
            .header(headers::TIMESTAMP, timestamp.to_string())
            .header(headers::RECV_WINDOW, self.recv_window.to_string())
            .header(headers::SIGN, signature)
            .header(headers::SIGN_TYPE, "2")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        self.parse_response(response).await
    }

    fn signing_credentials(&self) -> Result<&Credentials, BybitError> {
        Ok(self
            .credentials
            .as_ref()
            .ok_or(BybitError::MissingCredentials)?
            .get_credentials())
    }

    /// Unwrap the response envelope, surfacing API-level errors.
    async fn parse_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BybitError> {
        let status = response.status();
        let limit_reset_ms = header_ms(&response, headers::LIMIT_RESET_TIMESTAMP);
        let body = response.text().await?;
        let envelope: BybitResponse = serde_json::from_str(&body).map_err(|e| {
            BybitError::InvalidResponse(format!("failed to parse response (status {status}): {e}"))
        })?;
        if envelope.ret_code != ret_codes::OK {
            if envelope.ret_code == ret_codes::RATE_LIMIT_EXCEEDED {
                let retry_after_ms = limit_reset_ms
                    .map(|reset_ms| reset_ms.saturating_sub(wall_clock_ms().max(0) as u64));
                return Err(BybitError::RateLimitExceeded { retry_after_ms });
            }
            return Err(BybitError::Api(ApiError::new(
                envelope.ret_code,
                envelope.ret_msg,
            )));
        }
        serde_json::from_value(envelope.result.unwrap_or(Value::Null))
            .map_err(|e| BybitError::InvalidResponse(format!("failed to decode result: {e}")))
    }
}

impl Default for BybitRestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BybitRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BybitRestClient")
            .field("base_url", &self.base_url)
            .field("recv_window", &self.recv_window)
            .field("has_credentials", &self.credentials.is_some())
            .finish()
    }
}

fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn header_ms(response: &reqwest::Response, name: &str) -> Option<u64> {
    response.headers().get(name)?.to_str().ok()?.parse().ok()
}

/// Builder for [`BybitRestClient`].
pub struct BybitRestClientBuilder {
    network: Network,
    base_url: Option<String>,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    clock: Option<Arc<dyn TimestampProvider>>,
    recv_window: u64,
    user_agent: Option<String>,
    max_retries: u32,
}

impl std::fmt::Debug for BybitRestClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BybitRestClientBuilder")
            .field("network", &self.network)
            .field("base_url", &self.base_url)
            .field("recv_window", &self.recv_window)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("has_credentials", &self.credentials.is_some())
            .field("has_clock", &self.clock.is_some())
            .finish()
    }
}

impl Default for BybitRestClientBuilder {
    fn default() -> Self {
        Self {
            network: Network::default(),
            base_url: None,
            credentials: None,
            clock: None,
            recv_window: DEFAULT_RECV_WINDOW,
            user_agent: None,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl BybitRestClientBuilder {
    /// Select the network to trade on (default: mainnet).
    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Override the base URL, bypassing network resolution.
    ///
    /// Intended for routing through proxies and for tests.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the credentials used to sign private requests.
    pub fn credentials(mut self, provider: impl CredentialsProvider + 'static) -> Self {
        self.credentials = Some(Arc::new(provider));
        self
    }

    /// Set a shared credentials provider.
    pub fn credentials_arc(mut self, provider: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Set the timestamp source for request signing.
    ///
    /// Defaults to the system clock. Tests inject a fixed timestamp here
    /// to make signatures reproducible.
    pub fn timestamp_provider(mut self, provider: Arc<dyn TimestampProvider>) -> Self {
        self.clock = Some(provider);
        self
    }

    /// Set the signature validity window in milliseconds (default: 5000).
    ///
    /// The server rejects signed requests whose timestamp is older than
    /// this window by the time they arrive.
    pub fn recv_window(mut self, recv_window: u64) -> Self {
        self.recv_window = recv_window;
        self
    }

    /// Set a custom User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the number of retries for transient HTTP failures (default: 3).
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Build the client.
    pub fn build(self) -> BybitRestClient {
        let mut default_headers = HeaderMap::new();
        let agent = self
            .user_agent
            .unwrap_or_else(|| format!("bybit-api-client/{}", env!("CARGO_PKG_VERSION")));
        if let Ok(value) = HeaderValue::from_str(&agent) {
            default_headers.insert(USER_AGENT, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(self.max_retries);
        let http_client = ClientBuilder::new(client)
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        let base_url = self
            .base_url
            .unwrap_or_else(|| endpoints::rest_base_url(self.network).to_string());
        BybitRestClient {
            http_client,
            base_url,
            credentials: self.credentials,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemTimestamp::new())),
            recv_window: self.recv_window,
        }
    }
}

impl BybitClient for BybitRestClient {
    // ========== Market Data ==========

    async fn get_server_time(&self) -> Result<ServerTime, BybitError> {
        BybitRestClient::get_server_time(self).await
    }

    async fn get_instruments_info(
        &self,
        request: &InstrumentsInfoRequest,
    ) -> Result<InstrumentsInfo, BybitError> {
        BybitRestClient::get_instruments_info(self, request).await
    }

    async fn get_orderbook(&self, request: &OrderbookRequest) -> Result<Orderbook, BybitError> {
        BybitRestClient::get_orderbook(self, request).await
    }

    async fn get_kline(&self, request: &KlineRequest) -> Result<KlineResponse, BybitError> {
        BybitRestClient::get_kline(self, request).await
    }

    async fn get_tickers(&self, request: &TickersRequest) -> Result<TickersResponse, BybitError> {
        BybitRestClient::get_tickers(self, request).await
    }

    async fn get_funding_rate_history(
        &self,
        request: &FundingHistoryRequest,
    ) -> Result<FundingRateHistory, BybitError> {
        BybitRestClient::get_funding_rate_history(self, request).await
    }

    // ========== Trading ==========

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderAck, BybitError> {
        BybitRestClient::create_order(self, request).await
    }

    async fn amend_order(&self, request: &AmendOrderRequest) -> Result<OrderAck, BybitError> {
        BybitRestClient::amend_order(self, request).await
    }

    async fn cancel_order(&self, request: &CancelOrderRequest) -> Result<OrderAck, BybitError> {
        BybitRestClient::cancel_order(self, request).await
    }

    // ========== Positions and Account ==========

    async fn get_positions(
        &self,
        request: &PositionListRequest,
    ) -> Result<PositionList, BybitError> {
        BybitRestClient::get_positions(self, request).await
    }

    async fn set_leverage(&self, request: &SetLeverageRequest) -> Result<(), BybitError> {
        BybitRestClient::set_leverage(self, request).await
    }

    async fn get_wallet_balance(
        &self,
        request: &WalletBalanceRequest,
    ) -> Result<WalletBalance, BybitError> {
        BybitRestClient::get_wallet_balance(self, request).await
    }

    async fn set_collateral_switch(
        &self,
        request: &SetCollateralSwitchRequest,
    ) -> Result<(), BybitError> {
        BybitRestClient::set_collateral_switch(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;

    #[test]
    fn builder_defaults_to_mainnet() {
        let client = BybitRestClient::new();
        assert_eq!(client.base_url(), endpoints::BYBIT_MAINNET_URL);
        assert_eq!(client.recv_window, DEFAULT_RECV_WINDOW);
        assert!(client.credentials.is_none());
    }

    #[test]
    fn builder_resolves_network_urls() {
        let testnet = BybitRestClient::builder().network(Network::Testnet).build();
        assert_eq!(testnet.base_url(), endpoints::BYBIT_TESTNET_URL);

        let demo = BybitRestClient::builder().network(Network::Demo).build();
        assert_eq!(demo.base_url(), endpoints::BYBIT_DEMO_URL);
    }

    #[test]
    fn builder_base_url_overrides_network() {
        let client = BybitRestClient::builder()
            .network(Network::Testnet)
            .base_url("http://localhost:8080")
            .build();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn debug_output_hides_credentials() {
        let client = BybitRestClient::builder()
            .credentials(StaticCredentials::new("test-key", "test-secret"))
            .build();
        let output = format!("{client:?}");
        assert!(output.contains("has_credentials: true"));
        assert!(!output.contains("test-key"));
        assert!(!output.contains("test-secret"));
    }

    #[test]
    fn missing_credentials_is_surfaced() {
        let client = BybitRestClient::new();
        let error = client.signing_credentials().unwrap_err();
        assert!(matches!(error, BybitError::MissingCredentials));
    }
}
