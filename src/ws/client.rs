//! WebSocket client configuration and entry point.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::CredentialsProvider;
use crate::error::BybitError;
use crate::types::Network;
use crate::ws::session::{self, BybitWsSession};
use crate::ws::transport::{Connector, TungsteniteConnector};

/// Bybit v5 WebSocket endpoints.
pub mod endpoints {
    /// Mainnet public spot stream
    pub const MAINNET_PUBLIC_SPOT: &str = "wss://stream.bybit.com/v5/public/spot";
    /// Mainnet public linear (USDT/USDC perpetual and futures) stream
    pub const MAINNET_PUBLIC_LINEAR: &str = "wss://stream.bybit.com/v5/public/linear";
    /// Mainnet public inverse contract stream
    pub const MAINNET_PUBLIC_INVERSE: &str = "wss://stream.bybit.com/v5/public/inverse";
    /// Mainnet private stream
    pub const MAINNET_PRIVATE: &str = "wss://stream.bybit.com/v5/private";

    /// Testnet public spot stream
    pub const TESTNET_PUBLIC_SPOT: &str = "wss://stream-testnet.bybit.com/v5/public/spot";
    /// Testnet public linear stream
    pub const TESTNET_PUBLIC_LINEAR: &str = "wss://stream-testnet.bybit.com/v5/public/linear";
    /// Testnet public inverse stream
    pub const TESTNET_PUBLIC_INVERSE: &str = "wss://stream-testnet.bybit.com/v5/public/inverse";
    /// Testnet private stream
    pub const TESTNET_PRIVATE: &str = "wss://stream-testnet.bybit.com/v5/private";

    /// Demo trading private stream. Demo trading has no public streams;
    /// market data comes from the mainnet public endpoints.
    pub const DEMO_PRIVATE: &str = "wss://stream-demo.bybit.com/v5/private";
}

/// Which of the v5 streams a session connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEndpoint {
    /// Public market data for spot instruments
    PublicSpot,
    /// Public market data for linear contracts
    PublicLinear,
    /// Public market data for inverse contracts
    PublicInverse,
    /// Private order, execution, position and wallet updates
    Private,
}

impl StreamEndpoint {
    /// Whether this endpoint requires authentication.
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private)
    }
}

impl std::fmt::Display for StreamEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PublicSpot => "public spot",
            Self::PublicLinear => "public linear",
            Self::PublicInverse => "public inverse",
            Self::Private => "private",
        };
        f.write_str(name)
    }
}

/// Resolve the stream URL for a network and endpoint combination.
///
/// Demo trading only exposes a private stream, so requesting a public
/// endpoint on [`Network::Demo`] returns [`BybitError::UnsupportedEndpoint`].
pub fn stream_url(network: Network, endpoint: StreamEndpoint) -> Result<&'static str, BybitError> {
    let url = match (network, endpoint) {
        (Network::Mainnet, StreamEndpoint::PublicSpot) => endpoints::MAINNET_PUBLIC_SPOT,
        (Network::Mainnet, StreamEndpoint::PublicLinear) => endpoints::MAINNET_PUBLIC_LINEAR,
        (Network::Mainnet, StreamEndpoint::PublicInverse) => endpoints::MAINNET_PUBLIC_INVERSE,
        (Network::Mainnet, StreamEndpoint::Private) => endpoints::MAINNET_PRIVATE,
        (Network::Testnet, StreamEndpoint::PublicSpot) => endpoints::TESTNET_PUBLIC_SPOT,
        (Network::Testnet, StreamEndpoint::PublicLinear) => endpoints::TESTNET_PUBLIC_LINEAR,
        (Network::Testnet, StreamEndpoint::PublicInverse) => endpoints::TESTNET_PUBLIC_INVERSE,
        (Network::Testnet, StreamEndpoint::Private) => endpoints::TESTNET_PRIVATE,
        (Network::Demo, StreamEndpoint::Private) => endpoints::DEMO_PRIVATE,
        (Network::Demo, public) => {
            return Err(BybitError::UnsupportedEndpoint(format!(
                "demo trading has no {public} stream"
            )));
        }
    };
    Ok(url)
}

/// WebSocket session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsConfig {
    /// First reconnect delay
    pub initial_backoff: Duration,
    /// Reconnect delay ceiling
    pub max_backoff: Duration,
    /// Random jitter added to each reconnect delay, in milliseconds
    pub backoff_jitter_ms: u64,
    /// Interval between application-level pings
    pub ping_interval: Duration,
    /// How long to wait for a pong before declaring the connection stale
    pub pong_timeout: Duration,
    /// How long to wait for the auth acknowledgment
    pub auth_timeout: Duration,
    /// How long to wait for subscribe and unsubscribe acknowledgments
    pub ack_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            backoff_jitter_ms: 100,
            ping_interval: Duration::from_secs(20),
            pong_timeout: Duration::from_secs(10),
            auth_timeout: Duration::from_secs(10),
            ack_timeout: Duration::from_secs(10),
        }
    }
}

impl WsConfig {
    pub fn builder() -> WsConfigBuilder {
        WsConfigBuilder::default()
    }
}

/// Builder for [`WsConfig`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use bybit_api_client::ws::WsConfig;
///
/// let config = WsConfig::builder()
///     .reconnect_backoff(Duration::from_millis(500), Duration::from_secs(30))
///     .ping_interval(Duration::from_secs(15))
///     .build();
/// assert_eq!(config.max_backoff, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct WsConfigBuilder {
    config: WsConfig,
}

impl Default for WsConfigBuilder {
    fn default() -> Self {
        Self {
            config: WsConfig::default(),
        }
    }
}

impl WsConfigBuilder {
    /// Set the initial and maximum reconnect delays.
    pub fn reconnect_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set the random jitter added to reconnect delays.
    pub fn backoff_jitter_ms(mut self, jitter_ms: u64) -> Self {
        self.config.backoff_jitter_ms = jitter_ms;
        self
    }

    /// Set the application-level ping interval.
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.config.ping_interval = interval;
        self
    }

    /// Set the pong timeout.
    pub fn pong_timeout(mut self, timeout: Duration) -> Self {
        self.config.pong_timeout = timeout;
        self
    }

    /// Set the authentication acknowledgment timeout.
    pub fn auth_timeout(mut self, timeout: Duration) -> Self {
        self.config.auth_timeout = timeout;
        self
    }

    /// Set the subscribe/unsubscribe acknowledgment timeout.
    pub fn ack_timeout(mut self, timeout: Duration) -> Self {
        self.config.ack_timeout = timeout;
        self
    }

    pub fn build(self) -> WsConfig {
        self.config
    }
}

/// Client for the Bybit v5 WebSocket streams.
///
/// The client holds connection parameters; [`BybitWsClient::start`] spawns
/// the session task and returns a [`BybitWsSession`] handle for subscribing
/// and observing the connection lifecycle.
///
/// # Example
///
/// ```rust,no_run
/// use bybit_api_client::ws::{BybitWsClient, StreamEndpoint};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BybitWsClient::builder(StreamEndpoint::PublicLinear).build()?;
/// let session = client.start();
/// session.connect();
/// let mut orderbook = session.subscribe("orderbook.50.BTCUSDT").await?;
/// while let Some(message) = orderbook.recv().await {
///     println!("{}: {}", message.topic, message.data);
/// }
/// # Ok(())
/// # }
/// ```
pub struct BybitWsClient {
    url: String,
    endpoint: StreamEndpoint,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    config: WsConfig,
}

impl BybitWsClient {
    /// Create a mainnet client for the given endpoint with default
    /// configuration. Private endpoints need [`BybitWsClient::builder`] to
    /// attach credentials.
    pub fn new(endpoint: StreamEndpoint) -> Result<Self, BybitError> {
        Self::builder(endpoint).build()
    }

    pub fn builder(endpoint: StreamEndpoint) -> BybitWsClientBuilder {
        BybitWsClientBuilder {
            network: Network::Mainnet,
            endpoint,
            credentials: None,
            config: WsConfig::default(),
            url: None,
        }
    }

    /// The stream URL this client connects to.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn endpoint(&self) -> StreamEndpoint {
        self.endpoint
    }

    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Spawn the session task using the default TLS WebSocket connector.
    ///
    /// The session starts disconnected; call [`BybitWsSession::connect`] or
    /// subscribe to a topic to bring the connection up.
    pub fn start(&self) -> BybitWsSession {
        self.start_with_connector(TungsteniteConnector)
    }

    /// Spawn the session task with a custom [`Connector`].
    pub fn start_with_connector<C: Connector>(&self, connector: C) -> BybitWsSession {
        session::spawn(
            connector,
            self.url.clone(),
            self.endpoint,
            self.credentials.clone(),
            self.config.clone(),
        )
    }
}

impl std::fmt::Debug for BybitWsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BybitWsClient")
            .field("url", &self.url)
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`BybitWsClient`].
pub struct BybitWsClientBuilder {
    network: Network,
    endpoint: StreamEndpoint,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    config: WsConfig,
    url: Option<String>,
}

impl BybitWsClientBuilder {
    /// Select the network. Defaults to [`Network::Mainnet`].
    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Attach credentials for private streams.
    pub fn credentials(mut self, provider: impl CredentialsProvider + 'static) -> Self {
        self.credentials = Some(Arc::new(provider));
        self
    }

    /// Attach a shared credentials provider.
    pub fn credentials_arc(mut self, provider: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    pub fn config(mut self, config: WsConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the stream URL, bypassing network/endpoint resolution.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn build(self) -> Result<BybitWsClient, BybitError> {
        if self.endpoint.is_private() && self.credentials.is_none() {
            return Err(BybitError::MissingCredentials);
        }
        let url = match self.url {
            Some(url) => url,
            None => stream_url(self.network, self.endpoint)?.to_owned(),
        };
        Ok(BybitWsClient {
            url,
            endpoint: self.endpoint,
            credentials: self.credentials,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;

    #[test]
    fn test_stream_url_resolution() {
        assert_eq!(
            stream_url(Network::Mainnet, StreamEndpoint::PublicLinear).unwrap(),
            "wss://stream.bybit.com/v5/public/linear"
        );
        assert_eq!(
            stream_url(Network::Testnet, StreamEndpoint::Private).unwrap(),
            "wss://stream-testnet.bybit.com/v5/private"
        );
        assert_eq!(
            stream_url(Network::Demo, StreamEndpoint::Private).unwrap(),
            "wss://stream-demo.bybit.com/v5/private"
        );
    }

    #[test]
    fn test_demo_public_stream_is_rejected() {
        let result = stream_url(Network::Demo, StreamEndpoint::PublicSpot);
        assert!(matches!(result, Err(BybitError::UnsupportedEndpoint(_))));
    }

    #[test]
    fn test_private_client_requires_credentials() {
        let result = BybitWsClient::builder(StreamEndpoint::Private).build();
        assert!(matches!(result, Err(BybitError::MissingCredentials)));

        let client = BybitWsClient::builder(StreamEndpoint::Private)
            .credentials(StaticCredentials::new("key", "secret"))
            .build()
            .unwrap();
        assert_eq!(client.url(), endpoints::MAINNET_PRIVATE);
    }

    #[test]
    fn test_url_override() {
        let client = BybitWsClient::builder(StreamEndpoint::PublicSpot)
            .url("ws://127.0.0.1:9999")
            .build()
            .unwrap();
        assert_eq!(client.url(), "ws://127.0.0.1:9999");
    }

    #[test]
    fn test_config_builder_defaults_and_overrides() {
        let config = WsConfig::builder().build();
        assert_eq!(config, WsConfig::default());
        assert_eq!(config.ping_interval, Duration::from_secs(20));

        let config = WsConfig::builder()
            .reconnect_backoff(Duration::from_millis(250), Duration::from_secs(30))
            .backoff_jitter_ms(0)
            .ping_interval(Duration::from_secs(5))
            .pong_timeout(Duration::from_secs(2))
            .build();
        assert_eq!(config.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.max_backoff, Duration::from_secs(30));
        assert_eq!(config.backoff_jitter_ms, 0);
        assert_eq!(config.ping_interval, Duration::from_secs(5));
        assert_eq!(config.pong_timeout, Duration::from_secs(2));
    }
}
