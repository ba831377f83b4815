//! WebSocket transport abstraction.
//!
//! The session state machine only needs text frames in and out, so it talks
//! to a [`Transport`] rather than to tungstenite directly. Production code
//! uses [`TungsteniteConnector`]; tests substitute scripted transports via
//! [`crate::ws::client::BybitWsClient::start_with_connector`].

use std::future::Future;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as TungsteniteError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::TransportError;

/// A connected stream of text frames.
pub trait Transport: Send {
    /// Sends one text frame.
    fn send(&mut self, frame: String) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next text frame, skipping protocol-level noise.
    fn receive(&mut self) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Closes the connection. Best effort, errors are discarded.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Factory for [`Transport`] connections, called on every (re)connect.
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport + 'static;

    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Self::Transport, TransportError>> + Send;
}

/// [`Transport`] over a tokio-tungstenite WebSocket stream.
pub struct TungsteniteTransport {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Transport for TungsteniteTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.inner
            .send(Message::Text(frame.into()))
            .await
            .map_err(|error| match error {
                TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed => {
                    TransportError::closed()
                }
                other => TransportError::Send(other.to_string()),
            })
    }

    async fn receive(&mut self) -> Result<String, TransportError> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.to_string()),
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Ok(text),
                    Err(_) => tracing::debug!("skipping non-utf8 binary frame"),
                },
                // Protocol pings are answered by tungstenite itself.
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    return Err(match frame {
                        Some(frame) => TransportError::closed_with_reason(format!(
                            "{} ({})",
                            frame.reason, frame.code
                        )),
                        None => TransportError::closed(),
                    });
                }
                Some(Err(
                    TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed,
                )) => return Err(TransportError::closed()),
                Some(Err(other)) => return Err(TransportError::Receive(other.to_string())),
                None => return Err(TransportError::closed()),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.inner.close(None).await;
    }
}

/// Default connector backed by [`connect_async`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl Connector for TungsteniteConnector {
    type Transport = TungsteniteTransport;

    async fn connect(&self, url: &str) -> Result<TungsteniteTransport, TransportError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;
        Ok(TungsteniteTransport { inner: stream })
    }
}
