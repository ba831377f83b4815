//! WebSocket streaming API.
//!
//! [`BybitWsClient`] resolves the stream URL for a network/endpoint pair
//! and spawns a [`BybitWsSession`], the self-healing connection described
//! in [`session`]. Topics are subscribed through the session handle and
//! consumed as [`TopicStream`]s.

mod backoff;
mod dispatcher;
mod heartbeat;
mod messages;
mod registry;
mod topic;
mod transport;

pub mod client;
pub mod session;

pub use client::{
    BybitWsClient, BybitWsClientBuilder, StreamEndpoint, WsConfig, WsConfigBuilder, endpoints,
    stream_url,
};
pub use messages::InboundMessage;
pub use registry::TopicState;
pub use session::{BybitWsSession, SessionState, TopicStream};
pub use topic::{Topic, topics};
pub use transport::{Connector, Transport, TungsteniteConnector, TungsteniteTransport};
