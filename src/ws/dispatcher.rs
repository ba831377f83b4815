//! Inbound frame dispatch.
//!
//! Every raw frame from the transport passes through here exactly once, in
//! arrival order. Pushes for a topic go straight into that topic's consumer
//! channel, which preserves per-topic ordering; control frames are handed
//! back to the session loop as [`ControlEvent`]s.

use tracing::{debug, warn};

use crate::ws::messages::{InboundFrame, decode_frame};
use crate::ws::registry::SharedRegistry;

/// Control-plane outcome of one dispatched frame. Data pushes are delivered
/// internally and produce no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ControlEvent {
    Pong,
    AuthAck {
        success: bool,
        ret_msg: Option<String>,
    },
    SubscribeAck {
        req_id: Option<String>,
        success: bool,
        ret_msg: Option<String>,
    },
    UnsubscribeAck {
        req_id: Option<String>,
        success: bool,
        ret_msg: Option<String>,
    },
}

#[derive(Debug)]
pub(crate) struct Dispatcher {
    registry: SharedRegistry,
}

impl Dispatcher {
    pub(crate) fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// Decodes and routes one raw frame. Malformed and unrecognized frames
    /// are logged and dropped rather than failing the connection.
    pub(crate) async fn dispatch(&self, raw: &str) -> Option<ControlEvent> {
        let frame = match decode_frame(raw) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(%error, frame = raw, "dropping undecodable frame");
                return None;
            }
        };

        match frame {
            InboundFrame::Push(message) => {
                let sender = {
                    let registry = self.registry.lock().await;
                    registry.consumer(&message.topic)
                };
                match sender {
                    Some(sender) => {
                        if sender.send(message).is_err() {
                            debug!("discarding push, consumer handle dropped");
                        }
                    }
                    None => warn!(topic = %message.topic, "push for unregistered topic"),
                }
                None
            }
            InboundFrame::Pong => Some(ControlEvent::Pong),
            InboundFrame::AuthAck {
                success,
                ret_msg,
                conn_id,
            } => {
                debug!(success, ?conn_id, "authentication acknowledged");
                Some(ControlEvent::AuthAck { success, ret_msg })
            }
            InboundFrame::SubscribeAck {
                req_id,
                success,
                ret_msg,
            } => Some(ControlEvent::SubscribeAck {
                req_id,
                success,
                ret_msg,
            }),
            InboundFrame::UnsubscribeAck {
                req_id,
                success,
                ret_msg,
            } => Some(ControlEvent::UnsubscribeAck {
                req_id,
                success,
                ret_msg,
            }),
            InboundFrame::Unknown => {
                debug!(frame = raw, "ignoring unrecognized frame");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Mutex;
    use tokio::sync::mpsc;

    use super::*;
    use crate::ws::registry::SubscriptionRegistry;
    use crate::ws::topic::Topic;

    fn shared_registry() -> SharedRegistry {
        Arc::new(Mutex::new(SubscriptionRegistry::new()))
    }

    #[tokio::test]
    async fn test_push_is_delivered_to_topic_consumer() {
        let registry = shared_registry();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry
            .lock()
            .await
            .add(Topic::new("publicTrade.BTCUSDT").unwrap(), tx);

        let dispatcher = Dispatcher::new(registry);
        let event = dispatcher
            .dispatch(r#"{"topic":"publicTrade.BTCUSDT","type":"snapshot","ts":1,"data":[{"p":"17000"}]}"#)
            .await;

        assert_eq!(event, None);
        let message = rx.try_recv().unwrap();
        assert_eq!(message.topic.as_str(), "publicTrade.BTCUSDT");
    }

    #[tokio::test]
    async fn test_push_for_unknown_topic_is_dropped() {
        let dispatcher = Dispatcher::new(shared_registry());
        let event = dispatcher
            .dispatch(r#"{"topic":"tickers.BTCUSDT","ts":1,"data":{}}"#)
            .await;
        assert_eq!(event, None);
    }

    #[tokio::test]
    async fn test_control_frames_become_events() {
        let dispatcher = Dispatcher::new(shared_registry());

        assert_eq!(
            dispatcher.dispatch(r#"{"op":"pong"}"#).await,
            Some(ControlEvent::Pong)
        );
        assert_eq!(
            dispatcher
                .dispatch(r#"{"op":"auth","success":true,"conn_id":"x"}"#)
                .await,
            Some(ControlEvent::AuthAck {
                success: true,
                ret_msg: None,
            })
        );
        assert_eq!(
            dispatcher
                .dispatch(r#"{"op":"subscribe","req_id":"4","success":true}"#)
                .await,
            Some(ControlEvent::SubscribeAck {
                req_id: Some("4".to_owned()),
                success: true,
                ret_msg: None,
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_frame_is_dropped() {
        let dispatcher = Dispatcher::new(shared_registry());
        assert_eq!(dispatcher.dispatch("{{not json").await, None);
    }
}
