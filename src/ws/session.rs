//! WebSocket session lifecycle management.
//!
//! A session owns one logical connection to a Bybit stream and keeps it
//! alive across network failures: `Disconnected → Connecting →
//! Authenticating (private only) → Resubscribing → Live`, falling back to
//! `Reconnecting` with capped exponential backoff whenever the transport or
//! heartbeat fails, and terminating in `Closed` only on explicit shutdown.
//!
//! Callers interact through the cloneable [`BybitWsSession`] handle:
//! subscriptions are recorded in the shared registry immediately and
//! replayed on every (re)connect, so a subscribe call never blocks on the
//! connection coming up. Each subscription yields a [`TopicStream`] that
//! receives that topic's pushes in wire order.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::auth::{CredentialsProvider, sign_ws_auth};
use crate::error::{BybitError, TransportError};
use crate::ws::backoff::ExponentialBackoff;
use crate::ws::client::{StreamEndpoint, WsConfig};
use crate::ws::dispatcher::{ControlEvent, Dispatcher};
use crate::ws::heartbeat::{HeartbeatEvent, HeartbeatMonitor};
use crate::ws::messages::{InboundMessage, OpRequest};
use crate::ws::registry::{SharedRegistry, SubscriptionRegistry, TopicState};
use crate::ws::topic::Topic;
use crate::ws::transport::{Connector, Transport};

/// Connection lifecycle state, observable via [`BybitWsSession::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection and none being attempted
    Disconnected,
    /// Transport connect in progress
    Connecting,
    /// Connected, waiting for the auth acknowledgment
    Authenticating,
    /// Replaying registered subscriptions
    Resubscribing,
    /// Connection established and serviced
    Live,
    /// Waiting out the backoff delay before the next connect attempt
    Reconnecting,
    /// Shut down; terminal
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Resubscribing => "resubscribing",
            Self::Live => "live",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
enum Command {
    Connect,
    Subscribe(Topic),
    Unsubscribe(Topic),
    Close,
}

/// Ordered stream of pushes for one subscribed topic.
///
/// Messages arrive in wire order and keep arriving across reconnects once
/// the topic is re-confirmed. Dropping the stream stops delivery; call
/// [`BybitWsSession::unsubscribe`] to also remove the topic from the
/// registry.
#[derive(Debug)]
pub struct TopicStream {
    topic: Topic,
    receiver: UnboundedReceiver<InboundMessage>,
}

impl TopicStream {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Receives the next message, or `None` once the session is gone and
    /// the buffer is drained.
    pub async fn recv(&mut self) -> Option<InboundMessage> {
        self.receiver.recv().await
    }
}

impl Stream for TopicStream {
    type Item = InboundMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Handle to a running WebSocket session.
///
/// Cheap to clone; all clones control the same session. Created by
/// [`crate::ws::BybitWsClient::start`].
#[derive(Debug, Clone)]
pub struct BybitWsSession {
    endpoint: StreamEndpoint,
    cmd_tx: UnboundedSender<Command>,
    state_rx: watch::Receiver<SessionState>,
    registry: SharedRegistry,
    cancel: CancellationToken,
}

impl BybitWsSession {
    /// Triggers connection establishment without subscribing to anything.
    /// Subscribing to a topic on a disconnected session has the same
    /// effect.
    pub fn connect(&self) {
        let _ = self.cmd_tx.send(Command::Connect);
    }

    pub fn endpoint(&self) -> StreamEndpoint {
        self.endpoint
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Stream of state changes, starting with the current state. Useful for
    /// callers who want their own giving-up policy on top of the session's
    /// indefinite reconnecting.
    pub fn state_stream(&self) -> WatchStream<SessionState> {
        WatchStream::new(self.state_rx.clone())
    }

    /// Registers a topic and returns its consumer stream.
    ///
    /// Returns immediately: the subscription starts out pending and is
    /// confirmed (or rejected) asynchronously, which
    /// [`BybitWsSession::topic_state`] reports. On a disconnected session
    /// this also triggers connection establishment. Re-subscribing an
    /// already-registered topic replaces its consumer stream.
    ///
    /// # Errors
    ///
    /// [`BybitError::InvalidTopic`] for malformed topic names or a
    /// private/public mismatch with this session's endpoint, and
    /// [`BybitError::SessionClosed`] after [`BybitWsSession::close`].
    pub async fn subscribe(&self, topic: impl Into<String>) -> Result<TopicStream, BybitError> {
        let topic = Topic::new(topic)?;
        if self.is_closed() {
            return Err(BybitError::SessionClosed);
        }
        if topic.is_private() != self.endpoint.is_private() {
            return Err(BybitError::InvalidTopic(format!(
                "topic {topic} does not belong on the {} stream",
                self.endpoint
            )));
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        {
            let mut registry = self.registry.lock().await;
            registry.add(topic.clone(), sender);
        }
        if self.cmd_tx.send(Command::Subscribe(topic.clone())).is_err() {
            let mut registry = self.registry.lock().await;
            registry.finish_remove(&topic);
            return Err(BybitError::SessionClosed);
        }
        Ok(TopicStream { topic, receiver })
    }

    /// Removes a topic from the registry and, when live, tells the venue.
    /// Unsubscribing an unknown topic is a no-op.
    pub async fn unsubscribe(&self, topic: impl Into<String>) -> Result<(), BybitError> {
        let topic = Topic::new(topic)?;
        if self.is_closed() || self.state() != SessionState::Live {
            // Nothing on the wire to undo; forgetting the entry stops it
            // from being replayed.
            self.registry.lock().await.finish_remove(&topic);
            return Ok(());
        }
        let flagged = self.registry.lock().await.mark_removing(&topic);
        if flagged {
            let _ = self.cmd_tx.send(Command::Unsubscribe(topic));
        }
        Ok(())
    }

    /// State of one subscription, or `None` if the topic is not registered.
    pub async fn topic_state(&self, topic: impl Into<String>) -> Option<TopicState> {
        let topic = Topic::new(topic).ok()?;
        self.registry.lock().await.topic_state(&topic)
    }

    /// Shuts the session down and waits for the terminal state.
    ///
    /// Cancels any in-flight connect, authenticate or receive operation and
    /// closes the transport. Registered subscriptions are left in the
    /// registry untouched. Idempotent.
    pub async fn close(&self) {
        self.cancel.cancel();
        let _ = self.cmd_tx.send(Command::Close);
        let mut state_rx = self.state_rx.clone();
        let _ = state_rx
            .wait_for(|state| *state == SessionState::Closed)
            .await;
    }

    fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
            || *self.state_rx.borrow() == SessionState::Closed
            || self.cmd_tx.is_closed()
    }
}

/// Spawns the session task and returns its handle.
pub(crate) fn spawn<C: Connector>(
    connector: C,
    url: String,
    endpoint: StreamEndpoint,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    config: WsConfig,
) -> BybitWsSession {
    let registry: SharedRegistry = Arc::new(Mutex::new(SubscriptionRegistry::new()));
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(SessionState::Disconnected);
    let cancel = CancellationToken::new();

    let task = SessionTask {
        heartbeat: HeartbeatMonitor::new(config.ping_interval, config.pong_timeout),
        backoff: ExponentialBackoff::new(
            config.initial_backoff,
            config.max_backoff,
            config.backoff_jitter_ms,
        ),
        connector,
        url,
        private: endpoint.is_private(),
        credentials,
        config,
        registry: Arc::clone(&registry),
        dispatcher: Dispatcher::new(Arc::clone(&registry)),
        cmd_rx,
        state_tx,
        cancel: cancel.clone(),
        transport: None,
        next_req_id: 1,
        pending: HashMap::new(),
    };
    tokio::spawn(task.run());

    BybitWsSession {
        endpoint,
        cmd_tx,
        state_rx,
        registry,
        cancel,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Subscribe,
    Unsubscribe,
}

#[derive(Debug)]
struct PendingOp {
    topic: Topic,
    kind: OpKind,
    deadline: Instant,
}

struct SessionTask<C: Connector> {
    connector: C,
    url: String,
    private: bool,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    config: WsConfig,
    registry: SharedRegistry,
    dispatcher: Dispatcher,
    cmd_rx: UnboundedReceiver<Command>,
    state_tx: watch::Sender<SessionState>,
    cancel: CancellationToken,
    backoff: ExponentialBackoff,
    transport: Option<C::Transport>,
    heartbeat: HeartbeatMonitor,
    next_req_id: u64,
    /// Subscribe/unsubscribe frames awaiting acknowledgment, by req_id
    pending: HashMap<u64, PendingOp>,
}

impl<C: Connector> SessionTask<C> {
    async fn run(mut self) {
        let mut state = SessionState::Disconnected;
        loop {
            self.publish(state);
            state = match state {
                SessionState::Disconnected => self.run_disconnected().await,
                SessionState::Connecting => self.run_connecting().await,
                SessionState::Authenticating => self.run_authenticating().await,
                SessionState::Resubscribing => self.run_resubscribing().await,
                SessionState::Live => self.run_live().await,
                SessionState::Reconnecting => self.run_reconnecting().await,
                SessionState::Closed => break,
            };
        }
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
        }
        info!("session closed");
    }

    fn publish(&self, state: SessionState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
        if changed {
            debug!(%state, "session state changed");
        }
    }

    fn take_req_id(&mut self) -> u64 {
        let id = self.next_req_id;
        self.next_req_id += 1;
        id
    }

    async fn run_disconnected(&mut self) -> SessionState {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return SessionState::Closed,
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Connect | Command::Subscribe(_)) => {
                        return SessionState::Connecting;
                    }
                    Some(Command::Unsubscribe(topic)) => {
                        self.registry.lock().await.finish_remove(&topic);
                    }
                    Some(Command::Close) | None => return SessionState::Closed,
                },
            }
        }
    }

    async fn run_connecting(&mut self) -> SessionState {
        debug!(url = %self.url, attempt = self.backoff.attempt(), "connecting");
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => SessionState::Closed,
            result = self.connector.connect(&self.url) => match result {
                Ok(transport) => {
                    info!(url = %self.url, "connected");
                    self.transport = Some(transport);
                    if self.private {
                        SessionState::Authenticating
                    } else {
                        SessionState::Resubscribing
                    }
                }
                Err(error) => {
                    warn!(%error, "connect failed");
                    SessionState::Reconnecting
                }
            },
        }
    }

    async fn run_authenticating(&mut self) -> SessionState {
        let Some(mut transport) = self.transport.take() else {
            return SessionState::Reconnecting;
        };
        let next = self.authenticate(&mut transport).await;
        if next == SessionState::Resubscribing {
            self.transport = Some(transport);
        } else {
            transport.close().await;
        }
        next
    }

    async fn authenticate(&mut self, transport: &mut C::Transport) -> SessionState {
        let Some(provider) = self.credentials.clone() else {
            // Builders refuse to construct private clients without
            // credentials, so this is unreachable in practice.
            error!("private stream has no credentials");
            return SessionState::Closed;
        };
        let credentials = provider.get_credentials().clone();
        let expires = auth_expires_ms();
        let signature = match sign_ws_auth(&credentials, expires) {
            Ok(signature) => signature,
            Err(error) => {
                error!(%error, "failed to sign auth challenge");
                return SessionState::Reconnecting;
            }
        };
        let frame = OpRequest::auth(&credentials.api_key, expires, &signature);
        if let Err(error) = send_frame(transport, &frame).await {
            warn!(%error, "failed to send auth frame");
            return SessionState::Reconnecting;
        }

        let deadline = Instant::now() + self.config.auth_timeout;
        let cancel = self.cancel.clone();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return SessionState::Closed,
                _ = tokio::time::sleep_until(deadline) => {
                    warn!("authentication timed out");
                    return SessionState::Reconnecting;
                }
                received = transport.receive() => match received {
                    Ok(raw) => match self.dispatcher.dispatch(&raw).await {
                        Some(ControlEvent::AuthAck { success: true, .. }) => {
                            info!("authenticated");
                            return SessionState::Resubscribing;
                        }
                        Some(ControlEvent::AuthAck { success: false, ret_msg }) => {
                            error!(
                                reason = ret_msg.as_deref().unwrap_or("unknown"),
                                "authentication rejected, retrying with backoff"
                            );
                            return SessionState::Reconnecting;
                        }
                        Some(other) => {
                            debug!(?other, "ignoring control frame during authentication");
                        }
                        None => {}
                    },
                    Err(error) => {
                        warn!(%error, "connection lost during authentication");
                        return SessionState::Reconnecting;
                    }
                },
            }
        }
    }

    async fn run_resubscribing(&mut self) -> SessionState {
        let Some(mut transport) = self.transport.take() else {
            return SessionState::Reconnecting;
        };
        let next = self.resubscribe(&mut transport).await;
        if next == SessionState::Live {
            self.transport = Some(transport);
        } else {
            transport.close().await;
            self.pending.clear();
        }
        next
    }

    async fn resubscribe(&mut self, transport: &mut C::Transport) -> SessionState {
        let topics = {
            let mut registry = self.registry.lock().await;
            registry.purge_removing();
            registry.reset_to_pending();
            registry.snapshot_active_topics()
        };
        if topics.is_empty() {
            return SessionState::Live;
        }

        info!(count = topics.len(), "replaying subscriptions");
        let deadline = Instant::now() + self.config.ack_timeout;
        for topic in topics {
            let req_id = self.take_req_id();
            let frame = OpRequest::subscribe(req_id, std::slice::from_ref(&topic));
            if let Err(error) = send_frame(transport, &frame).await {
                warn!(%error, "failed to send subscribe frame");
                return SessionState::Reconnecting;
            }
            self.pending.insert(
                req_id,
                PendingOp {
                    topic,
                    kind: OpKind::Subscribe,
                    deadline,
                },
            );
        }

        let cancel = self.cancel.clone();
        loop {
            if !self.pending.values().any(|op| op.kind == OpKind::Subscribe) {
                return SessionState::Live;
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return SessionState::Closed,
                _ = tokio::time::sleep_until(deadline) => {
                    self.fail_outstanding_subscribes().await;
                    return SessionState::Live;
                }
                received = transport.receive() => match received {
                    Ok(raw) => {
                        if let Some(event) = self.dispatcher.dispatch(&raw).await {
                            self.handle_control_event(event).await;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "connection lost while resubscribing");
                        return SessionState::Reconnecting;
                    }
                },
            }
        }
    }

    async fn run_live(&mut self) -> SessionState {
        let Some(mut transport) = self.transport.take() else {
            return SessionState::Reconnecting;
        };
        let next = self.live_loop(&mut transport).await;
        transport.close().await;
        self.pending.clear();
        next
    }

    async fn live_loop(&mut self, transport: &mut C::Transport) -> SessionState {
        info!("session live");
        self.backoff.reset();
        self.heartbeat.reset();
        let cancel = self.cancel.clone();
        loop {
            let ack_deadline = self.pending.values().map(|op| op.deadline).min();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return SessionState::Closed,
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Connect) => {}
                    Some(Command::Subscribe(topic)) => {
                        if self.should_send_subscribe(&topic).await {
                            if let Err(error) = self.send_op(transport, OpKind::Subscribe, topic).await {
                                warn!(%error, "failed to send subscribe frame");
                                return SessionState::Reconnecting;
                            }
                        }
                    }
                    Some(Command::Unsubscribe(topic)) => {
                        if self.should_send_unsubscribe(&topic).await {
                            if let Err(error) = self.send_op(transport, OpKind::Unsubscribe, topic).await {
                                warn!(%error, "failed to send unsubscribe frame");
                                return SessionState::Reconnecting;
                            }
                        }
                    }
                    Some(Command::Close) | None => return SessionState::Closed,
                },
                event = self.heartbeat.next_event() => match event {
                    HeartbeatEvent::Due => {
                        if let Err(error) = send_frame(transport, &OpRequest::ping()).await {
                            warn!(%error, "failed to send ping");
                            return SessionState::Reconnecting;
                        }
                        self.heartbeat.ping_sent();
                    }
                    HeartbeatEvent::TimedOut => {
                        warn!("heartbeat timed out, reconnecting");
                        return SessionState::Reconnecting;
                    }
                },
                _ = tokio::time::sleep_until(
                    ack_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(86_400)),
                ), if ack_deadline.is_some() => {
                    self.expire_pending().await;
                }
                received = transport.receive() => match received {
                    Ok(raw) => {
                        if let Some(event) = self.dispatcher.dispatch(&raw).await {
                            self.handle_control_event(event).await;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "connection lost");
                        return SessionState::Reconnecting;
                    }
                },
            }
        }
    }

    async fn run_reconnecting(&mut self) -> SessionState {
        self.pending.clear();
        let delay = self.backoff.next_delay();
        info!(
            delay_ms = delay.as_millis() as u64,
            attempt = self.backoff.attempt(),
            "reconnecting after backoff delay"
        );
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => SessionState::Closed,
            _ = tokio::time::sleep(delay) => SessionState::Connecting,
        }
    }

    async fn send_op(
        &mut self,
        transport: &mut C::Transport,
        kind: OpKind,
        topic: Topic,
    ) -> Result<(), TransportError> {
        let req_id = self.take_req_id();
        let frame = match kind {
            OpKind::Subscribe => OpRequest::subscribe(req_id, std::slice::from_ref(&topic)),
            OpKind::Unsubscribe => OpRequest::unsubscribe(req_id, std::slice::from_ref(&topic)),
        };
        send_frame(transport, &frame).await?;
        self.pending.insert(
            req_id,
            PendingOp {
                topic,
                kind,
                deadline: Instant::now() + self.config.ack_timeout,
            },
        );
        Ok(())
    }

    /// A subscribe command warrants a frame only while the entry is still
    /// pending with no frame in flight; anything else is a replay or
    /// unsubscribe race that already took care of the wire side.
    async fn should_send_subscribe(&mut self, topic: &Topic) -> bool {
        if self.pending.values().any(|op| op.topic == *topic) {
            return false;
        }
        let registry = self.registry.lock().await;
        matches!(registry.topic_state(topic), Some(TopicState::Pending))
    }

    async fn should_send_unsubscribe(&mut self, topic: &Topic) -> bool {
        if self
            .pending
            .values()
            .any(|op| op.topic == *topic && op.kind == OpKind::Unsubscribe)
        {
            return false;
        }
        self.registry.lock().await.topic_state(topic).is_some()
    }

    async fn handle_control_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Pong => self.heartbeat.pong_received(),
            ControlEvent::AuthAck { success, ret_msg } => {
                debug!(success, ?ret_msg, "auth acknowledgment outside authentication");
            }
            ControlEvent::SubscribeAck {
                req_id,
                success,
                ret_msg,
            } => {
                let Some(op) = self.resolve_pending(req_id.as_deref(), OpKind::Subscribe) else {
                    debug!(?req_id, "subscribe ack with no matching request");
                    return;
                };
                let mut registry = self.registry.lock().await;
                if success {
                    debug!(topic = %op.topic, "subscription active");
                    registry.mark_active(&op.topic);
                } else {
                    let reason = ret_msg.unwrap_or_else(|| "subscription rejected".to_owned());
                    warn!(topic = %op.topic, %reason, "subscription rejected");
                    registry.mark_failed(&op.topic, reason);
                }
            }
            ControlEvent::UnsubscribeAck {
                req_id,
                success,
                ret_msg,
            } => {
                let Some(op) = self.resolve_pending(req_id.as_deref(), OpKind::Unsubscribe) else {
                    debug!(?req_id, "unsubscribe ack with no matching request");
                    return;
                };
                if !success {
                    debug!(topic = %op.topic, ?ret_msg, "unsubscribe rejected, removing locally");
                }
                self.registry.lock().await.finish_remove(&op.topic);
            }
        }
    }

    fn resolve_pending(&mut self, req_id: Option<&str>, kind: OpKind) -> Option<PendingOp> {
        let id: u64 = req_id?.parse().ok()?;
        match self.pending.get(&id) {
            Some(op) if op.kind == kind => self.pending.remove(&id),
            _ => None,
        }
    }

    async fn fail_outstanding_subscribes(&mut self) {
        let expired: Vec<u64> = self
            .pending
            .iter()
            .filter(|(_, op)| op.kind == OpKind::Subscribe)
            .map(|(id, _)| *id)
            .collect();
        warn!(count = expired.len(), "subscribe acknowledgments timed out");
        let mut registry = self.registry.lock().await;
        for id in expired {
            if let Some(op) = self.pending.remove(&id) {
                registry.mark_failed(&op.topic, "subscribe acknowledgment timed out");
            }
        }
    }

    async fn expire_pending(&mut self) {
        let now = Instant::now();
        let expired: Vec<u64> = self
            .pending
            .iter()
            .filter(|(_, op)| op.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        if expired.is_empty() {
            return;
        }
        let mut registry = self.registry.lock().await;
        for id in expired {
            if let Some(op) = self.pending.remove(&id) {
                match op.kind {
                    OpKind::Subscribe => {
                        warn!(topic = %op.topic, "subscribe acknowledgment timed out");
                        registry.mark_failed(&op.topic, "subscribe acknowledgment timed out");
                    }
                    OpKind::Unsubscribe => {
                        warn!(topic = %op.topic, "unsubscribe acknowledgment timed out, removing locally");
                        registry.finish_remove(&op.topic);
                    }
                }
            }
        }
    }
}

async fn send_frame<T: Transport>(
    transport: &mut T,
    frame: &OpRequest,
) -> Result<(), TransportError> {
    let json = serde_json::to_string(frame)
        .map_err(|error| TransportError::Send(format!("failed to encode frame: {error}")))?;
    debug!(op = frame.op, "sending frame");
    transport.send(json).await
}

/// Expiry deadline for the auth frame, one second ahead of the wall clock.
fn auth_expires_ms() -> u64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as u64 + 1_000
}
