//! Subscription registry shared between session handles and the session task.
//!
//! The registry is the durable record of what the session should be
//! subscribed to. Connections come and go; on every (re)connect the session
//! replays the registry, so an entry lives until the caller unsubscribes or
//! the venue rejects the topic.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use crate::ws::messages::InboundMessage;
use crate::ws::topic::Topic;

pub(crate) type SharedRegistry = Arc<Mutex<SubscriptionRegistry>>;

/// Lifecycle state of a single subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicState {
    /// Registered locally, no acknowledgment from the venue yet
    Pending,
    /// Acknowledged by the venue, pushes are flowing
    Active,
    /// Rejected by the venue; not replayed on reconnect
    Failed {
        /// Venue-provided rejection reason
        reason: String,
    },
}

#[derive(Debug)]
struct SubscriptionEntry {
    /// Insertion order, preserved across consumer replacement
    seq: u64,
    state: TopicState,
    /// An unsubscribe is in flight; the entry is dropped once acknowledged
    removing: bool,
    sender: UnboundedSender<InboundMessage>,
}

#[derive(Debug, Default)]
pub(crate) struct SubscriptionRegistry {
    entries: HashMap<Topic, SubscriptionEntry>,
    next_seq: u64,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a topic with its consumer channel. Re-adding an existing
    /// topic replaces the consumer and resets the entry to pending while
    /// keeping its insertion position, so the registry never holds two
    /// entries for one topic.
    pub(crate) fn add(&mut self, topic: Topic, sender: UnboundedSender<InboundMessage>) {
        match self.entries.get_mut(&topic) {
            Some(entry) => {
                entry.state = TopicState::Pending;
                entry.removing = false;
                entry.sender = sender;
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.entries.insert(
                    topic,
                    SubscriptionEntry {
                        seq,
                        state: TopicState::Pending,
                        removing: false,
                        sender,
                    },
                );
            }
        }
    }

    /// Flags a topic for removal. Returns false when the topic is unknown.
    pub(crate) fn mark_removing(&mut self, topic: &Topic) -> bool {
        match self.entries.get_mut(topic) {
            Some(entry) => {
                entry.removing = true;
                true
            }
            None => false,
        }
    }

    /// Drops a topic outright, once its unsubscribe completed or its
    /// registration was rolled back.
    pub(crate) fn finish_remove(&mut self, topic: &Topic) {
        self.entries.remove(topic);
    }

    pub(crate) fn mark_active(&mut self, topic: &Topic) {
        if let Some(entry) = self.entries.get_mut(topic) {
            if !entry.removing {
                entry.state = TopicState::Active;
            }
        }
    }

    pub(crate) fn mark_failed(&mut self, topic: &Topic, reason: impl Into<String>) {
        if let Some(entry) = self.entries.get_mut(topic) {
            if !entry.removing {
                entry.state = TopicState::Failed {
                    reason: reason.into(),
                };
            }
        }
    }

    /// Topics to replay on (re)connect: pending and active entries in
    /// insertion order. Failed and half-removed entries are skipped.
    pub(crate) fn snapshot_active_topics(&self) -> Vec<Topic> {
        let mut topics: Vec<(u64, &Topic)> = self
            .entries
            .iter()
            .filter(|(_, entry)| {
                !entry.removing && !matches!(entry.state, TopicState::Failed { .. })
            })
            .map(|(topic, entry)| (entry.seq, topic))
            .collect();
        topics.sort_by_key(|(seq, _)| *seq);
        topics.into_iter().map(|(_, topic)| topic.clone()).collect()
    }

    /// Demotes acknowledged entries back to pending after the connection
    /// carrying their acknowledgments died.
    pub(crate) fn reset_to_pending(&mut self) {
        for entry in self.entries.values_mut() {
            if entry.state == TopicState::Active {
                entry.state = TopicState::Pending;
            }
        }
    }

    /// Drops entries whose unsubscribe was cut short by a disconnect. The
    /// venue forgets server-side subscription state with the connection, so
    /// not replaying them completes the removal.
    pub(crate) fn purge_removing(&mut self) {
        self.entries.retain(|_, entry| !entry.removing);
    }

    /// Consumer channel for a topic, unless the topic is being removed.
    pub(crate) fn consumer(&self, topic: &Topic) -> Option<UnboundedSender<InboundMessage>> {
        self.entries
            .get(topic)
            .filter(|entry| !entry.removing)
            .map(|entry| entry.sender.clone())
    }

    pub(crate) fn topic_state(&self, topic: &Topic) -> Option<TopicState> {
        self.entries.get(topic).map(|entry| entry.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;

    fn topic(name: &str) -> Topic {
        Topic::new(name).unwrap()
    }

    fn message(name: &str) -> InboundMessage {
        InboundMessage {
            topic: topic(name),
            message_type: None,
            ts: None,
            cross_seq: None,
            data: json!({}),
        }
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let mut registry = SubscriptionRegistry::new();
        for name in ["tickers.ETHUSDT", "orderbook.50.BTCUSDT", "publicTrade.BTCUSDT"] {
            let (tx, _rx) = mpsc::unbounded_channel();
            registry.add(topic(name), tx);
        }
        let snapshot = registry.snapshot_active_topics();
        let names: Vec<&str> = snapshot.iter().map(|t| t.as_str()).collect();
        assert_eq!(
            names,
            ["tickers.ETHUSDT", "orderbook.50.BTCUSDT", "publicTrade.BTCUSDT"]
        );
    }

    #[test]
    fn test_duplicate_add_replaces_without_duplicating() {
        let mut registry = SubscriptionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        registry.add(topic("tickers.BTCUSDT"), tx1);
        registry.add(topic("tickers.ETHUSDT"), tx2);
        registry.mark_active(&topic("tickers.BTCUSDT"));

        let (tx3, mut rx3) = mpsc::unbounded_channel();
        registry.add(topic("tickers.BTCUSDT"), tx3);

        let snapshot = registry.snapshot_active_topics();
        assert_eq!(snapshot.len(), 2);
        // Re-adding keeps the original position and resets the state.
        assert_eq!(snapshot[0].as_str(), "tickers.BTCUSDT");
        assert_eq!(
            registry.topic_state(&topic("tickers.BTCUSDT")),
            Some(TopicState::Pending)
        );

        // Only the replacement consumer receives messages.
        let sender = registry.consumer(&topic("tickers.BTCUSDT")).unwrap();
        sender.send(message("tickers.BTCUSDT")).unwrap();
        assert!(rx1.try_recv().is_err());
        assert!(rx3.try_recv().is_ok());
    }

    #[test]
    fn test_failed_topics_are_not_replayed() {
        let mut registry = SubscriptionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        registry.add(topic("orderbook.50.BTCUSDT"), tx1);
        registry.add(topic("orderbook.50.NOPEUSDT"), tx2);
        registry.mark_active(&topic("orderbook.50.BTCUSDT"));
        registry.mark_failed(&topic("orderbook.50.NOPEUSDT"), "Invalid symbol");

        registry.reset_to_pending();
        let snapshot = registry.snapshot_active_topics();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].as_str(), "orderbook.50.BTCUSDT");
        assert_eq!(
            registry.topic_state(&topic("orderbook.50.BTCUSDT")),
            Some(TopicState::Pending)
        );
        assert_eq!(
            registry.topic_state(&topic("orderbook.50.NOPEUSDT")),
            Some(TopicState::Failed {
                reason: "Invalid symbol".to_owned()
            })
        );
    }

    #[test]
    fn test_removing_entries_are_hidden_and_sticky() {
        let mut registry = SubscriptionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.add(topic("wallet"), tx);
        registry.mark_active(&topic("wallet"));

        assert!(registry.mark_removing(&topic("wallet")));
        assert!(registry.snapshot_active_topics().is_empty());
        assert!(registry.consumer(&topic("wallet")).is_none());

        // Acknowledgments racing the removal must not resurrect the entry.
        registry.mark_active(&topic("wallet"));
        assert!(registry.snapshot_active_topics().is_empty());

        registry.finish_remove(&topic("wallet"));
        assert_eq!(registry.topic_state(&topic("wallet")), None);
        assert!(!registry.mark_removing(&topic("wallet")));
    }

    #[test]
    fn test_purge_removing_drops_interrupted_unsubscribes() {
        let mut registry = SubscriptionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        registry.add(topic("position"), tx1);
        registry.add(topic("execution"), tx2);
        registry.mark_removing(&topic("position"));

        registry.purge_removing();
        assert_eq!(registry.topic_state(&topic("position")), None);
        assert_eq!(
            registry.topic_state(&topic("execution")),
            Some(TopicState::Pending)
        );
    }
}
