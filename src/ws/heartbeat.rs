//! Application-level heartbeat tracking.
//!
//! The venue expects a `{"op":"ping"}` frame roughly every 20 seconds and
//! answers each one with a pong. The monitor owns the ping ticker and the
//! outstanding-pong deadline; the session turns [`HeartbeatEvent::Due`] into
//! a ping frame and [`HeartbeatEvent::TimedOut`] into a reconnect.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeartbeatEvent {
    /// The ping interval elapsed, a ping frame should be sent.
    Due,
    /// No pong arrived within the timeout window, the connection is stale.
    TimedOut,
}

#[derive(Debug)]
pub(crate) struct HeartbeatMonitor {
    interval: Duration,
    timeout: Duration,
    ticker: Interval,
    deadline: Option<Instant>,
}

impl HeartbeatMonitor {
    pub(crate) fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            ticker: Self::ticker(interval),
            deadline: None,
        }
    }

    fn ticker(interval: Duration) -> Interval {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Waits for the next heartbeat event. A pending pong deadline wins over
    /// a simultaneous ping tick.
    pub(crate) async fn next_event(&mut self) -> HeartbeatEvent {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = tokio::time::sleep_until(deadline) => HeartbeatEvent::TimedOut,
                    _ = self.ticker.tick() => HeartbeatEvent::Due,
                }
            }
            None => {
                self.ticker.tick().await;
                HeartbeatEvent::Due
            }
        }
    }

    /// Records an outbound ping. The deadline for the oldest unanswered ping
    /// is kept when several pings are in flight.
    pub(crate) fn ping_sent(&mut self) {
        if self.deadline.is_none() {
            self.deadline = Some(Instant::now() + self.timeout);
        }
    }

    /// Records an inbound pong, clearing the outstanding deadline.
    pub(crate) fn pong_received(&mut self) {
        self.deadline = None;
    }

    /// Restarts the ping schedule for a fresh connection.
    pub(crate) fn reset(&mut self) {
        self.ticker = Self::ticker(self.interval);
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_ping_is_immediate() {
        let start = Instant::now();
        let mut monitor =
            HeartbeatMonitor::new(Duration::from_secs(20), Duration::from_secs(10));
        assert_eq!(monitor.next_event().await, HeartbeatEvent::Due);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_pong_times_out() {
        let start = Instant::now();
        let mut monitor =
            HeartbeatMonitor::new(Duration::from_secs(20), Duration::from_secs(10));
        assert_eq!(monitor.next_event().await, HeartbeatEvent::Due);
        monitor.ping_sent();
        assert_eq!(monitor.next_event().await, HeartbeatEvent::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pong_clears_deadline() {
        let start = Instant::now();
        let mut monitor =
            HeartbeatMonitor::new(Duration::from_secs(20), Duration::from_secs(10));
        assert_eq!(monitor.next_event().await, HeartbeatEvent::Due);
        monitor.ping_sent();
        monitor.pong_received();
        // Next event is the following ping tick, not a timeout.
        assert_eq!(monitor.next_event().await, HeartbeatEvent::Due);
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_oldest_unanswered_ping_sets_deadline() {
        let start = Instant::now();
        let mut monitor =
            HeartbeatMonitor::new(Duration::from_secs(5), Duration::from_secs(12));
        assert_eq!(monitor.next_event().await, HeartbeatEvent::Due);
        monitor.ping_sent();
        assert_eq!(monitor.next_event().await, HeartbeatEvent::Due);
        monitor.ping_sent();
        assert_eq!(monitor.next_event().await, HeartbeatEvent::Due);
        monitor.ping_sent();
        // Deadline comes from the first ping at t=0, not the later ones.
        assert_eq!(monitor.next_event().await, HeartbeatEvent::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_deadline_and_restarts_ticker() {
        let mut monitor =
            HeartbeatMonitor::new(Duration::from_secs(20), Duration::from_secs(10));
        assert_eq!(monitor.next_event().await, HeartbeatEvent::Due);
        monitor.ping_sent();
        monitor.reset();
        let restarted = Instant::now();
        assert_eq!(monitor.next_event().await, HeartbeatEvent::Due);
        assert_eq!(restarted.elapsed(), Duration::ZERO);
    }
}
