//! Reconnect delay schedule.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff with full-jitter tail.
///
/// Delays double from `initial` up to `max`, with up to `jitter_ms`
/// milliseconds of random noise added so that many clients dropped by the
/// same venue outage do not reconnect in lockstep.
#[derive(Debug)]
pub(crate) struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
    jitter_ms: u64,
    attempt: u32,
}

impl ExponentialBackoff {
    pub(crate) fn new(initial: Duration, max: Duration, jitter_ms: u64) -> Self {
        Self {
            initial,
            max,
            jitter_ms,
            attempt: 0,
        }
    }

    /// Returns the delay to sleep before the next connection attempt and
    /// advances the schedule.
    pub(crate) fn next_delay(&mut self) -> Duration {
        let base_ms = self.initial.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        let delay_ms = base_ms
            .saturating_mul(2u64.saturating_pow(self.attempt))
            .min(max_ms);
        self.attempt = self.attempt.saturating_add(1);

        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(delay_ms.saturating_add(jitter))
    }

    /// Resets the schedule after a successful connection.
    pub(crate) fn reset(&mut self) {
        self.attempt = 0;
    }

    pub(crate) fn attempt(&self) -> u32 {
        self.attempt
    }
}
