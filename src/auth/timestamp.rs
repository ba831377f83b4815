//! Millisecond timestamps for Bybit API authentication.
//!
//! Every signed request embeds a millisecond timestamp that must fall within
//! the server's `recv_window`. A clock offset learned from the server time
//! endpoint absorbs local clock skew.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for providing request timestamps.
///
/// Signed requests are rejected when the timestamp drifts outside the
/// server's `recv_window`, so implementations should track server time.
pub trait TimestampProvider: Send + Sync {
    /// Current timestamp in milliseconds since UNIX epoch.
    fn timestamp_ms(&self) -> i64;

    /// Record a server-minus-local clock offset in milliseconds. Providers
    /// with a fixed notion of time ignore it.
    fn set_offset_ms(&self, _offset_ms: i64) {}
}

/// Wall-clock timestamps with a server-synchronized offset.
///
/// The offset is updated from `GET /v5/market/time` responses (see the REST
/// client's `sync_time`) and applied to every subsequent timestamp.
pub struct SystemTimestamp {
    offset_ms: AtomicI64,
}

impl SystemTimestamp {
    /// Create a provider with a zero offset.
    pub fn new() -> Self {
        Self {
            offset_ms: AtomicI64::new(0),
        }
    }

    /// The current server clock offset in milliseconds.
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::SeqCst)
    }

    /// Get current wall-clock time in milliseconds since UNIX epoch.
    fn wall_clock_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

impl Default for SystemTimestamp {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampProvider for SystemTimestamp {
    fn timestamp_ms(&self) -> i64 {
        Self::wall_clock_ms() + self.offset_ms.load(Ordering::SeqCst)
    }

    fn set_offset_ms(&self, offset_ms: i64) {
        self.offset_ms.store(offset_ms, Ordering::SeqCst);
    }
}

/// A provider that always returns the same timestamp.
///
/// Useful in tests that need to assert exact header or signature values.
pub struct FixedTimestamp(pub i64);

impl TimestampProvider for FixedTimestamp {
    fn timestamp_ms(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_current() {
        let provider = SystemTimestamp::new();
        let ts = provider.timestamp_ms();
        // Sanity window: after 2023-01-01, before 2100-01-01.
        assert!(ts > 1_672_531_200_000);
        assert!(ts < 4_102_444_800_000);
    }

    #[test]
    fn test_offset_applied() {
        let provider = SystemTimestamp::new();
        let before = provider.timestamp_ms();
        provider.set_offset_ms(60_000);
        let after = provider.timestamp_ms();
        assert!(after >= before + 60_000 - 5);
        assert_eq!(provider.offset_ms(), 60_000);
    }

    #[test]
    fn test_negative_offset() {
        let provider = SystemTimestamp::new();
        provider.set_offset_ms(-1_000);
        let skewed = provider.timestamp_ms();
        let wall = SystemTimestamp::new().timestamp_ms();
        assert!(skewed < wall);
    }

    #[test]
    fn test_fixed_timestamp() {
        let provider = FixedTimestamp(1_700_000_000_000);
        assert_eq!(provider.timestamp_ms(), 1_700_000_000_000);
        assert_eq!(provider.timestamp_ms(), 1_700_000_000_000);
    }
}
