// SPDX-License-Identifier: MIT

//! Time abstraction so tests control timestamps, simulated execution
//! delays, and status-notice expiry without wall-clock waits.

use chrono::{DateTime, TimeZone, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Clock trait for time abstraction.
pub trait Clock: Send + Sync {
    /// Current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;

    /// Sleep for a duration.
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Current time as a UTC timestamp, for entity fields.
    fn now_utc(&self) -> DateTime<Utc> {
        match Utc.timestamp_millis_opt(self.now_millis() as i64) {
            chrono::LocalResult::Single(ts) => ts,
            _ => DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Real clock using system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Fake clock with controllable time for tests.
///
/// Sleeping advances the clock and returns immediately, so simulated
/// backend delays and notice expiry run without real waits.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_millis: Arc<AtomicU64>,
}

impl FakeClock {
    /// Create a fake clock starting at a given epoch-millis value.
    pub fn new(start_millis: u64) -> Self {
        Self {
            current_millis: Arc::new(AtomicU64::new(start_millis)),
        }
    }

    /// Create a fake clock starting at the Unix epoch.
    pub fn at_epoch() -> Self {
        Self::new(0)
    }

    /// Advance time by a duration.
    pub fn advance(&self, duration: Duration) {
        self.advance_ms(duration.as_millis() as u64);
    }

    /// Advance time by milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.current_millis.fetch_add(ms, Ordering::SeqCst);
    }

    /// Set absolute time.
    pub fn set(&self, millis: u64) {
        self.current_millis.store(millis, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::at_epoch()
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> u64 {
        self.current_millis.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.advance(duration);
        Box::pin(async {})
    }
}

/// Clock handle that can be either real or fake.
#[derive(Clone, Debug)]
pub enum ClockHandle {
    System(SystemClock),
    Fake(FakeClock),
}

impl ClockHandle {
    /// A system clock handle.
    pub fn system() -> Self {
        Self::System(SystemClock)
    }

    /// A fake clock handle at the epoch.
    pub fn fake_at_epoch() -> Self {
        Self::Fake(FakeClock::at_epoch())
    }

    /// A fake clock handle at a specific time.
    pub fn fake_at(millis: u64) -> Self {
        Self::Fake(FakeClock::new(millis))
    }

    /// Get as fake clock for manipulation (None for system clocks).
    pub fn as_fake(&self) -> Option<&FakeClock> {
        match self {
            Self::Fake(f) => Some(f),
            Self::System(_) => None,
        }
    }
}

impl Clock for ClockHandle {
    fn now_millis(&self) -> u64 {
        match self {
            Self::System(c) => c.now_millis(),
            Self::Fake(c) => c.now_millis(),
        }
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        match self {
            Self::System(c) => c.sleep(duration),
            Self::Fake(c) => c.sleep(duration),
        }
    }
}

impl Default for ClockHandle {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
