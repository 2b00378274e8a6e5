//! Timestamp sources used to stamp synthetic fixes.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Wall-clock and monotonic timestamp source.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn wall_clock_millis(&self) -> u64;

    /// Monotonic nanoseconds since an arbitrary fixed origin.
    fn elapsed_realtime_nanos(&self) -> u64;
}

/// Clock backed by the operating system.
///
/// The monotonic origin is the moment the clock was created.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[allow(clippy::cast_possible_truncation)]
    fn wall_clock_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    #[allow(clippy::cast_possible_truncation)]
    fn elapsed_realtime_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Clock that always reports the same instant. Useful for deterministic fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub wall_clock_millis: u64,
    pub elapsed_realtime_nanos: u64,
}

impl FixedClock {
    #[must_use]
    pub const fn new(wall_clock_millis: u64, elapsed_realtime_nanos: u64) -> Self {
        Self {
            wall_clock_millis,
            elapsed_realtime_nanos,
        }
    }
}

impl Clock for FixedClock {
    fn wall_clock_millis(&self) -> u64 {
        self.wall_clock_millis
    }

    fn elapsed_realtime_nanos(&self) -> u64 {
        self.elapsed_realtime_nanos
    }
}
