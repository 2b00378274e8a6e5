//! Coordinates, cycle parameters, and synthetic location fixes.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_INJECTION_INTERVAL_SECONDS, DEFAULT_PAUSE_SECONDS, LEGACY_INJECTION_INTERVAL_SECONDS,
    LEGACY_PAUSE_SECONDS, MOCK_FIX_ACCURACY, MOCK_PROVIDER_NAME,
};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// What a request asks the sequencer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Start,
    Stop,
}

/// Which durations the injection cycle honours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CycleTiming {
    /// Use the pause and interval supplied with `start`.
    #[default]
    Configured,
    /// Ignore the supplied values and wait 1 s before and 10 s after the fix.
    Legacy,
}

/// One-shot job description carried from a `start` request to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleParameters {
    pub action: Action,
    /// Seconds to wait before pushing the fix. Non-positive means no wait.
    pub pause_seconds: i64,
    /// Seconds to wait after pushing the fix. Non-positive means no wait.
    pub injection_interval_seconds: i64,
}

impl CycleParameters {
    #[must_use]
    pub const fn new(action: Action, pause_seconds: i64, injection_interval_seconds: i64) -> Self {
        Self {
            action,
            pause_seconds,
            injection_interval_seconds,
        }
    }

    /// Apply a timing policy, replacing the durations when it is `Legacy`.
    #[must_use]
    pub fn resolve(self, timing: CycleTiming) -> Self {
        match timing {
            CycleTiming::Configured => self,
            CycleTiming::Legacy => Self {
                pause_seconds: LEGACY_PAUSE_SECONDS,
                injection_interval_seconds: LEGACY_INJECTION_INTERVAL_SECONDS,
                ..self
            },
        }
    }

    /// Wait before the fix is pushed.
    #[must_use]
    pub fn pause(&self) -> Duration {
        seconds_to_duration(self.pause_seconds)
    }

    /// Wait after the fix is pushed.
    #[must_use]
    pub fn injection_interval(&self) -> Duration {
        seconds_to_duration(self.injection_interval_seconds)
    }
}

impl Default for CycleParameters {
    fn default() -> Self {
        Self::new(
            Action::Start,
            DEFAULT_PAUSE_SECONDS,
            DEFAULT_INJECTION_INTERVAL_SECONDS,
        )
    }
}

#[allow(clippy::cast_sign_loss)]
fn seconds_to_duration(seconds: i64) -> Duration {
    if seconds <= 0 {
        Duration::ZERO
    } else {
        Duration::from_secs(seconds as u64)
    }
}

/// A synthetic position record pushed into a location provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockFix {
    /// Provider tag the fix claims to come from.
    pub provider: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters.
    pub accuracy: f32,
    /// Wall-clock time in milliseconds since the Unix epoch.
    pub time_millis: u64,
    /// Monotonic timestamp in nanoseconds.
    pub elapsed_realtime_nanos: u64,
}

impl MockFix {
    /// Build the fix for `coordinate` stamped with the given timestamps.
    #[must_use]
    pub fn at(coordinate: Coordinate, time_millis: u64, elapsed_realtime_nanos: u64) -> Self {
        Self {
            provider: MOCK_PROVIDER_NAME.to_string(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            accuracy: MOCK_FIX_ACCURACY,
            time_millis,
            elapsed_realtime_nanos,
        }
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}
