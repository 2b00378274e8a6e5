//! Constants for injection timing, synthetic fixes, and exit codes.

/// Default pause (seconds) before the mock fix is pushed.
pub const DEFAULT_PAUSE_SECONDS: i64 = 2;

/// Default wait (seconds) after the mock fix is pushed.
pub const DEFAULT_INJECTION_INTERVAL_SECONDS: i64 = 1;

/// Pause used by the legacy timing policy, ignoring the requested value.
pub const LEGACY_PAUSE_SECONDS: i64 = 1;

/// Post-injection wait used by the legacy timing policy.
pub const LEGACY_INJECTION_INTERVAL_SECONDS: i64 = 10;

/// Horizontal accuracy (meters) stamped on every synthetic fix.
pub const MOCK_FIX_ACCURACY: f32 = 3.0;

/// Provider tag stamped on every synthetic fix.
pub const MOCK_PROVIDER_NAME: &str = "Fused";

/// Name of the dedicated injection worker thread.
pub const WORKER_THREAD_NAME: &str = "mock-location-worker";

/// Process exit codes.
pub mod exit_codes {
    /// The injection cycle completed.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// The run did not settle before the configured timeout.
    pub const ERROR_TIMEOUT: i32 = 2;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// The location provider refused the connection.
    pub const ERROR_CONNECTION: i32 = 5;
    /// Run cancelled by user (Ctrl+C).
    pub const ERROR_CANCELED: i32 = 130;
}
