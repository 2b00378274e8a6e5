//! # mockloc-core
//!
//! Building blocks for injecting mock location fixes: the data model, the
//! error taxonomy, cancellation with interruptible waits, timestamp clocks,
//! notification sinks, and the location-provider capability.

pub mod cancellation;
pub mod clock;
pub mod constants;
pub mod error;
pub mod provider;
pub mod sink;
pub mod sinks;
pub mod types;

// Re-exports
pub use cancellation::CancellationToken;
pub use clock::{Clock, FixedClock, SystemClock};
pub use constants::{
    exit_codes, DEFAULT_INJECTION_INTERVAL_SECONDS, DEFAULT_PAUSE_SECONDS, MOCK_FIX_ACCURACY,
    MOCK_PROVIDER_NAME,
};
pub use error::SequencerError;
pub use provider::{
    ConnectionCallbacks, ConnectionId, ConnectionListener, LocationClient, LocationService,
};
pub use sink::{Notification, NotificationSink, SinkSubject};
pub use sinks::{ChannelSink, LoggingSink};
pub use types::{Action, Coordinate, CycleParameters, CycleTiming, MockFix};
