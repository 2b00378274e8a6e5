//! Notification sink for sequencer lifecycle events.
//!
//! Sinks are fire-and-forget: the sequencer never waits for an
//! acknowledgment and never learns whether anyone was listening.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Lifecycle event relayed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// The location provider accepted the connection.
    Connected,
    /// A stop request was received.
    Stopping,
    /// The location provider refused the connection.
    ConnectionFailed { reason: String },
    /// The provider disconnected on its own after a cycle had begun.
    UnexpectedDisconnect,
}

impl Notification {
    /// Stable event tag.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Stopping => "stopping",
            Self::ConnectionFailed { .. } => "connection-failed",
            Self::UnexpectedDisconnect => "unexpected-disconnect",
        }
    }

    /// Whether the event reports a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::UnexpectedDisconnect
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { reason } => write!(f, "{}: {reason}", self.tag()),
            _ => f.write_str(self.tag()),
        }
    }
}

/// Receiver of sequencer lifecycle events.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &Notification);
}

/// Fan-out sink that forwards every event to each registered sink.
pub struct SinkSubject {
    sinks: RwLock<Vec<Arc<dyn NotificationSink>>>,
}

impl SinkSubject {
    /// Create a subject with no sinks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sinks: RwLock::new(Vec::new()),
        }
    }

    pub fn register(&self, sink: Arc<dyn NotificationSink>) {
        self.sinks.write().push(sink);
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.sinks.read().len()
    }
}

impl Default for SinkSubject {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for SinkSubject {
    fn notify(&self, event: &Notification) {
        let sinks = self.sinks.read();
        for sink in sinks.iter() {
            sink.notify(event);
        }
    }
}
