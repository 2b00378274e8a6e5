//! Concrete notification sinks.

use crossbeam_channel::Sender;
use tracing::{info, warn};

use crate::sink::{Notification, NotificationSink};

/// Sink that forwards events through a channel (non-blocking).
pub struct ChannelSink {
    sender: Sender<Notification>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(sender: Sender<Notification>) -> Self {
        Self { sender }
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, event: &Notification) {
        // A full or closed channel drops the event.
        let _ = self.sender.try_send(event.clone());
    }
}

/// Sink that writes events to the `tracing` log.
pub struct LoggingSink;

impl LoggingSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for LoggingSink {
    fn notify(&self, event: &Notification) {
        if event.is_failure() {
            warn!(event = event.tag(), "{event}");
        } else {
            info!(event = event.tag(), "Sequencer event");
        }
    }
}
