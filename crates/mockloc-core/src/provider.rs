//! Location-provider capability consumed by the sequencer.
//!
//! A [`LocationService`] hands out one [`LocationClient`] per connection
//! attempt. The client reports the outcome of `connect()` asynchronously
//! through the [`ConnectionCallbacks`] it was created with.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::SequencerError;
use crate::types::MockFix;

/// Identifies one connection attempt. Events tagged with an older id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receiver of connection lifecycle events.
pub trait ConnectionListener: Send + Sync {
    fn on_connected(&self, id: ConnectionId);

    fn on_connection_failed(&self, id: ConnectionId, reason: &str);

    /// The provider dropped the connection without a `disconnect()` call.
    fn on_disconnected(&self, id: ConnectionId);
}

/// Callback handle given to a client.
///
/// Holds the listener weakly, so a provider that outlives the listener
/// delivers nothing instead of keeping it alive.
#[derive(Clone)]
pub struct ConnectionCallbacks {
    id: ConnectionId,
    listener: Weak<dyn ConnectionListener>,
}

impl ConnectionCallbacks {
    #[must_use]
    pub fn new(id: ConnectionId, listener: Weak<dyn ConnectionListener>) -> Self {
        Self { id, listener }
    }

    /// Callbacks bound to a strong listener reference.
    #[must_use]
    pub fn for_listener(id: ConnectionId, listener: &Arc<dyn ConnectionListener>) -> Self {
        Self::new(id, Arc::downgrade(listener))
    }

    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether the listener is still alive.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.listener.strong_count() > 0
    }

    pub fn connected(&self) {
        if let Some(listener) = self.listener.upgrade() {
            listener.on_connected(self.id);
        }
    }

    pub fn connection_failed(&self, reason: &str) {
        if let Some(listener) = self.listener.upgrade() {
            listener.on_connection_failed(self.id, reason);
        }
    }

    pub fn disconnected(&self) {
        if let Some(listener) = self.listener.upgrade() {
            listener.on_disconnected(self.id);
        }
    }
}

impl fmt::Debug for ConnectionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCallbacks")
            .field("id", &self.id)
            .field("live", &self.is_live())
            .finish()
    }
}

/// One connection to the location provider.
pub trait LocationClient: Send + Sync {
    /// Begin connecting. The result arrives later through the callbacks.
    fn connect(&self);

    /// Release the connection. Does not fire `on_disconnected`.
    fn disconnect(&self);

    fn set_mock_mode(&self, enabled: bool) -> Result<(), SequencerError>;

    fn set_mock_location(&self, fix: &MockFix) -> Result<(), SequencerError>;
}

/// Factory for location clients.
pub trait LocationService: Send + Sync {
    /// Create a new, not yet connected client bound to `callbacks`.
    fn client(&self, callbacks: ConnectionCallbacks) -> Arc<dyn LocationClient>;
}
