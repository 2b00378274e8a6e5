//! Error taxonomy for the mock-location sequencer.

/// Error type for sequencer operations and provider calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequencerError {
    /// The location provider could not be reached. Fatal, never retried.
    #[error("connection to location provider failed: {0}")]
    ConnectionFailed(String),

    /// A wait inside the injection cycle was interrupted.
    #[error("injection cycle cancelled")]
    CycleCancelled,

    /// The provider dropped the connection after a cycle had begun.
    #[error("location provider disconnected unexpectedly")]
    UnexpectedDisconnect,

    /// The provider rejected a mock-mode or mock-location call.
    #[error("location provider error: {0}")]
    Provider(String),

    /// A connection attempt or injection cycle is already in flight.
    #[error("sequencer is busy with another request")]
    Busy,

    /// The sequencer reached a terminal state and accepts no more requests.
    #[error("sequencer has been stopped")]
    Stopped,

    /// The background worker could not be started or has shut down.
    #[error("worker error: {0}")]
    Worker(String),
}

impl SequencerError {
    /// Whether this error ends the sequencer's lifetime.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Stopped | Self::Worker(_)
        )
    }
}
