//! Sequencer lifecycle phases and a waitable phase cell.

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Where the sequencer is in its one-shot lifecycle.
///
/// `Idle → Connecting → Injecting → Done`, with `Connecting → Failed`,
/// `Injecting → Cancelled`, and `Stopped` when a stop arrives outside an
/// injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequencerPhase {
    Idle,
    Connecting,
    Injecting,
    Done,
    Failed,
    Cancelled,
    Stopped,
}

impl SequencerPhase {
    /// No further requests are accepted from a terminal phase.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled | Self::Stopped)
    }

    /// Nothing is in flight: the last request has run its course.
    #[must_use]
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Idle | Self::Connecting | Self::Injecting)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Injecting => "injecting",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SequencerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase shared between the caller side and the worker job.
pub struct PhaseCell {
    phase: Mutex<SequencerPhase>,
    changed: Condvar,
}

impl PhaseCell {
    #[must_use]
    pub fn new(initial: SequencerPhase) -> Self {
        Self {
            phase: Mutex::new(initial),
            changed: Condvar::new(),
        }
    }

    #[must_use]
    pub fn get(&self) -> SequencerPhase {
        *self.phase.lock()
    }

    /// Replace the phase unconditionally, returning the previous one.
    pub fn set(&self, next: SequencerPhase) -> SequencerPhase {
        let mut phase = self.phase.lock();
        let previous = std::mem::replace(&mut *phase, next);
        self.changed.notify_all();
        previous
    }

    /// Move to `next` only if the current phase is `expected`.
    pub fn transition(&self, expected: SequencerPhase, next: SequencerPhase) -> bool {
        let mut phase = self.phase.lock();
        if *phase != expected {
            return false;
        }
        *phase = next;
        self.changed.notify_all();
        true
    }

    /// Block until the phase is settled or `timeout` elapses.
    ///
    /// Returns the settled phase, or `None` on timeout.
    pub fn wait_settled(&self, timeout: Duration) -> Option<SequencerPhase> {
        let deadline = Instant::now().checked_add(timeout);
        let mut phase = self.phase.lock();
        while !phase.is_settled() {
            match deadline {
                Some(deadline) => {
                    if self.changed.wait_until(&mut phase, deadline).timed_out() {
                        return phase.is_settled().then_some(*phase);
                    }
                }
                None => self.changed.wait(&mut phase),
            }
        }
        Some(*phase)
    }
}
