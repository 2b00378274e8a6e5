//! Cancellation with interruptible waits.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::SequencerError;

struct Shared {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// Shared cancellation flag that also wakes blocked waits.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use mockloc_core::cancellation::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(token.sleep(Duration::from_millis(1)).is_ok());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.sleep(Duration::from_secs(60)).is_err());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                cancelled: Mutex::new(false),
                wakeup: Condvar::new(),
            }),
        }
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.shared.cancelled.lock()
    }

    /// Request cancellation and wake every thread blocked in [`sleep`](Self::sleep).
    pub fn cancel(&self) {
        let mut cancelled = self.shared.cancelled.lock();
        *cancelled = true;
        self.shared.wakeup.notify_all();
    }

    /// Return `Err(SequencerError::CycleCancelled)` once cancellation was requested.
    pub fn check_cancelled(&self) -> Result<(), SequencerError> {
        if self.is_cancelled() {
            Err(SequencerError::CycleCancelled)
        } else {
            Ok(())
        }
    }

    /// Block for `duration` unless cancelled first.
    ///
    /// Returns `Err(SequencerError::CycleCancelled)` if the token was already
    /// cancelled or gets cancelled during the wait. A zero duration only
    /// checks the flag.
    pub fn sleep(&self, duration: Duration) -> Result<(), SequencerError> {
        let mut cancelled = self.shared.cancelled.lock();
        match Instant::now().checked_add(duration) {
            Some(deadline) => {
                while !*cancelled {
                    if self
                        .shared
                        .wakeup
                        .wait_until(&mut cancelled, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
            }
            // Deadline beyond the representable range: wait for cancellation only.
            None => {
                while !*cancelled {
                    self.shared.wakeup.wait(&mut cancelled);
                }
            }
        }
        if *cancelled {
            Err(SequencerError::CycleCancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
