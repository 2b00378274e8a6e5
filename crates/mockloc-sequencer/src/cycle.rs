//! The one-shot injection cycle: pause, push one fix, pause.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use mockloc_core::cancellation::CancellationToken;
use mockloc_core::clock::Clock;
use mockloc_core::error::SequencerError;
use mockloc_core::provider::LocationClient;
use mockloc_core::types::{Coordinate, CycleParameters, MockFix};

/// Everything the worker needs to run one cycle.
pub struct InjectionCycle {
    params: CycleParameters,
    coordinate: Coordinate,
    client: Arc<dyn LocationClient>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    test_started: Arc<AtomicBool>,
    last_fix: Arc<Mutex<Option<MockFix>>>,
}

impl InjectionCycle {
    #[must_use]
    pub fn new(
        params: CycleParameters,
        coordinate: Coordinate,
        client: Arc<dyn LocationClient>,
        clock: Arc<dyn Clock>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            params,
            coordinate,
            client,
            clock,
            cancel,
            test_started: Arc::new(AtomicBool::new(false)),
            last_fix: Arc::new(Mutex::new(None)),
        }
    }

    /// Share the "a cycle has begun" flag with the owner.
    #[must_use]
    pub fn with_started_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.test_started = flag;
        self
    }

    /// Share the slot that receives the pushed fix.
    #[must_use]
    pub fn with_fix_slot(mut self, slot: Arc<Mutex<Option<MockFix>>>) -> Self {
        self.last_fix = slot;
        self
    }

    #[must_use]
    pub fn params(&self) -> &CycleParameters {
        &self.params
    }

    /// Run the cycle to completion on the calling thread.
    ///
    /// Returns the pushed fix. A cancellation during the first wait means no
    /// fix was pushed; during the second wait the fix stays pushed and is
    /// still recorded in the fix slot.
    pub fn run(&self) -> Result<MockFix, SequencerError> {
        self.cancel.check_cancelled()?;
        self.test_started.store(true, Ordering::SeqCst);

        self.client.set_mock_mode(true)?;

        debug!(pause = ?self.params.pause(), "Waiting before injection");
        self.cancel.sleep(self.params.pause())?;

        let fix = MockFix::at(
            self.coordinate,
            self.clock.wall_clock_millis(),
            self.clock.elapsed_realtime_nanos(),
        );
        self.client.set_mock_location(&fix)?;
        *self.last_fix.lock() = Some(fix.clone());
        info!(
            latitude = fix.latitude,
            longitude = fix.longitude,
            accuracy = fix.accuracy,
            "Injected mock fix"
        );

        debug!(interval = ?self.params.injection_interval(), "Waiting after injection");
        self.cancel.sleep(self.params.injection_interval())?;
        Ok(fix)
    }
}
