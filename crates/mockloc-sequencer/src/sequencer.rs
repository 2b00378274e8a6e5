//! Connection-gated mock-location sequencer.
//!
//! `start` opens a connection and returns at once. When the provider reports
//! the connection, exactly one [`InjectionCycle`] is queued on the dedicated
//! worker. Provider callbacks and `stop` drive the remaining transitions;
//! every lifecycle event is relayed to the notification sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use mockloc_core::cancellation::CancellationToken;
use mockloc_core::clock::{Clock, SystemClock};
use mockloc_core::constants::{
    DEFAULT_INJECTION_INTERVAL_SECONDS, DEFAULT_PAUSE_SECONDS, WORKER_THREAD_NAME,
};
use mockloc_core::error::SequencerError;
use mockloc_core::provider::{
    ConnectionCallbacks, ConnectionId, ConnectionListener, LocationClient, LocationService,
};
use mockloc_core::sink::{Notification, NotificationSink};
use mockloc_core::types::{Action, Coordinate, CycleParameters, CycleTiming, MockFix};

use crate::cycle::InjectionCycle;
use crate::phase::{PhaseCell, SequencerPhase};
use crate::worker::Worker;

/// Construction options for a sequencer.
#[derive(Debug, Clone)]
pub struct SequencerOptions {
    pub timing: CycleTiming,
    pub worker_name: String,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            timing: CycleTiming::Configured,
            worker_name: WORKER_THREAD_NAME.to_string(),
        }
    }
}

/// A request addressed to the sequencer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Start {
        coordinate: Coordinate,
        pause_seconds: i64,
        injection_interval_seconds: i64,
    },
    Stop,
}

impl Command {
    /// A start request with the default 2 s pause and 1 s interval.
    #[must_use]
    pub fn start(coordinate: Coordinate) -> Self {
        Self::Start {
            coordinate,
            pause_seconds: DEFAULT_PAUSE_SECONDS,
            injection_interval_seconds: DEFAULT_INJECTION_INTERVAL_SECONDS,
        }
    }

    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::Start { .. } => Action::Start,
            Self::Stop => Action::Stop,
        }
    }
}

struct SequencerState {
    connection: Option<Arc<dyn LocationClient>>,
    connection_id: Option<ConnectionId>,
    next_id: u64,
    pending_coordinate: Option<Coordinate>,
    action: Action,
    pause_seconds: i64,
    injection_interval_seconds: i64,
    stopped: bool,
}

impl SequencerState {
    fn new() -> Self {
        Self {
            connection: None,
            connection_id: None,
            next_id: 0,
            pending_coordinate: None,
            action: Action::Start,
            pause_seconds: DEFAULT_PAUSE_SECONDS,
            injection_interval_seconds: DEFAULT_INJECTION_INTERVAL_SECONDS,
            stopped: false,
        }
    }

    /// Whether `id` names the connection currently owned by the sequencer.
    fn is_current(&self, id: ConnectionId) -> bool {
        self.connection_id == Some(id)
    }
}

struct Inner {
    service: Arc<dyn LocationService>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    timing: CycleTiming,
    state: Mutex<SequencerState>,
    phase: Arc<PhaseCell>,
    test_started: Arc<AtomicBool>,
    last_fix: Arc<Mutex<Option<MockFix>>>,
    cancel: CancellationToken,
    worker: Worker,
}

/// Handle to a mock-location sequencer. Clones share the same sequencer.
#[derive(Clone)]
pub struct MockLocationSequencer {
    inner: Arc<Inner>,
}

impl MockLocationSequencer {
    /// Create a sequencer and spawn its worker thread.
    pub fn new(
        service: Arc<dyn LocationService>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        opts: SequencerOptions,
    ) -> Result<Self, SequencerError> {
        let worker = Worker::spawn(&opts.worker_name)?;
        Ok(Self {
            inner: Arc::new(Inner {
                service,
                sink,
                clock,
                timing: opts.timing,
                state: Mutex::new(SequencerState::new()),
                phase: Arc::new(PhaseCell::new(SequencerPhase::Idle)),
                test_started: Arc::new(AtomicBool::new(false)),
                last_fix: Arc::new(Mutex::new(None)),
                cancel: CancellationToken::new(),
                worker,
            }),
        })
    }

    /// Sequencer with the system clock and default options.
    pub fn with_defaults(
        service: Arc<dyn LocationService>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, SequencerError> {
        Self::new(
            service,
            sink,
            Arc::new(SystemClock::new()),
            SequencerOptions::default(),
        )
    }

    /// Store the request and begin connecting. Returns without waiting.
    ///
    /// Accepted from `Idle` and `Done`. Rejected with `Busy` while a
    /// connection attempt or cycle is in flight and with `Stopped` once the
    /// sequencer has terminated.
    pub fn start(
        &self,
        coordinate: Coordinate,
        pause_seconds: i64,
        injection_interval_seconds: i64,
    ) -> Result<ConnectionId, SequencerError> {
        let inner = &self.inner;
        let (client, id) = {
            let mut state = inner.state.lock();
            if state.stopped {
                return Err(SequencerError::Stopped);
            }
            match inner.phase.get() {
                SequencerPhase::Connecting | SequencerPhase::Injecting => {
                    return Err(SequencerError::Busy)
                }
                phase if phase.is_terminal() => return Err(SequencerError::Stopped),
                _ => {}
            }

            if let Some(previous) = state.connection.take() {
                previous.disconnect();
            }

            state.next_id += 1;
            let id = ConnectionId(state.next_id);
            state.pending_coordinate = Some(coordinate);
            state.action = Action::Start;
            state.pause_seconds = pause_seconds;
            state.injection_interval_seconds = injection_interval_seconds;

            let weak: Weak<Inner> = Arc::downgrade(inner);
            let listener: Weak<dyn ConnectionListener> = weak;
            let client = inner.service.client(ConnectionCallbacks::new(id, listener));
            state.connection = Some(Arc::clone(&client));
            state.connection_id = Some(id);
            inner.phase.set(SequencerPhase::Connecting);
            (client, id)
        };

        info!(
            connection = %id,
            %coordinate,
            pause_seconds,
            injection_interval_seconds,
            "Connecting to location provider"
        );
        client.connect();
        Ok(id)
    }

    /// `start` with the default 2 s pause and 1 s interval.
    pub fn start_with_defaults(
        &self,
        coordinate: Coordinate,
    ) -> Result<ConnectionId, SequencerError> {
        self.start(
            coordinate,
            DEFAULT_PAUSE_SECONDS,
            DEFAULT_INJECTION_INTERVAL_SECONDS,
        )
    }

    /// Emit `Stopping`, interrupt any running cycle, and release the connection.
    ///
    /// Terminal; a second call is a no-op.
    pub fn stop(&self) {
        let inner = &self.inner;
        let (client, phase) = {
            let mut state = inner.state.lock();
            if state.stopped {
                debug!("Sequencer already stopped");
                return;
            }
            state.stopped = true;
            state.action = Action::Stop;
            state.connection_id = None;

            (state.connection.take(), inner.phase.get())
        };

        info!("Stopping sequencer");
        inner.sink.notify(&Notification::Stopping);
        // A running cycle settles itself once its wait is interrupted.
        if phase != SequencerPhase::Injecting && !phase.is_terminal() {
            inner.phase.transition(phase, SequencerPhase::Stopped);
        }
        inner.cancel.cancel();
        if let Some(client) = client {
            client.disconnect();
        }
        inner.worker.close();
    }

    /// Route a command to `start` or `stop`.
    pub fn dispatch(&self, command: Command) -> Result<(), SequencerError> {
        match command {
            Command::Start {
                coordinate,
                pause_seconds,
                injection_interval_seconds,
            } => self
                .start(coordinate, pause_seconds, injection_interval_seconds)
                .map(|_| ()),
            Command::Stop => {
                self.stop();
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn phase(&self) -> SequencerPhase {
        self.inner.phase.get()
    }

    /// Whether an injection cycle has ever begun. Never reset.
    #[must_use]
    pub fn test_started(&self) -> bool {
        self.inner.test_started.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.state.lock().stopped
    }

    #[must_use]
    pub fn pending_coordinate(&self) -> Option<Coordinate> {
        self.inner.state.lock().pending_coordinate
    }

    #[must_use]
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.inner.state.lock().connection_id
    }

    /// The fix pushed by the most recent cycle, if any.
    #[must_use]
    pub fn last_fix(&self) -> Option<MockFix> {
        self.inner.last_fix.lock().clone()
    }

    /// Block until nothing is in flight, or `None` after `timeout`.
    pub fn wait_until_settled(&self, timeout: Duration) -> Option<SequencerPhase> {
        self.inner.phase.wait_settled(timeout)
    }
}

impl ConnectionListener for Inner {
    fn on_connected(&self, id: ConnectionId) {
        let cycle = {
            let state = self.state.lock();
            if !state.is_current(id) {
                debug!(connection = %id, "Ignoring connected callback for stale connection");
                return;
            }
            let (Some(client), Some(coordinate)) =
                (state.connection.clone(), state.pending_coordinate)
            else {
                return;
            };
            if !self
                .phase
                .transition(SequencerPhase::Connecting, SequencerPhase::Injecting)
            {
                debug!(connection = %id, phase = %self.phase.get(), "Ignoring repeated connected callback");
                return;
            }
            let params = CycleParameters::new(
                state.action,
                state.pause_seconds,
                state.injection_interval_seconds,
            )
            .resolve(self.timing);
            InjectionCycle::new(
                params,
                coordinate,
                client,
                Arc::clone(&self.clock),
                self.cancel.clone(),
            )
            .with_started_flag(Arc::clone(&self.test_started))
            .with_fix_slot(Arc::clone(&self.last_fix))
        };

        info!(connection = %id, "Location provider connected");
        self.sink.notify(&Notification::Connected);

        // Submitting under the state lock orders the job against `stop`: either
        // the stop is seen here or the job is queued before the worker closes.
        let state = self.state.lock();
        if state.stopped || !state.is_current(id) {
            debug!(connection = %id, "Stopped before the injection cycle was queued");
            self.phase
                .transition(SequencerPhase::Injecting, SequencerPhase::Cancelled);
            return;
        }
        let phase = Arc::clone(&self.phase);
        let submitted = self.worker.submit(Box::new(move || {
            let next = match cycle.run() {
                Ok(_) => SequencerPhase::Done,
                Err(SequencerError::CycleCancelled) => {
                    debug!("Injection cycle cancelled");
                    SequencerPhase::Cancelled
                }
                Err(e) => {
                    error!(error = %e, "Injection cycle failed");
                    SequencerPhase::Failed
                }
            };
            phase.transition(SequencerPhase::Injecting, next);
        }));
        drop(state);
        if let Err(e) = submitted {
            error!(error = %e, "Could not schedule injection cycle");
            self.phase
                .transition(SequencerPhase::Injecting, SequencerPhase::Failed);
        }
    }

    fn on_connection_failed(&self, id: ConnectionId, reason: &str) {
        {
            let mut state = self.state.lock();
            if !state.is_current(id) {
                debug!(connection = %id, "Ignoring failure callback for stale connection");
                return;
            }
            if self.phase.get() != SequencerPhase::Connecting {
                debug!(connection = %id, phase = %self.phase.get(), "Ignoring failure callback");
                return;
            }
            // Claim the failure: later callbacks for `id` are stale and `stop` is a no-op.
            state.connection = None;
            state.connection_id = None;
            state.stopped = true;
        }

        warn!(connection = %id, reason, "Connection to location provider failed");
        self.sink.notify(&Notification::ConnectionFailed {
            reason: reason.to_string(),
        });
        // Published only after the sink has the event, so settled waiters see it.
        self.phase
            .transition(SequencerPhase::Connecting, SequencerPhase::Failed);
        self.cancel.cancel();
        self.worker.close();
    }

    fn on_disconnected(&self, id: ConnectionId) {
        if !self.state.lock().is_current(id) {
            debug!(connection = %id, "Ignoring disconnect of stale connection");
            return;
        }
        if self.test_started.load(Ordering::SeqCst) {
            warn!(connection = %id, "Location provider disconnected after the test started");
            self.sink.notify(&Notification::UnexpectedDisconnect);
        } else {
            debug!(connection = %id, "Location provider disconnected before the test started");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(client) = self.state.get_mut().connection.take() {
            client.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, Sender};
    use mockloc_core::clock::FixedClock;
    use mockloc_core::sinks::ChannelSink;

    use crate::simulated::{ConnectBehaviour, SimulatedConfig, SimulatedLocationService};

    const SETTLE: Duration = Duration::from_secs(10);

    fn manual() -> (
        MockLocationSequencer,
        Arc<SimulatedLocationService>,
        Receiver<Notification>,
    ) {
        with_config(
            SimulatedConfig {
                behaviour: ConnectBehaviour::Manual,
                ..SimulatedConfig::default()
            },
            CycleTiming::Configured,
        )
    }

    fn with_config(
        config: SimulatedConfig,
        timing: CycleTiming,
    ) -> (
        MockLocationSequencer,
        Arc<SimulatedLocationService>,
        Receiver<Notification>,
    ) {
        let service = Arc::new(SimulatedLocationService::new(config));
        let (tx, rx) = crossbeam_channel::unbounded();
        let sequencer = MockLocationSequencer::new(
            service.clone(),
            Arc::new(ChannelSink::new(tx)),
            Arc::new(FixedClock::new(1_000, 2_000)),
            SequencerOptions {
                timing,
                ..SequencerOptions::default()
            },
        )
        .unwrap();
        (sequencer, service, rx)
    }

    fn drain(rx: &Receiver<Notification>) -> Vec<Notification> {
        rx.try_iter().collect()
    }

    #[test]
    fn start_connects_without_blocking() {
        let (sequencer, service, rx) = manual();
        let id = sequencer.start(Coordinate::new(1.0, 2.0), 30, 30).unwrap();
        assert_eq!(sequencer.phase(), SequencerPhase::Connecting);
        assert_eq!(sequencer.connection_id(), Some(id));
        assert_eq!(sequencer.pending_coordinate(), Some(Coordinate::new(1.0, 2.0)));
        assert_eq!(service.connect_count(), 1);
        assert!(!sequencer.test_started());
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn connected_runs_one_cycle() {
        let (sequencer, service, rx) = manual();
        sequencer.start(Coordinate::new(37.0, -122.0), 0, 0).unwrap();
        service.last_callbacks().unwrap().connected();

        assert_eq!(sequencer.wait_until_settled(SETTLE), Some(SequencerPhase::Done));
        let fixes = service.fixes();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].coordinate(), Coordinate::new(37.0, -122.0));
        assert!((fixes[0].accuracy - 3.0).abs() < f32::EPSILON);
        assert_eq!(fixes[0].time_millis, 1_000);
        assert_eq!(service.mock_mode_calls(), vec![true]);
        assert_eq!(sequencer.last_fix(), Some(fixes[0].clone()));
        assert!(sequencer.test_started());
        assert_eq!(drain(&rx), vec![Notification::Connected]);
    }

    #[test]
    fn repeated_connected_callback_schedules_nothing_more() {
        let (sequencer, service, _rx) = manual();
        sequencer.start(Coordinate::new(0.0, 0.0), 0, 0).unwrap();
        let callbacks = service.last_callbacks().unwrap();
        callbacks.connected();
        callbacks.connected();
        sequencer.wait_until_settled(SETTLE);
        assert_eq!(service.fixes().len(), 1);
    }

    #[test]
    fn connection_failure_is_terminal() {
        let (sequencer, service, rx) = manual();
        sequencer.start(Coordinate::new(0.0, 0.0), 0, 0).unwrap();
        service.last_callbacks().unwrap().connection_failed("service missing");

        assert_eq!(sequencer.phase(), SequencerPhase::Failed);
        assert!(sequencer.is_stopped());
        assert!(service.fixes().is_empty());
        assert_eq!(
            drain(&rx),
            vec![Notification::ConnectionFailed {
                reason: "service missing".into()
            }]
        );
        assert_eq!(
            sequencer.start(Coordinate::new(0.0, 0.0), 0, 0),
            Err(SequencerError::Stopped)
        );
    }

    #[test]
    fn failure_event_is_visible_once_settled() {
        for _ in 0..20 {
            let (sequencer, _service, rx) = with_config(
                SimulatedConfig {
                    behaviour: ConnectBehaviour::Refuse("play services missing".into()),
                    connect_delay: Duration::from_millis(1),
                    ..SimulatedConfig::default()
                },
                CycleTiming::Configured,
            );
            sequencer.start(Coordinate::new(0.0, 0.0), 0, 0).unwrap();
            assert_eq!(sequencer.wait_until_settled(SETTLE), Some(SequencerPhase::Failed));
            assert_eq!(
                drain(&rx),
                vec![Notification::ConnectionFailed {
                    reason: "play services missing".into()
                }]
            );
        }
    }

    /// Sink that parks the caller inside the `Connected` notification.
    struct GatedSink {
        events: Sender<Notification>,
        entered: Sender<()>,
        release: Receiver<()>,
    }

    impl NotificationSink for GatedSink {
        fn notify(&self, event: &Notification) {
            let _ = self.events.send(event.clone());
            if *event == Notification::Connected {
                let _ = self.entered.send(());
                let _ = self.release.recv();
            }
        }
    }

    #[test]
    fn stop_while_connected_is_being_reported_cancels() {
        let service = Arc::new(SimulatedLocationService::new(SimulatedConfig {
            behaviour: ConnectBehaviour::Manual,
            ..SimulatedConfig::default()
        }));
        let (tx, rx) = crossbeam_channel::unbounded();
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let sequencer = MockLocationSequencer::new(
            service.clone(),
            Arc::new(GatedSink {
                events: tx,
                entered: entered_tx,
                release: release_rx,
            }),
            Arc::new(FixedClock::new(1_000, 2_000)),
            SequencerOptions::default(),
        )
        .unwrap();

        sequencer.start(Coordinate::new(0.0, 0.0), 0, 0).unwrap();
        let callbacks = service.last_callbacks().unwrap();
        let connecting = std::thread::spawn(move || callbacks.connected());
        entered_rx.recv_timeout(SETTLE).unwrap();

        sequencer.stop();
        release_tx.send(()).unwrap();
        connecting.join().unwrap();

        assert_eq!(
            sequencer.wait_until_settled(SETTLE),
            Some(SequencerPhase::Cancelled)
        );
        assert!(service.fixes().is_empty());
        assert!(service.mock_mode_calls().is_empty());
        assert_eq!(
            drain(&rx),
            vec![Notification::Connected, Notification::Stopping]
        );
    }

    #[test]
    fn connected_after_failure_is_ignored() {
        let (sequencer, service, rx) = manual();
        sequencer.start(Coordinate::new(0.0, 0.0), 0, 0).unwrap();
        let callbacks = service.last_callbacks().unwrap();
        callbacks.connection_failed("denied");
        callbacks.connected();
        assert_eq!(sequencer.phase(), SequencerPhase::Failed);
        assert!(service.fixes().is_empty());
        assert_eq!(drain(&rx).len(), 1);
    }

    #[test]
    fn disconnect_before_test_is_silent() {
        let (sequencer, service, rx) = manual();
        sequencer.start(Coordinate::new(0.0, 0.0), 0, 0).unwrap();
        service.last_callbacks().unwrap().disconnected();
        assert!(drain(&rx).is_empty());
        assert_eq!(sequencer.phase(), SequencerPhase::Connecting);
    }

    #[test]
    fn disconnect_after_test_is_reported_once() {
        let (sequencer, service, rx) = manual();
        sequencer.start(Coordinate::new(0.0, 0.0), 0, 0).unwrap();
        let callbacks = service.last_callbacks().unwrap();
        callbacks.connected();
        sequencer.wait_until_settled(SETTLE);
        drain(&rx);

        callbacks.disconnected();
        assert_eq!(drain(&rx), vec![Notification::UnexpectedDisconnect]);
    }

    #[test]
    fn provider_drop_during_pause_fails_cycle() {
        let (sequencer, service, rx) = with_config(
            SimulatedConfig {
                behaviour: ConnectBehaviour::Accept,
                connect_delay: Duration::from_millis(5),
                disconnect_after: Some(Duration::from_millis(20)),
                ..SimulatedConfig::default()
            },
            CycleTiming::Configured,
        );
        sequencer.start(Coordinate::new(0.0, 0.0), 1, 0).unwrap();
        assert_eq!(sequencer.wait_until_settled(SETTLE), Some(SequencerPhase::Failed));
        assert!(service.fixes().is_empty());
        assert_eq!(
            drain(&rx),
            vec![Notification::Connected, Notification::UnexpectedDisconnect]
        );
    }

    #[test]
    fn busy_while_connecting() {
        let (sequencer, _service, _rx) = manual();
        sequencer.start(Coordinate::new(0.0, 0.0), 0, 0).unwrap();
        assert_eq!(
            sequencer.start(Coordinate::new(1.0, 1.0), 0, 0),
            Err(SequencerError::Busy)
        );
    }

    #[test]
    fn restart_after_done_uses_fresh_connection() {
        let (sequencer, service, _rx) = manual();
        let first = sequencer.start(Coordinate::new(1.0, 1.0), 0, 0).unwrap();
        let stale = service.last_callbacks().unwrap();
        stale.connected();
        sequencer.wait_until_settled(SETTLE);

        let second = sequencer.start(Coordinate::new(2.0, 2.0), 0, 0).unwrap();
        assert!(second > first);
        assert_eq!(service.disconnect_count(), 1);

        // Events from the previous connection no longer count.
        stale.connected();
        assert_eq!(sequencer.phase(), SequencerPhase::Connecting);

        service.last_callbacks().unwrap().connected();
        assert_eq!(sequencer.wait_until_settled(SETTLE), Some(SequencerPhase::Done));
        let fixes = service.fixes();
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[1].coordinate(), Coordinate::new(2.0, 2.0));
        assert!(sequencer.test_started());
    }

    #[test]
    fn stop_while_connecting() {
        let (sequencer, service, rx) = manual();
        sequencer.start(Coordinate::new(0.0, 0.0), 0, 0).unwrap();
        let callbacks = service.last_callbacks().unwrap();
        sequencer.stop();

        assert_eq!(sequencer.phase(), SequencerPhase::Stopped);
        assert_eq!(drain(&rx), vec![Notification::Stopping]);
        assert_eq!(service.disconnect_count(), 1);

        callbacks.connected();
        assert!(service.fixes().is_empty());
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn stop_during_pause_prevents_fix() {
        let (sequencer, service, rx) = manual();
        sequencer.start(Coordinate::new(0.0, 0.0), 30, 30).unwrap();
        service.last_callbacks().unwrap().connected();
        std::thread::sleep(Duration::from_millis(50));

        sequencer.stop();
        assert_eq!(
            sequencer.wait_until_settled(SETTLE),
            Some(SequencerPhase::Cancelled)
        );
        assert!(service.fixes().is_empty());
        assert_eq!(
            drain(&rx),
            vec![Notification::Connected, Notification::Stopping]
        );
    }

    #[test]
    fn stop_during_interval_keeps_fix() {
        let (sequencer, service, _rx) = manual();
        sequencer.start(Coordinate::new(5.0, 6.0), 0, 30).unwrap();
        service.last_callbacks().unwrap().connected();
        let deadline = std::time::Instant::now() + SETTLE;
        while service.fixes().is_empty() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }

        sequencer.stop();
        assert_eq!(
            sequencer.wait_until_settled(SETTLE),
            Some(SequencerPhase::Cancelled)
        );
        assert_eq!(service.fixes().len(), 1);
    }

    #[test]
    fn second_stop_is_noop() {
        let (sequencer, _service, rx) = manual();
        sequencer.stop();
        sequencer.stop();
        assert_eq!(drain(&rx), vec![Notification::Stopping]);
        assert_eq!(
            sequencer.start(Coordinate::new(0.0, 0.0), 0, 0),
            Err(SequencerError::Stopped)
        );
    }

    #[test]
    fn dispatch_routes_commands() {
        let (sequencer, service, rx) = manual();
        sequencer
            .dispatch(Command::start(Coordinate::new(3.0, 4.0)))
            .unwrap();
        assert_eq!(service.connect_count(), 1);
        sequencer.dispatch(Command::Stop).unwrap();
        assert!(sequencer.is_stopped());
        assert_eq!(drain(&rx), vec![Notification::Stopping]);
        assert_eq!(Command::Stop.action(), Action::Stop);
    }

    #[test]
    fn provider_rejection_fails_cycle() {
        let (sequencer, service, _rx) = with_config(
            SimulatedConfig {
                behaviour: ConnectBehaviour::Manual,
                reject_mock_location: Some("mock locations disabled".into()),
                ..SimulatedConfig::default()
            },
            CycleTiming::Configured,
        );
        sequencer.start(Coordinate::new(0.0, 0.0), 0, 0).unwrap();
        service.last_callbacks().unwrap().connected();
        assert_eq!(sequencer.wait_until_settled(SETTLE), Some(SequencerPhase::Failed));
        assert!(service.fixes().is_empty());
    }

    #[test]
    fn accepting_provider_connects_asynchronously() {
        let (sequencer, service, rx) = with_config(
            SimulatedConfig {
                behaviour: ConnectBehaviour::Accept,
                connect_delay: Duration::from_millis(10),
                ..SimulatedConfig::default()
            },
            CycleTiming::Configured,
        );
        sequencer.start(Coordinate::new(9.0, 9.0), 0, 0).unwrap();
        assert_eq!(sequencer.wait_until_settled(SETTLE), Some(SequencerPhase::Done));
        assert_eq!(service.fixes().len(), 1);
        assert_eq!(drain(&rx), vec![Notification::Connected]);
    }

    #[test]
    fn dropping_sequencer_interrupts_cycle() {
        let (sequencer, service, _rx) = manual();
        sequencer.start(Coordinate::new(0.0, 0.0), 30, 30).unwrap();
        service.last_callbacks().unwrap().connected();
        let start = std::time::Instant::now();
        drop(sequencer);
        assert!(start.elapsed() < SETTLE);
        assert!(service.fixes().is_empty());
    }
}
