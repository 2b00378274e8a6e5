//! In-process location provider.
//!
//! Delivers connection callbacks from its own threads, like a remote
//! location service would, and records every mock-mode toggle and pushed
//! fix for inspection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use mockloc_core::error::SequencerError;
use mockloc_core::provider::{ConnectionCallbacks, LocationClient, LocationService};
use mockloc_core::types::MockFix;

/// How a simulated client answers `connect()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectBehaviour {
    /// Report `connected` after the connect delay.
    Accept,
    /// Report `connection failed` with the given reason after the delay.
    Refuse(String),
    /// Report nothing; callbacks are fired by hand through
    /// [`SimulatedLocationService::last_callbacks`].
    Manual,
}

#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    pub behaviour: ConnectBehaviour,
    pub connect_delay: Duration,
    /// Drop the connection on the provider side this long after connecting.
    pub disconnect_after: Option<Duration>,
    /// Reject `set_mock_location` with this reason.
    pub reject_mock_location: Option<String>,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            behaviour: ConnectBehaviour::Accept,
            connect_delay: Duration::from_millis(100),
            disconnect_after: None,
            reject_mock_location: None,
        }
    }
}

#[derive(Default)]
struct Record {
    fixes: Mutex<Vec<MockFix>>,
    mock_mode: Mutex<Vec<bool>>,
    callbacks: Mutex<Option<ConnectionCallbacks>>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

/// Location service whose clients live entirely in this process.
pub struct SimulatedLocationService {
    config: SimulatedConfig,
    record: Arc<Record>,
}

impl SimulatedLocationService {
    #[must_use]
    pub fn new(config: SimulatedConfig) -> Self {
        Self {
            config,
            record: Arc::new(Record::default()),
        }
    }

    /// Every fix pushed through any client, in order.
    #[must_use]
    pub fn fixes(&self) -> Vec<MockFix> {
        self.record.fixes.lock().clone()
    }

    /// Every `set_mock_mode` argument, in order.
    #[must_use]
    pub fn mock_mode_calls(&self) -> Vec<bool> {
        self.record.mock_mode.lock().clone()
    }

    /// Callbacks of the most recently created client.
    #[must_use]
    pub fn last_callbacks(&self) -> Option<ConnectionCallbacks> {
        self.record.callbacks.lock().clone()
    }

    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.record.connects.load(Ordering::SeqCst)
    }

    /// Number of solicited `disconnect()` calls.
    #[must_use]
    pub fn disconnect_count(&self) -> usize {
        self.record.disconnects.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedLocationService {
    fn default() -> Self {
        Self::new(SimulatedConfig::default())
    }
}

impl LocationService for SimulatedLocationService {
    fn client(&self, callbacks: ConnectionCallbacks) -> Arc<dyn LocationClient> {
        *self.record.callbacks.lock() = Some(callbacks.clone());
        Arc::new(SimulatedClient {
            callbacks,
            config: self.config.clone(),
            record: Arc::clone(&self.record),
            released: Arc::new(AtomicBool::new(false)),
            dropped: Arc::new(AtomicBool::new(false)),
        })
    }
}

struct SimulatedClient {
    callbacks: ConnectionCallbacks,
    config: SimulatedConfig,
    record: Arc<Record>,
    /// Set by a solicited `disconnect()`.
    released: Arc<AtomicBool>,
    /// Set when the provider side drops the connection.
    dropped: Arc<AtomicBool>,
}

impl SimulatedClient {
    fn ensure_connected(&self) -> Result<(), SequencerError> {
        if self.dropped.load(Ordering::SeqCst) {
            return Err(SequencerError::UnexpectedDisconnect);
        }
        if self.released.load(Ordering::SeqCst) {
            return Err(SequencerError::Provider("client is disconnected".into()));
        }
        Ok(())
    }
}

impl LocationClient for SimulatedClient {
    fn connect(&self) {
        self.record.connects.fetch_add(1, Ordering::SeqCst);
        debug!(connection = %self.callbacks.id(), behaviour = ?self.config.behaviour, "Simulated connect");

        let delay = self.config.connect_delay;
        let callbacks = self.callbacks.clone();
        let released = Arc::clone(&self.released);
        match self.config.behaviour.clone() {
            ConnectBehaviour::Manual => {}
            ConnectBehaviour::Accept => {
                let disconnect_after = self.config.disconnect_after;
                let dropped = Arc::clone(&self.dropped);
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    if released.load(Ordering::SeqCst) {
                        return;
                    }
                    callbacks.connected();
                    let Some(after) = disconnect_after else {
                        return;
                    };
                    std::thread::sleep(after);
                    if released.load(Ordering::SeqCst) || !callbacks.is_live() {
                        return;
                    }
                    dropped.store(true, Ordering::SeqCst);
                    callbacks.disconnected();
                });
            }
            ConnectBehaviour::Refuse(reason) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    if !released.load(Ordering::SeqCst) {
                        callbacks.connection_failed(&reason);
                    }
                });
            }
        }
    }

    fn disconnect(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.record.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn set_mock_mode(&self, enabled: bool) -> Result<(), SequencerError> {
        self.ensure_connected()?;
        self.record.mock_mode.lock().push(enabled);
        Ok(())
    }

    fn set_mock_location(&self, fix: &MockFix) -> Result<(), SequencerError> {
        if let Some(reason) = &self.config.reject_mock_location {
            return Err(SequencerError::Provider(reason.clone()));
        }
        self.ensure_connected()?;
        self.record.fixes.lock().push(fix.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockloc_core::provider::{ConnectionId, ConnectionListener};
    use mockloc_core::types::Coordinate;

    #[derive(Default)]
    struct Events {
        log: Mutex<Vec<&'static str>>,
    }

    impl ConnectionListener for Events {
        fn on_connected(&self, _id: ConnectionId) {
            self.log.lock().push("connected");
        }

        fn on_connection_failed(&self, _id: ConnectionId, _reason: &str) {
            self.log.lock().push("failed");
        }

        fn on_disconnected(&self, _id: ConnectionId) {
            self.log.lock().push("disconnected");
        }
    }

    fn setup(config: SimulatedConfig) -> (SimulatedLocationService, Arc<Events>, Arc<dyn LocationClient>) {
        let service = SimulatedLocationService::new(config);
        let events = Arc::new(Events::default());
        let listener: Arc<dyn ConnectionListener> = events.clone();
        let client = service.client(ConnectionCallbacks::for_listener(ConnectionId(1), &listener));
        (service, events, client)
    }

    fn fast(behaviour: ConnectBehaviour) -> SimulatedConfig {
        SimulatedConfig {
            behaviour,
            connect_delay: Duration::from_millis(5),
            ..SimulatedConfig::default()
        }
    }

    #[test]
    fn accept_reports_connected() {
        let (service, events, client) = setup(fast(ConnectBehaviour::Accept));
        client.connect();
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(*events.log.lock(), vec!["connected"]);
        assert_eq!(service.connect_count(), 1);
    }

    #[test]
    fn refuse_reports_failure() {
        let (_service, events, client) = setup(fast(ConnectBehaviour::Refuse("nope".into())));
        client.connect();
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(*events.log.lock(), vec!["failed"]);
    }

    #[test]
    fn manual_reports_nothing() {
        let (service, events, client) = setup(fast(ConnectBehaviour::Manual));
        client.connect();
        std::thread::sleep(Duration::from_millis(50));
        assert!(events.log.lock().is_empty());
        service.last_callbacks().unwrap().connected();
        assert_eq!(*events.log.lock(), vec!["connected"]);
    }

    #[test]
    fn unsolicited_disconnect_follows_connect() {
        let (_service, events, client) = setup(SimulatedConfig {
            disconnect_after: Some(Duration::from_millis(5)),
            ..fast(ConnectBehaviour::Accept)
        });
        client.connect();
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(*events.log.lock(), vec!["connected", "disconnected"]);
    }

    #[test]
    fn dropped_connection_rejects_fixes() {
        let (service, events, client) = setup(SimulatedConfig {
            disconnect_after: Some(Duration::from_millis(5)),
            ..fast(ConnectBehaviour::Accept)
        });
        client.connect();
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(*events.log.lock(), vec!["connected", "disconnected"]);

        let fix = MockFix::at(Coordinate::new(1.0, 2.0), 3, 4);
        assert_eq!(
            client.set_mock_location(&fix),
            Err(SequencerError::UnexpectedDisconnect)
        );
        assert_eq!(
            client.set_mock_mode(true),
            Err(SequencerError::UnexpectedDisconnect)
        );
        assert!(service.fixes().is_empty());
    }

    #[test]
    fn solicited_disconnect_suppresses_callbacks() {
        let (service, events, client) = setup(SimulatedConfig {
            connect_delay: Duration::from_millis(50),
            ..fast(ConnectBehaviour::Accept)
        });
        client.connect();
        client.disconnect();
        client.disconnect();
        std::thread::sleep(Duration::from_millis(150));
        assert!(events.log.lock().is_empty());
        assert_eq!(service.disconnect_count(), 1);
    }

    #[test]
    fn records_mock_mode_and_fixes() {
        let (service, _events, client) = setup(fast(ConnectBehaviour::Manual));
        client.set_mock_mode(true).unwrap();
        let fix = MockFix::at(Coordinate::new(1.0, 2.0), 3, 4);
        client.set_mock_location(&fix).unwrap();
        assert_eq!(service.mock_mode_calls(), vec![true]);
        assert_eq!(service.fixes(), vec![fix]);
    }

    #[test]
    fn released_client_rejects_fixes() {
        let (service, _events, client) = setup(fast(ConnectBehaviour::Manual));
        client.disconnect();
        let fix = MockFix::at(Coordinate::new(1.0, 2.0), 3, 4);
        assert!(client.set_mock_location(&fix).is_err());
        assert!(service.fixes().is_empty());
    }
}
