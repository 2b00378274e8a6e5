//! # mockloc-sequencer
//!
//! Connection-gated injection sequencing: a dedicated worker thread, the
//! one-shot injection cycle, the sequencer state machine, and a simulated
//! location service.

pub mod cycle;
pub mod phase;
pub mod sequencer;
pub mod simulated;
pub mod worker;

pub use cycle::InjectionCycle;
pub use phase::{PhaseCell, SequencerPhase};
pub use sequencer::{Command, MockLocationSequencer, SequencerOptions};
pub use simulated::{ConnectBehaviour, SimulatedConfig, SimulatedLocationService};
pub use worker::Worker;
