//! CLI presentation of sequencer events and run outcomes.

use std::time::Duration;

use indicatif::ProgressBar;

use mockloc_core::sink::{Notification, NotificationSink};
use mockloc_core::types::MockFix;
use mockloc_sequencer::phase::SequencerPhase;

use crate::output::{format_duration, format_fix};
use crate::ui::{print_status, Status};

/// Notification sink that prints events to the terminal.
///
/// Output is routed around the wait spinner so the two never interleave.
pub struct CliNotificationSink {
    quiet: bool,
    spinner: ProgressBar,
}

impl CliNotificationSink {
    #[must_use]
    pub fn new(quiet: bool, spinner: ProgressBar) -> Self {
        Self { quiet, spinner }
    }
}

impl NotificationSink for CliNotificationSink {
    fn notify(&self, event: &Notification) {
        if self.quiet && !event.is_failure() {
            return;
        }
        self.spinner.suspend(|| match event {
            Notification::Connected => print_status(Status::Ok, "Connected to location provider"),
            Notification::Stopping => print_status(Status::Warn, "Stopping"),
            Notification::ConnectionFailed { reason } => {
                print_status(Status::Error, &format!("Connection failed: {reason}"));
            }
            Notification::UnexpectedDisconnect => {
                print_status(Status::Warn, "Location provider disconnected during the test");
            }
        });
        if matches!(event, Notification::Connected) {
            self.spinner.set_message("Injecting mock location");
        }
    }
}

/// Prints the final summary of a run.
pub struct CliPresenter {
    verbose: bool,
    quiet: bool,
}

impl CliPresenter {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Present how the run ended.
    pub fn present_outcome(&self, phase: SequencerPhase, fix: Option<&MockFix>, elapsed: Duration) {
        if self.quiet {
            if let Some(fix) = fix {
                println!("{}", fix.coordinate());
            }
            return;
        }

        match fix {
            Some(fix) => print_status(Status::Ok, &format!("Injected {}", format_fix(fix))),
            None => print_status(Status::Warn, "No fix was injected"),
        }
        println!("Outcome: {phase}");
        if self.verbose {
            println!("Elapsed: {}", format_duration(elapsed));
            if let Some(fix) = fix {
                println!("Monotonic timestamp: {}ns", fix.elapsed_realtime_nanos);
            }
        }
    }
}
