//! Application entry point and dispatch.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info};

use mockloc_cli::output::write_fixes;
use mockloc_cli::presenter::{CliNotificationSink, CliPresenter};
use mockloc_cli::ui::{print_banner, wait_spinner};
use mockloc_core::clock::SystemClock;
use mockloc_core::error::SequencerError;
use mockloc_core::sink::{Notification, SinkSubject};
use mockloc_core::sinks::{ChannelSink, LoggingSink};
use mockloc_sequencer::phase::SequencerPhase;
use mockloc_sequencer::sequencer::{MockLocationSequencer, SequencerOptions};
use mockloc_sequencer::simulated::SimulatedLocationService;

use crate::config::{AppConfig, RunSettings};
use crate::errors::AppError;

/// How long a stopped cycle gets to wind down before the run reports.
const STOP_GRACE: Duration = Duration::from_secs(2);

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    if let Some(shell) = config.completion {
        write_completion(shell, &mut std::io::stdout());
        return Ok(());
    }

    let settings = config.validate()?;
    run_sequencer(&settings)
}

/// Write the completion script for `shell`, named after the parsed command.
fn write_completion(shell: clap_complete::Shell, out: &mut dyn Write) {
    let mut cmd = <AppConfig as clap::CommandFactory>::command();
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin_name, out);
}

/// Drive one injection cycle against the simulated provider.
pub fn run_sequencer(settings: &RunSettings) -> Result<()> {
    if settings.verbose {
        print_banner(settings.coordinate);
    }
    let service = Arc::new(SimulatedLocationService::new(settings.simulation.clone()));
    let spinner = wait_spinner("Connecting to location provider", settings.quiet);

    let (tx, rx) = crossbeam_channel::unbounded::<Notification>();
    let subject = SinkSubject::new();
    subject.register(Arc::new(ChannelSink::new(tx)));
    subject.register(Arc::new(CliNotificationSink::new(
        settings.quiet,
        spinner.clone(),
    )));
    if settings.verbose {
        subject.register(Arc::new(LoggingSink::new()));
    }
    debug!(sinks = subject.count(), "Notification sinks registered");

    let sequencer = MockLocationSequencer::new(
        service.clone(),
        Arc::new(subject),
        Arc::new(SystemClock::new()),
        SequencerOptions {
            timing: settings.timing,
            ..SequencerOptions::default()
        },
    )
    .map_err(AppError::from)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    ctrlc_handler(sequencer.clone(), Arc::clone(&interrupted))?;

    let started = Instant::now();
    sequencer
        .start(
            settings.coordinate,
            settings.pause_seconds,
            settings.injection_interval_seconds,
        )
        .map_err(AppError::from)?;

    let settled = sequencer.wait_until_settled(settings.timeout);
    if settled.is_none() {
        info!(timeout = ?settings.timeout, "Run timed out, stopping sequencer");
        sequencer.stop();
        sequencer.wait_until_settled(STOP_GRACE);
    }
    spinner.finish_and_clear();

    let phase = sequencer.phase();
    let events: Vec<Notification> = rx.try_iter().collect();
    debug!(?phase, events = events.len(), "Run finished");

    let presenter = CliPresenter::new(settings.verbose, settings.quiet);
    presenter.present_outcome(phase, sequencer.last_fix().as_ref(), started.elapsed());

    if let Some(path) = &settings.output {
        write_fixes(path, &service.fixes())
            .with_context(|| format!("writing fixes to {}", path.display()))?;
    }

    if interrupted.load(Ordering::SeqCst) {
        return Err(AppError::Cancelled.into());
    }
    if settled.is_none() {
        return Err(AppError::Timeout(settings.timeout).into());
    }
    outcome(phase, &events)
}

/// Translate the settled phase into the run result.
fn outcome(phase: SequencerPhase, events: &[Notification]) -> Result<()> {
    match phase {
        SequencerPhase::Done => Ok(()),
        SequencerPhase::Failed => {
            let reason = events.iter().find_map(|event| match event {
                Notification::ConnectionFailed { reason } => Some(reason.clone()),
                _ => None,
            });
            match reason {
                Some(reason) => Err(AppError::from(SequencerError::ConnectionFailed(reason)).into()),
                None => Err(AppError::Incomplete(phase).into()),
            }
        }
        SequencerPhase::Cancelled | SequencerPhase::Stopped => Err(AppError::Cancelled.into()),
        other => Err(AppError::Incomplete(other).into()),
    }
}

fn ctrlc_handler(sequencer: MockLocationSequencer, interrupted: Arc<AtomicBool>) -> Result<()> {
    match ctrlc::set_handler(move || {
        interrupted.store(true, Ordering::SeqCst);
        sequencer.stop();
    }) {
        Ok(()) => Ok(()),
        // Only the first run in a process owns the signal.
        Err(ctrlc::Error::MultipleHandlers) => {
            debug!("Ctrl+C handler already installed");
            Ok(())
        }
        Err(e) => Err(e).context("installing Ctrl+C handler"),
    }
}
