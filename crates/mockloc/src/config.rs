//! Application configuration from CLI flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use mockloc_core::constants::{DEFAULT_INJECTION_INTERVAL_SECONDS, DEFAULT_PAUSE_SECONDS};
use mockloc_core::types::{Coordinate, CycleTiming};
use mockloc_sequencer::simulated::{ConnectBehaviour, SimulatedConfig};

use crate::errors::AppError;

/// mockloc — inject a one-shot mock location fix into a location provider.
#[derive(Parser, Debug)]
#[command(name = "mockloc", version, about)]
pub struct AppConfig {
    /// Latitude of the mock fix in degrees.
    #[arg(long, env = "MOCKLOC_LAT", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the mock fix in degrees.
    #[arg(long, env = "MOCKLOC_LON", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Seconds to wait before the fix is pushed.
    #[arg(long, default_value_t = DEFAULT_PAUSE_SECONDS, allow_negative_numbers = true)]
    pub pause: i64,

    /// Seconds to wait after the fix is pushed.
    #[arg(long, default_value_t = DEFAULT_INJECTION_INTERVAL_SECONDS, allow_negative_numbers = true)]
    pub interval: i64,

    /// Ignore --pause/--interval and wait 1s before and 10s after the fix.
    #[arg(long)]
    pub legacy_timing: bool,

    /// How the simulated location provider answers the connection.
    #[arg(long, value_enum, default_value_t = ProviderMode::Connect)]
    pub provider: ProviderMode,

    /// Failure reason reported by `--provider fail`.
    #[arg(long, default_value = "location services unavailable")]
    pub fail_reason: String,

    /// Delay before the provider answers the connection (e.g., "100ms", "2s").
    #[arg(long, default_value = "100ms")]
    pub connect_delay: String,

    /// Make the provider drop the connection this long after connecting.
    #[arg(long)]
    pub disconnect_after: Option<String>,

    /// Give up if the cycle has not finished after this long (e.g., "30s", "1m").
    #[arg(long, default_value = "1m")]
    pub timeout: String,

    /// Write the injected fixes to this file as JSON.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet mode (only print the injected coordinate).
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

/// Behaviour of the simulated location provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderMode {
    /// Accept the connection.
    Connect,
    /// Refuse the connection.
    Fail,
    /// Never answer the connection attempt.
    Silent,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub coordinate: Coordinate,
    pub pause_seconds: i64,
    pub injection_interval_seconds: i64,
    pub timing: CycleTiming,
    pub simulation: SimulatedConfig,
    pub timeout: Duration,
    pub output: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Check ranges and parse duration strings.
    pub fn validate(&self) -> Result<RunSettings, AppError> {
        let latitude = self
            .lat
            .ok_or_else(|| AppError::Config("--lat is required".into()))?;
        let longitude = self
            .lon
            .ok_or_else(|| AppError::Config("--lon is required".into()))?;
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::Config(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Config(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }

        let behaviour = match self.provider {
            ProviderMode::Connect => ConnectBehaviour::Accept,
            ProviderMode::Fail => ConnectBehaviour::Refuse(self.fail_reason.clone()),
            ProviderMode::Silent => ConnectBehaviour::Manual,
        };
        let disconnect_after = match &self.disconnect_after {
            Some(s) => Some(duration_arg("--disconnect-after", s)?),
            None => None,
        };

        Ok(RunSettings {
            coordinate: Coordinate::new(latitude, longitude),
            pause_seconds: self.pause,
            injection_interval_seconds: self.interval,
            timing: if self.legacy_timing {
                CycleTiming::Legacy
            } else {
                CycleTiming::Configured
            },
            simulation: SimulatedConfig {
                behaviour,
                connect_delay: duration_arg("--connect-delay", &self.connect_delay)?,
                disconnect_after,
                reject_mock_location: None,
            },
            timeout: duration_arg("--timeout", &self.timeout)?,
            output: self.output.clone(),
            verbose: self.verbose,
            quiet: self.quiet,
        })
    }
}

fn duration_arg(flag: &str, value: &str) -> Result<Duration, AppError> {
    parse_duration(value)
        .ok_or_else(|| AppError::Config(format!("{flag}: invalid duration '{value}'")))
}

/// Parse a duration string like "5m", "1h", "30s", "250ms".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.parse().ok()?;
        Some(Duration::from_millis(n))
    } else if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(60)?))
    } else if let Some(hours) = s.strip_suffix('h') {
        let n: u64 = hours.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(3600)?))
    } else if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.parse().ok()?;
        Some(Duration::from_secs(n))
    } else {
        let n: u64 = s.parse().ok()?;
        Some(Duration::from_secs(n))
    }
}
