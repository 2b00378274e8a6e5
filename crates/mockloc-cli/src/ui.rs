//! Terminal styling for status lines and the wait spinner.

use std::time::Duration;

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};

use mockloc_core::types::Coordinate;

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Error,
}

impl Status {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "[OK]",
            Self::Warn => "[WARN]",
            Self::Error => "[ERROR]",
        }
    }

    fn styled(self) -> StyledObject<&'static str> {
        let label = style(self.label()).bold();
        match self {
            Self::Ok => label.green(),
            Self::Warn => label.yellow(),
            Self::Error => label.red(),
        }
    }

    /// Warnings and errors go to stderr so stdout carries only results.
    #[must_use]
    pub fn to_stderr(self) -> bool {
        self != Self::Ok
    }
}

/// Colors are off when `NO_COLOR` is set.
#[must_use]
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Render a status line without printing it.
#[must_use]
pub fn status_line(status: Status, text: &str) -> String {
    if colors_enabled() {
        format!("{} {text}", status.styled())
    } else {
        format!("{} {text}", status.label())
    }
}

pub fn print_status(status: Status, text: &str) {
    let line = status_line(status, text);
    if status.to_stderr() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

/// Banner naming the coordinate about to be injected.
pub fn print_banner(coordinate: Coordinate) {
    let text = format!("mockloc → {coordinate}");
    if colors_enabled() {
        println!("{}", style(text).bold().cyan());
    } else {
        println!("{text}");
    }
}

/// Spinner shown while waiting on the provider. Hidden in quiet mode.
#[must_use]
pub fn wait_spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
