//! CLI output formatting and fix export.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use mockloc_core::types::MockFix;

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.0}s")
    }
}

/// One-line summary of a fix.
#[must_use]
pub fn format_fix(fix: &MockFix) -> String {
    format!(
        "{} ({}, ±{:.1}m, t={})",
        fix.coordinate(),
        fix.provider,
        fix.accuracy,
        fix.time_millis
    )
}

/// Write fixes to `path` as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_fixes(path: &Path, fixes: &[MockFix]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(&mut file, fixes)?;
    writeln!(file)?;
    Ok(())
}
