//! Error handling and exit codes.

use std::time::Duration;

use mockloc_core::constants::exit_codes;
use mockloc_core::error::SequencerError;
use mockloc_sequencer::phase::SequencerPhase;

/// Application-level failure.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("injection cycle did not finish within {0:?}")]
    Timeout(Duration),

    #[error("injection cycle ended {0}")]
    Incomplete(SequencerPhase),

    #[error("run cancelled")]
    Cancelled,

    #[error(transparent)]
    Sequencer(#[from] SequencerError),
}

/// Map an application error to its process exit code.
pub fn handle_error(err: &AppError) -> i32 {
    match err {
        AppError::Config(_) => exit_codes::ERROR_CONFIG,
        AppError::Timeout(_) => exit_codes::ERROR_TIMEOUT,
        AppError::Sequencer(SequencerError::ConnectionFailed(_)) => exit_codes::ERROR_CONNECTION,
        AppError::Cancelled | AppError::Sequencer(SequencerError::CycleCancelled) => {
            exit_codes::ERROR_CANCELED
        }
        AppError::Incomplete(_) | AppError::Sequencer(_) => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for any error surfaced by `app::run`.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<AppError>()
        .map_or(exit_codes::ERROR_GENERIC, handle_error)
}
