//! # mockloc-cli
//!
//! Terminal output for mockloc: event printing, run summaries, and fix
//! export.

pub mod output;
pub mod presenter;
pub mod ui;

pub use presenter::{CliNotificationSink, CliPresenter};
