//! mockloc library — application logic for the mock-location injector.

pub mod app;
pub mod config;
pub mod errors;
