//! Utility types and functions.
//!
//! This module contains the crate-wide plumbing:
//! - [`Error`] / [`Result`] - Error handling
//! - [`init_logging`] - `tracing` subscriber setup

mod error;
mod logging;

pub use error::*;
pub use logging::*;
