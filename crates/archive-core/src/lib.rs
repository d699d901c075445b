//! Shared domain types for Social Archive.
//!
//! Holds the message and activity models, the error type, timezone
//! helpers, number formatting and the command-line settings used by the
//! presentation shell.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{ArchiveError, Result};
