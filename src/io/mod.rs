//! Input/Output handling for the CLI.
//!
//! This module provides:
//! - Output formatting (text, JSON envelope)
//! - Consistent exit codes derived from evaluation errors

pub mod envelope;
pub mod exit_code;
pub mod format;

pub use envelope::{Envelope, Meta, ResultCode, SCHEMA_VERSION, Status};
pub use exit_code::ExitCode;
pub use format::OutputFormat;
