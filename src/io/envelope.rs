//! JSON output envelope for CLI commands.
//!
//! Every command run with `--json` prints exactly one envelope on stdout, on
//! success and on failure, so the output can be piped without checking the
//! exit status first.

use serde::{Deserialize, Serialize};

use super::ExitCode;

/// Schema version for this envelope format.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Operation outcome status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

/// Machine-readable result codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Ok,
    InvalidArgument,
    ParseError,
    EmptyInput,
    DegenerateVector,
    IoError,
    InternalError,
}

impl From<ExitCode> for ResultCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => ResultCode::Ok,
            ExitCode::InvalidArgument => ResultCode::InvalidArgument,
            ExitCode::ParseError => ResultCode::ParseError,
            ExitCode::EmptyInput => ResultCode::EmptyInput,
            ExitCode::DegenerateVector => ResultCode::DegenerateVector,
            ExitCode::IoError => ResultCode::IoError,
            ExitCode::GeneralError => ResultCode::InternalError,
        }
    }
}

/// Response metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// Schema version (semver)
    pub schema_version: String,

    /// Distance measure the result was computed with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,

    /// Input dump path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Execution time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            measure: None,
            source: None,
            duration_ms: None,
        }
    }
}

/// Unified JSON output envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub status: Status,

    pub code: ResultCode,

    /// Unix exit code (0-255)
    pub exit_code: u8,

    /// Human-readable message
    pub message: String,

    /// Result payload (null on error)
    pub data: Option<T>,

    pub meta: Meta,
}

impl<T> Envelope<T> {
    /// Create a success envelope with data.
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            code: ResultCode::Ok,
            exit_code: 0,
            message: "Evaluation completed successfully".to_string(),
            data: Some(data),
            meta: Meta::default(),
        }
    }

    /// Create an error envelope.
    pub fn error(exit_code: ExitCode, message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            code: exit_code.into(),
            exit_code: exit_code as u8,
            message: message.into(),
            data: None,
            meta: Meta::default(),
        }
    }

    pub fn with_measure(mut self, measure: impl Into<String>) -> Self {
        self.meta.measure = Some(measure.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.meta.source = Some(source.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.meta.duration_ms = Some(duration_ms);
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error>
    where
        T: Serialize,
    {
        serde_json::to_string_pretty(self)
    }
}
