//! Process exit codes.

use crate::error::EvalError;

/// Stable exit codes, one per failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// Unknown distance measure or other bad argument
    InvalidArgument = 2,
    /// Malformed dump or point line without a cluster
    ParseError = 3,
    /// No clusters or no points
    EmptyInput = 4,
    /// Zero-norm vector under Cosine, or a result that overflows
    DegenerateVector = 5,
    IoError = 6,
}

impl ExitCode {
    pub fn from_error(error: &EvalError) -> Self {
        match error {
            EvalError::UnknownDistanceMeasure(_) => ExitCode::InvalidArgument,
            EvalError::MalformedDump { .. } | EvalError::NoActiveCluster { .. } => {
                ExitCode::ParseError
            }
            EvalError::EmptyDump { .. } => ExitCode::EmptyInput,
            EvalError::DegenerateVector { .. } | EvalError::NonFinite { .. } => {
                ExitCode::DegenerateVector
            }
            EvalError::Io(_) => ExitCode::IoError,
        }
    }

    /// Classify an error coming out of a command, looking through `anyhow` context.
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        error
            .chain()
            .find_map(|cause| cause.downcast_ref::<EvalError>())
            .map(Self::from_error)
            .unwrap_or(ExitCode::GeneralError)
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_classes() {
        assert_eq!(
            ExitCode::from_error(&EvalError::UnknownDistanceMeasure("x".into())),
            ExitCode::InvalidArgument
        );
        assert_eq!(
            ExitCode::from_error(&EvalError::EmptyDump {
                clusters: 0,
                points: 0
            }),
            ExitCode::EmptyInput
        );
        assert_eq!(
            ExitCode::from_error(&EvalError::NoActiveCluster {
                line: 1,
                content: String::new()
            }),
            ExitCode::ParseError
        );
        assert_eq!(
            ExitCode::from_error(&EvalError::NonFinite {
                context: "total point count".into()
            }),
            ExitCode::DegenerateVector
        );
    }

    #[test]
    fn test_from_anyhow_sees_through_context() {
        let result: Result<(), EvalError> = Err(EvalError::DegenerateVector {
            context: "left operand".into(),
        });
        let err = result.context("evaluating dump.txt").unwrap_err();
        assert_eq!(ExitCode::from_anyhow(&err), ExitCode::DegenerateVector);

        let plain = anyhow::anyhow!("something else");
        assert_eq!(ExitCode::from_anyhow(&plain), ExitCode::GeneralError);
    }
}
