//! Error types for the scheduler client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the remote scheduler
#[derive(Debug, Error)]
pub enum ClientError {
    /// The scheduler command could not be started or its pipes failed
    #[error("Failed to run `{command}`: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The scheduler command exited unsuccessfully
    #[error("`{command}` exited with {status}: {stderr}")]
    NonZeroExit {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// Submission was acknowledged without a parseable job id
    #[error("Submission produced no job id (acknowledgment: {acknowledgment:?})")]
    SubmissionFailed {
        /// Raw acknowledgment text
        acknowledgment: String,
    },

    /// A results document could not be parsed
    #[error("Failed to parse results document: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Check if this error means submission yielded no job
    pub fn is_submission_failure(&self) -> bool {
        matches!(self, Self::SubmissionFailed { .. })
    }

    /// Check if this error came from a document the scheduler returned
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError(_))
    }
}
