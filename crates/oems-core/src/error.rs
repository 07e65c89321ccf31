//! Error types for sorting network runs
//!
//! There is no recoverable tier. Any error detected by any participant
//! terminates the whole run; the category decides the process exit code.

use thiserror::Error;

use crate::Rank;

/// Core OEMS errors
#[derive(Error, Debug)]
pub enum OemsError {
    // Configuration errors
    #[error("Failed to open file: {path} ({reason})")]
    InputFile { path: String, reason: String },

    #[error("Input file {0} is empty")]
    EmptyInput(String),

    #[error("Input file contains invalid amount of numbers {actual} (expected: {expected})")]
    InputLength { expected: usize, actual: usize },

    #[error("Invalid amount of participants {actual} (required {required})")]
    ParticipantCount { required: usize, actual: usize },

    #[error("Missing {0} argument")]
    MissingArgument(&'static str),

    #[error("Invalid network width {0}: expected a power of two, at least 4")]
    InvalidWidth(usize),

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    // Communication errors
    #[error("Failed to send {count} element(s) [{from} to {to}]: {reason}")]
    SendFailed {
        from: Rank,
        to: Rank,
        count: usize,
        reason: String,
    },

    #[error("Failed to receive {count} element(s) [{at} from {from}]: {reason}")]
    RecvFailed {
        at: Rank,
        from: Rank,
        count: usize,
        reason: String,
    },

    #[error("Unexpected message at {at}: {reason}")]
    UnexpectedMessage { at: Rank, reason: String },

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Participant aborted: {0}")]
    Aborted(String),

    #[error("Run exceeded its deadline")]
    DeadlineExceeded,
}

/// Error category, one exit code each
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing, empty or malformed input file
    InputFile,
    /// Bad arguments, participant count or topology
    Arguments,
    /// Any send/receive failure
    Communication,
}

impl ErrorCategory {
    /// Process exit code for this category
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCategory::InputFile => 1,
            ErrorCategory::Arguments => 2,
            ErrorCategory::Communication => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorCategory::InputFile => "input file error",
            ErrorCategory::Arguments => "configuration error",
            ErrorCategory::Communication => "communication error",
        }
    }
}

impl OemsError {
    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            OemsError::InputFile { .. } | OemsError::EmptyInput(_) | OemsError::InputLength { .. } => {
                ErrorCategory::InputFile
            }
            OemsError::ParticipantCount { .. }
            | OemsError::MissingArgument(_)
            | OemsError::InvalidWidth(_)
            | OemsError::InvalidTopology(_) => ErrorCategory::Arguments,
            OemsError::SendFailed { .. }
            | OemsError::RecvFailed { .. }
            | OemsError::UnexpectedMessage { .. }
            | OemsError::BufferTooShort { .. }
            | OemsError::InvalidWireFormat(_)
            | OemsError::Aborted(_)
            | OemsError::DeadlineExceeded => ErrorCategory::Communication,
        }
    }

    /// Configuration errors are detected before any message is sent
    pub fn is_config(&self) -> bool {
        !matches!(self.category(), ErrorCategory::Communication)
    }
}

/// Result type for OEMS operations
pub type OemsResult<T> = Result<T, OemsError>;
