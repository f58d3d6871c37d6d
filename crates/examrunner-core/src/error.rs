//! Error types for bank loading, session transitions, and persistence.
//!
//! Each concern gets its own enum so callers can match on the failure kind
//! without string inspection. The CLI wraps all of them in `anyhow`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a question bank.
#[derive(Debug, Error)]
pub enum BankError {
    /// The bank file could not be read.
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is neither an object nor an array.
    #[error("expected a JSON object or array at the top level, found {0}")]
    NotAnObject(&'static str),

    /// No list of well-formed questions was found anywhere in the document.
    #[error("no valid questions found")]
    NoQuestions,
}

/// Errors raised when a command is not allowed in the current session state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A session cannot be started without questions.
    #[error("the question bank is empty")]
    EmptyBank,

    /// The exam has already been finished.
    #[error("the exam is already completed")]
    Completed,

    /// The current question already has a submitted answer.
    #[error("question {0} is already answered; use `retry` to answer again")]
    AlreadyAnswered(usize),

    /// The command needs a submitted answer first.
    #[error("answer question {0} first")]
    NotAnswered(usize),

    /// The label is not one of the current question's options.
    #[error("'{label}' is not an option (choose one of: {available})")]
    UnknownOption { label: String, available: String },

    /// `next` on the final question.
    #[error("this is the last question; use `finish` to complete the exam")]
    AtLastQuestion,

    /// `previous` on the first question.
    #[error("this is the first question")]
    AtFirstQuestion,

    /// `finish` before reaching the final question.
    #[error("the exam can only be finished from the last question")]
    NotAtLastQuestion,
}

/// Errors from saving or restoring a session snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid snapshot document.
    #[error("failed to parse session file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot was written by an incompatible version.
    #[error("unsupported session format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// The snapshot parsed but its state is inconsistent.
    #[error("corrupt session state: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_option_lists_choices() {
        let err = SessionError::UnknownOption {
            label: "E".into(),
            available: "A, B, C, D".into(),
        };
        assert_eq!(
            err.to_string(),
            "'E' is not an option (choose one of: A, B, C, D)"
        );
    }

    #[test]
    fn bank_error_wraps_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BankError = json_err.into();
        assert!(err.to_string().starts_with("invalid JSON"));
    }
}
