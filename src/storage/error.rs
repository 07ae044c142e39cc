//! Storage layer error types
//!
//! All errors that can occur while talking to the working tree are defined here.
//! We use `thiserror` for ergonomic error definition and better error messages

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::path::InvalidTitleError;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// the git process could not be started or reported an error
    #[error("git {command} failed: {message}")]
    Execution {
        command: String,
        message: String,
        /// whatever the process wrote to stdout before failing
        stdout: Vec<u8>,
    },

    /// the path did not exist at the requested revision
    #[error("not found: {path} at {revision}")]
    NotFound { path: String, revision: String },

    /// a commit was attempted with nothing staged
    #[error("nothing to commit")]
    NothingToCommit,

    /// the title cannot be mapped into the working tree
    #[error("invalid title: {0}")]
    InvalidTitle(#[from] InvalidTitleError),

    /// document content is not valid UTF-8
    #[error("invalid utf-8 in {path}: {source}")]
    InvalidUtf8 {
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// repo is not initialized
    #[error("repository not initialized: {0}")]
    NotInitialized(PathBuf),

    /// error from the git library used for repository setup
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// check if this error indicates the document or revision doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    /// check if this error is the "nothing staged" commit outcome
    pub fn is_nothing_to_commit(&self) -> bool {
        matches!(self, StorageError::NothingToCommit)
    }

    /// diagnostic text reported by git, if this came from a git invocation
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            StorageError::Execution { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_found = StorageError::NotFound {
            path: "Home.md".into(),
            revision: "HEAD".into(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_nothing_to_commit());

        let nothing = StorageError::NothingToCommit;
        assert!(nothing.is_nothing_to_commit());
        assert!(!nothing.is_not_found());
    }

    #[test]
    fn test_execution_diagnostic() {
        let err = StorageError::Execution {
            command: "show".into(),
            message: "fatal: bad object".into(),
            stdout: Vec::new(),
        };
        assert_eq!(err.diagnostic(), Some("fatal: bad object"));
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "git show failed: fatal: bad object");
    }
}
