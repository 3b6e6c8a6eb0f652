//! Error types for the release notes pipeline.

use std::path::PathBuf;

use relnotes_models::WorkItemId;
use thiserror::Error;

/// Errors that can occur while producing and delivering release notes.
///
/// None of these are retried. Every variant aborts the run.
#[derive(Error, Debug)]
pub enum ReleaseNotesError {
    /// Configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A configuration or template file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The saved query endpoint answered with something other than 200.
    #[error("query execution failed with status {status}: {body}")]
    QueryExecution {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        body: String,
    },

    /// A work item detail response was unusable.
    #[error("failed to look up work item {id}: {reason}")]
    DetailLookup {
        /// Work item being fetched.
        id: WorkItemId,
        /// What went wrong.
        reason: String,
    },

    /// Language model call failed.
    #[error("completion request failed: {0}")]
    Completion(String),

    /// A prompt template could not be filled.
    #[error("invalid prompt template: {0}")]
    Template(String),

    /// Composing or submitting the email failed.
    #[error("mail error: {0}")]
    Mail(String),

    /// `send` was called without a composed message.
    #[error("no message composed; call compose_message before send")]
    MessageNotComposed,

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// A response body did not have the expected shape.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReleaseNotesError {
    /// True for failures raised while talking to the work-tracking service.
    pub fn is_work_tracking(&self) -> bool {
        matches!(self, Self::QueryExecution { .. } | Self::DetailLookup { .. })
    }

    /// True for failures raised by the note generator.
    pub fn is_completion(&self) -> bool {
        matches!(self, Self::Completion(_) | Self::Template(_))
    }

    /// True for failures raised by the email dispatcher.
    pub fn is_mail(&self) -> bool {
        matches!(self, Self::Mail(_) | Self::MessageNotComposed)
    }
}

/// Result type for release notes operations.
pub type Result<T> = std::result::Result<T, ReleaseNotesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReleaseNotesError::QueryExecution {
            status: 401,
            body: "unauthorized".into(),
        };
        assert_eq!(
            err.to_string(),
            "query execution failed with status 401: unauthorized"
        );

        let err = ReleaseNotesError::DetailLookup {
            id: WorkItemId(42),
            reason: "missing field System.Title".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to look up work item 42: missing field System.Title"
        );

        let err = ReleaseNotesError::Io {
            path: PathBuf::from("systemRole.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "failed to read systemRole.txt: not found");
    }

    #[test]
    fn test_error_classification() {
        assert!(ReleaseNotesError::QueryExecution {
            status: 500,
            body: String::new()
        }
        .is_work_tracking());
        assert!(ReleaseNotesError::Completion("timeout".into()).is_completion());
        assert!(ReleaseNotesError::MessageNotComposed.is_mail());
        assert!(!ReleaseNotesError::Mail("auth".into()).is_completion());
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: ReleaseNotesError = json_err.into();
        assert!(matches!(err, ReleaseNotesError::Serialization(_)));
    }
}
