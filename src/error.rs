//! Error types for tasklist operations.
//!
//! [`Error`] is the crate-wide error. Its variants follow the failure
//! taxonomy of the application: authentication failures, store failures and
//! validation failures, plus configuration and transport failures that only
//! occur at the edges.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the store, the auth provider, the aggregation service
/// and the client data layer.
///
/// # Examples
///
/// ```
/// use tasklist::Error;
///
/// let err = Error::validation("Task text must not be empty");
/// assert!(err.is_validation());
/// assert_eq!(err.to_string(), "Task text must not be empty");
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// Missing, invalid or expired credential.
    #[error("{0}")]
    Authentication(String),

    /// Underlying persistence failure (constraint violation, connectivity).
    #[error("{0}")]
    Store(String),

    /// The requested record does not exist for this owner.
    #[error("task not found: {task_id}")]
    NotFound {
        /// The task ID that was not found.
        task_id: String,
    },

    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP failure while talking to a remote collaborator.
    #[error("transport error: {0}")]
    Transport(String),

    /// The aggregation endpoint answered with a structured error body.
    #[error("{0}")]
    Service(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns `true` for [`Error::Authentication`].
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Returns `true` for [`Error::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` for store-side failures, including not-found.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_) | Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {err}"))
    }
}

#[cfg(feature = "http-client")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_message_verbatim() {
        assert_eq!(
            Error::authentication("Invalid user token").to_string(),
            "Invalid user token"
        );
        assert_eq!(
            Error::store("duplicate key value").to_string(),
            "duplicate key value"
        );
        assert_eq!(
            Error::NotFound {
                task_id: "abc".to_string()
            }
            .to_string(),
            "task not found: abc"
        );
    }

    #[test]
    fn classification_helpers() {
        assert!(Error::authentication("x").is_authentication());
        assert!(Error::validation("x").is_validation());
        assert!(Error::store("x").is_store());
        assert!(Error::NotFound {
            task_id: "t".to_string()
        }
        .is_store());
        assert!(!Error::internal("x").is_store());
    }
}
