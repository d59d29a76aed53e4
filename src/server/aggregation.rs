//! Authenticated task-count aggregation.
//!
//! [`CountService::count`] is the transport-independent core of the
//! `count-todos` function: it takes the raw `Authorization` header value and
//! returns an explicit `Result<TaskCount, ServiceError>`. Mapping that result
//! to status codes, bodies and headers is the transport's job (see
//! [`http`](crate::server::http)).
//!
//! The steps, in order:
//!
//! 1. Extract the bearer token. A missing or empty header fails immediately;
//!    neither the provider nor the store is contacted.
//! 2. Exchange the token for a verified identity.
//! 3. Fetch the completion flags of that identity's rows only.
//! 4. Tally total and completed counts in one pass.

use std::sync::Arc;

use thiserror::Error;

use crate::error::Error;
use crate::server::auth::TokenValidator;
use crate::shared::http_utils::bearer_token;
use crate::store::TaskStore;
use crate::types::TaskCount;

/// Why a count request failed. `Display` is the diagnostic message placed in
/// the error body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Missing, invalid or expired credential.
    #[error("{0}")]
    Authentication(String),

    /// The store could not answer the query.
    #[error("{0}")]
    Store(String),

    /// Unexpected failure, including panics caught at the boundary.
    #[error("{0}")]
    Internal(String),
}

impl From<Error> for ServiceError {
    fn from(err: Error) -> Self {
        match err {
            Error::Authentication(message) => Self::Authentication(message),
            Error::Store(_) | Error::NotFound { .. } => Self::Store(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Authentication(message) => Error::Authentication(message),
            ServiceError::Store(message) => Error::Store(message),
            ServiceError::Internal(message) => Error::Internal(message),
        }
    }
}

/// Computes `{ totalCount, completedCount }` for the caller's own tasks.
///
/// Stateless apart from its two collaborators; one instance serves every
/// request.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tasklist::server::aggregation::{CountService, ServiceError};
/// use tasklist::server::auth::MockValidator;
/// use tasklist::store::InMemoryTaskStore;
///
/// # #[tokio::main]
/// # async fn main() {
/// let service = CountService::new(
///     Arc::new(MockValidator::new().with_token("t", "alice")),
///     Arc::new(InMemoryTaskStore::new()),
/// );
///
/// let count = service.count(Some("Bearer t")).await.unwrap();
/// assert_eq!(count.total_count(), 0);
///
/// let err = service.count(None).await.unwrap_err();
/// assert_eq!(err, ServiceError::Authentication("No authorization header".into()));
/// # }
/// ```
#[derive(Clone)]
pub struct CountService {
    validator: Arc<dyn TokenValidator>,
    store: Arc<dyn TaskStore>,
}

impl std::fmt::Debug for CountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountService").finish_non_exhaustive()
    }
}

impl CountService {
    /// Create a service over a token validator and a task store.
    pub fn new(validator: Arc<dyn TokenValidator>, store: Arc<dyn TaskStore>) -> Self {
        Self { validator, store }
    }

    /// Count the tasks of the user identified by `authorization`.
    ///
    /// `authorization` is the raw header value, e.g. `Some("Bearer eyJ...")`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Authentication`] when the header is missing or
    ///   empty (`"No authorization header"`), or the provider rejects the
    ///   token (`"Invalid user token"`).
    /// - [`ServiceError::Store`] when the store query fails.
    pub async fn count(&self, authorization: Option<&str>) -> Result<TaskCount, ServiceError> {
        let token = bearer_token(authorization)
            .ok_or_else(|| ServiceError::Authentication("No authorization header".to_string()))?;

        let auth = self.validator.validate(token).await.map_err(|err| {
            tracing::warn!(error = %err, "token verification failed");
            ServiceError::Authentication("Invalid user token".to_string())
        })?;
        if auth.is_expired() {
            tracing::warn!(user_id = auth.user_id(), "token expired");
            return Err(ServiceError::Authentication("Invalid user token".to_string()));
        }

        let flags = self.store.completion_flags(auth.user_id()).await?;
        let count = TaskCount::tally(flags);

        tracing::debug!(
            user_id = auth.user_id(),
            total = count.total_count(),
            completed = count.completed_count(),
            "counted tasks"
        );
        Ok(count)
    }
}
