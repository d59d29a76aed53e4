//! Mock token validator for development and testing.
//!
//! **Never use in production.** The validator accepts exactly the tokens it
//! was configured with and counts every call, so tests can assert that the
//! provider was (or was not) consulted.
//!
//! # Example
//!
//! ```rust
//! use tasklist::server::auth::MockValidator;
//!
//! let validator = MockValidator::new()
//!     .with_token("token-alice", "alice")
//!     .with_token("token-bob", "bob");
//! assert_eq!(validator.calls(), 0);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::traits::{AuthContext, TokenValidator};
use crate::error::{Error, Result};

/// Mock token validator backed by a fixed token → user table.
///
/// Clones share the call counter.
///
/// # Example
///
/// ```rust
/// use tasklist::server::auth::{MockValidator, TokenValidator};
///
/// # #[tokio::main]
/// # async fn main() {
/// let validator = MockValidator::new().with_token("dev-token", "dev-user");
///
/// let auth = validator.validate("dev-token").await.unwrap();
/// assert_eq!(auth.user_id(), "dev-user");
/// assert!(validator.validate("forged").await.is_err());
/// assert_eq!(validator.calls(), 2);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockValidator {
    tokens: HashMap<String, String>,
    calls: Arc<AtomicUsize>,
}

impl MockValidator {
    /// Create a validator that accepts no tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as a credential for `user_id`.
    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }

    /// Number of `validate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenValidator for MockValidator {
    async fn validate(&self, token: &str) -> Result<AuthContext> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .get(token)
            .map(|user_id| {
                AuthContext::new(user_id.clone())
                    .with_email(format!("{user_id}@mock.local"))
            })
            .ok_or_else(|| Error::authentication("Invalid user token"))
    }
}
