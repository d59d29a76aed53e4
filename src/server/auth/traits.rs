//! Core authentication types for the aggregation service.
//!
//! The service never trusts a user-id claim carried by the caller. It hands
//! the bearer token to a [`TokenValidator`], and only the [`AuthContext`]
//! that comes back identifies whose tasks may be counted.
//!
//! # Example
//!
//! ```rust
//! use tasklist::server::auth::AuthContext;
//!
//! fn owner_of(auth: &AuthContext) -> &str {
//!     auth.user_id()
//! }
//!
//! let auth = AuthContext::new("user-123").with_email("me@example.com");
//! assert_eq!(owner_of(&auth), "user-123");
//! assert_eq!(auth.email(), Some("me@example.com"));
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Authentication context containing a verified user identity.
///
/// This is the only auth type the aggregation logic interacts with. It is
/// produced by a [`TokenValidator`] after the provider accepted the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Verified user identity; task rows are owned by this value.
    pub subject: String,

    /// Email address reported by the provider, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Token expiration timestamp (Unix epoch seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl AuthContext {
    /// Create a context for a verified subject.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Get the user ID (alias for subject).
    #[inline]
    pub fn user_id(&self) -> &str {
        &self.subject
    }

    /// Get the email address.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Check if the token is expired.
    pub fn is_expired(&self) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        expires_at < now
    }
}

/// Exchanges a bearer token for a verified identity.
///
/// Implementations must treat the token as untrusted input. Any failure
/// (unknown token, expired token, provider unreachable) is reported as
/// [`Error::Authentication`](crate::Error::Authentication).
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate an access token and return the identity it belongs to.
    async fn validate(&self, token: &str) -> Result<AuthContext>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_is_not_expired_without_expiry() {
        let auth = AuthContext::new("u");
        assert_eq!(auth.user_id(), "u");
        assert!(auth.email().is_none());
        assert!(!auth.is_expired());
    }

    #[test]
    fn expiry_in_the_past_is_expired() {
        let auth = AuthContext {
            expires_at: Some(1),
            ..AuthContext::new("u")
        };
        assert!(auth.is_expired());
    }

    #[test]
    fn serialization_skips_missing_fields() {
        let json = serde_json::to_value(AuthContext::new("u")).unwrap();
        assert_eq!(json, serde_json::json!({ "subject": "u" }));
    }
}
