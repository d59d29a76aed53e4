//! Token validator backed by the hosted authentication provider.
//!
//! The provider exposes `GET {base}/auth/v1/user`: called with the project
//! `apikey` and the user's bearer token it returns the user record, and any
//! other answer means the token is not valid.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::traits::{AuthContext, TokenValidator};
use crate::error::{Error, Result};
use crate::shared::http_utils::{join_endpoint, DEFAULT_REQUEST_TIMEOUT};

const USER_PATH: &str = "auth/v1/user";

/// The subset of the provider's user record we rely on.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Remote [`TokenValidator`].
#[derive(Debug, Clone)]
pub struct RemoteTokenValidator {
    client: reqwest::Client,
    user_url: Url,
    api_key: String,
}

impl RemoteTokenValidator {
    /// Create a validator for the provider at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the user endpoint cannot be derived or
    /// the HTTP client cannot be built.
    pub fn new(base_url: &Url, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a validator with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// See [`RemoteTokenValidator::new`].
    pub fn with_timeout(base_url: &Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            user_url: join_endpoint(base_url, USER_PATH)?,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl TokenValidator for RemoteTokenValidator {
    async fn validate(&self, token: &str) -> Result<AuthContext> {
        tracing::debug!(url = %self.user_url, "verifying user token");

        let response = self
            .client
            .get(self.user_url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "auth provider unreachable");
                Error::authentication("Invalid user token")
            })?;

        if !response.status().is_success() {
            tracing::debug!(status = response.status().as_u16(), "auth provider rejected token");
            return Err(Error::authentication("Invalid user token"));
        }

        let user: ProviderUser = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "malformed user record from auth provider");
            Error::authentication("Invalid user token")
        })?;

        if user.id.is_empty() {
            return Err(Error::authentication("Invalid user token"));
        }

        Ok(AuthContext {
            email: user.email,
            ..AuthContext::new(user.id)
        })
    }
}
