//! Sources for the task-count query.
//!
//! The data layer asks a [`CountSource`] for counts with the session's
//! access token. [`HttpCountSource`] calls the deployed `count-todos`
//! function; [`CountService`] implements the trait directly for in-process
//! use.

use async_trait::async_trait;

use crate::error::Result;
use crate::server::aggregation::CountService;
use crate::types::TaskCount;

/// Something that can answer "how many tasks does this token's owner have".
#[async_trait]
pub trait CountSource: Send + Sync {
    /// Fetch the counts for the owner of `access_token`.
    async fn fetch_counts(&self, access_token: &str) -> Result<TaskCount>;
}

#[async_trait]
impl CountSource for CountService {
    async fn fetch_counts(&self, access_token: &str) -> Result<TaskCount> {
        let header = format!("Bearer {access_token}");
        Ok(self.count(Some(&header)).await?)
    }
}

#[cfg(feature = "http-client")]
pub use http_source::HttpCountSource;

#[cfg(feature = "http-client")]
mod http_source {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::Deserialize;
    use url::Url;

    use super::CountSource;
    use crate::error::{Error, Result};
    use crate::shared::http_utils::DEFAULT_REQUEST_TIMEOUT;
    use crate::types::TaskCount;

    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    /// Calls the deployed `count-todos` function over HTTP.
    #[derive(Debug, Clone)]
    pub struct HttpCountSource {
        client: reqwest::Client,
        endpoint: Url,
        api_key: Option<String>,
    }

    impl HttpCountSource {
        /// Create a source for the function at `endpoint`.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Config`] if the HTTP client cannot be built.
        pub fn new(endpoint: Url) -> Result<Self> {
            Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
        }

        /// Create a source with an explicit request timeout.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Config`] if the HTTP client cannot be built.
        pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
            Ok(Self {
                client,
                endpoint,
                api_key: None,
            })
        }

        /// Send the public project key as `apikey`, as hosted function
        /// gateways expect.
        pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
            self.api_key = Some(api_key.into());
            self
        }
    }

    #[async_trait]
    impl CountSource for HttpCountSource {
        async fn fetch_counts(&self, access_token: &str) -> Result<TaskCount> {
            tracing::debug!(endpoint = %self.endpoint, "fetching task counts");

            let mut request = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(access_token);
            if let Some(api_key) = &self.api_key {
                request = request.header("apikey", api_key);
            }
            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                return response
                    .json::<TaskCount>()
                    .await
                    .map_err(|e| Error::transport(format!("malformed counts response: {e}")));
            }

            let body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody { error }) => Err(Error::Service(error)),
                Err(_) => Err(Error::transport(format!(
                    "count-todos returned status {status}"
                ))),
            }
        }
    }
}
