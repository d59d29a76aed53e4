//! Task store backed by the hosted data store's REST row API.
//!
//! Rows live in the `todos` table and are addressed with filter query
//! parameters (`user_id=eq.<owner>`, `id=eq.<task>`). Every request carries
//! the project `apikey` and an `Authorization: Bearer` credential. On the
//! server that credential is the service-level key; on the client it is the
//! signed-in user's access token, so the store's row-level policy applies in
//! addition to the explicit owner filter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::shared::http_utils::{join_endpoint, redact_url_query, DEFAULT_REQUEST_TIMEOUT};
use crate::types::{NewTask, Task};

use super::TaskStore;

const TODOS_PATH: &str = "rest/v1/todos";

/// Connection settings for [`RestTaskStore`].
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Project base URL, e.g. `https://project.example.co`.
    pub base_url: Url,
    /// Project API key sent as the `apikey` header.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RestStoreConfig {
    /// Creates a configuration with the default request timeout.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// REST-backed [`TaskStore`].
#[derive(Debug, Clone)]
pub struct RestTaskStore {
    client: reqwest::Client,
    table_url: Url,
    api_key: String,
    bearer: String,
}

#[derive(Serialize)]
struct CompletedPatch {
    completed: bool,
}

#[derive(Deserialize)]
struct CompletedRow {
    #[serde(default)]
    completed: bool,
}

#[derive(Deserialize)]
struct StoreErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl RestTaskStore {
    /// Creates a store authenticated with the project key itself (the
    /// service-level credential on the server side).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the table URL cannot be derived from the
    /// base URL or the HTTP client cannot be built.
    pub fn new(config: RestStoreConfig) -> Result<Self> {
        let table_url = join_endpoint(&config.base_url, TODOS_PATH)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            table_url,
            bearer: config.api_key.clone(),
            api_key: config.api_key,
        })
    }

    /// Sends a user's access token instead of the project key, so requests
    /// run under that user's row-level policy.
    pub fn with_bearer(mut self, access_token: impl Into<String>) -> Self {
        self.bearer = access_token.into();
        self
    }

    /// Builds a request carrying both credentials.
    ///
    /// A credential that is not a valid header value (a trailing newline
    /// from a secret file, say) is a configuration error; the request is
    /// never sent without it.
    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        tracing::debug!(
            method = %method,
            url = %redact_url_query(url.as_str()),
            "store request"
        );
        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| Error::config("store API key is not a valid header value"))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.bearer))
            .map_err(|_| Error::config("store bearer token is not a valid header value"))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);
        Ok(self.client.request(method, url).headers(headers))
    }

    fn owner_url(&self, select: &str, owner_id: &str) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", select)
            .append_pair("user_id", &format!("eq.{owner_id}"));
        url
    }

    fn row_url(&self, task_id: &str, owner_id: &str) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{task_id}"))
            .append_pair("user_id", &format!("eq.{owner_id}"));
        url
    }

    async fn rows<T: DeserializeOwned>(builder: RequestBuilder) -> Result<Vec<T>> {
        let response = builder
            .send()
            .await
            .map_err(|e| Error::store(format!("store unreachable: {e}")))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| Error::store(format!("malformed store response: {e}")))
    }
}

/// Maps a non-success response to [`Error::Store`], preferring the store's
/// own `message` field.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<StoreErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| format!("store returned status {status}"));
    tracing::warn!(status = status.as_u16(), %message, "store request failed");
    Err(Error::store(message))
}

#[async_trait]
impl TaskStore for RestTaskStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<Task>> {
        let mut url = self.owner_url("*", owner_id);
        url.query_pairs_mut().append_pair("order", "created_at.desc");
        Self::rows(self.request(Method::GET, url)?).await
    }

    async fn completion_flags(&self, owner_id: &str) -> Result<Vec<bool>> {
        let url = self.owner_url("completed", owner_id);
        let rows: Vec<CompletedRow> = Self::rows(self.request(Method::GET, url)?).await?;
        Ok(rows.into_iter().map(|row| row.completed).collect())
    }

    async fn insert(&self, new_task: NewTask) -> Result<Task> {
        let builder = self
            .request(Method::POST, self.table_url.clone())?
            .header("Prefer", "return=representation")
            .json(&new_task);
        let rows: Vec<Task> = Self::rows(builder).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::store("insert returned no row"))
    }

    async fn set_completed(&self, task_id: &str, owner_id: &str, completed: bool) -> Result<Task> {
        let builder = self
            .request(Method::PATCH, self.row_url(task_id, owner_id))?
            .header("Prefer", "return=representation")
            .json(&CompletedPatch { completed });
        let rows: Vec<Task> = Self::rows(builder).await?;
        rows.into_iter().next().ok_or_else(|| Error::NotFound {
            task_id: task_id.to_string(),
        })
    }

    async fn delete(&self, task_id: &str, owner_id: &str) -> Result<()> {
        let builder = self
            .request(Method::DELETE, self.row_url(task_id, owner_id))?
            .header("Prefer", "return=representation");
        let rows: Vec<Task> = Self::rows(builder).await?;
        if rows.is_empty() {
            return Err(Error::NotFound {
                task_id: task_id.to_string(),
            });
        }
        Ok(())
    }
}
