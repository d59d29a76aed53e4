//! Shared HTTP helpers used by the service transport and the HTTP clients.

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Default timeout for outbound requests to the store, the auth provider and
/// the aggregation endpoint.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Value of `Access-Control-Allow-Origin` on every endpoint response.
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// Value of `Access-Control-Allow-Headers` on every endpoint response.
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` when the header is absent, uses another scheme, or the
/// token is empty.
///
/// # Examples
///
/// ```
/// use tasklist::shared::http_utils::bearer_token;
///
/// assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
/// assert_eq!(bearer_token(Some("Bearer ")), None);
/// assert_eq!(bearer_token(Some("Basic dXNlcg==")), None);
/// assert_eq!(bearer_token(None), None);
/// ```
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Redact the credential in an `Authorization` value, keeping the scheme.
pub fn redact_authorization(value: &str) -> String {
    match value.split_once(' ') {
        Some((scheme, _)) => format!("{scheme} [REDACTED]"),
        None => "[REDACTED]".to_string(),
    }
}

/// Replace the query string of a URL with `[REDACTED]`.
///
/// Store filters carry owner identities, so they stay out of logs.
pub fn redact_url_query(url: &str) -> String {
    match url.find('?') {
        Some(query_start) => format!("{}?[REDACTED]", &url[..query_start]),
        None => url.to_string(),
    }
}

/// Join a relative path onto a base URL, treating the base as a directory
/// whether or not it ends in `/`.
///
/// # Errors
///
/// Returns [`Error::Config`] if the result is not a valid URL.
///
/// # Examples
///
/// ```
/// use tasklist::shared::http_utils::join_endpoint;
/// use url::Url;
///
/// let base = Url::parse("https://db.example.co/project").unwrap();
/// let url = join_endpoint(&base, "/auth/v1/user").unwrap();
/// assert_eq!(url.as_str(), "https://db.example.co/project/auth/v1/user");
/// ```
pub fn join_endpoint(base: &Url, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| Error::config(format!("invalid endpoint URL {joined}: {e}")))
}
