//! Helpers shared by the service and client halves.

pub mod http_utils;

pub use http_utils::{bearer_token, join_endpoint, redact_url_query};
