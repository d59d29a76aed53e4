//! The `count-todos` aggregation service.
//!
//! - [`auth`] -- bearer-token verification.
//! - [`aggregation`] -- the transport-independent core, [`CountService`].
//! - [`config`] -- deployment configuration.
//! - [`http`] -- axum transport with CORS headers (requires the `server`
//!   feature).

pub mod aggregation;
pub mod auth;
pub mod config;
#[cfg(feature = "server")]
pub mod http;

pub use aggregation::{CountService, ServiceError};
pub use config::ServiceConfig;
