//! Bearer-token verification for the aggregation service.
//!
//! The service code never inspects tokens itself; it only sees the
//! [`AuthContext`] a [`TokenValidator`] returns.
//!
//! - [`RemoteTokenValidator`] asks the hosted authentication provider
//!   (requires the `http-client` feature).
//! - [`MockValidator`] accepts a fixed token table, for tests and local
//!   development.

pub mod mock;
#[cfg(feature = "http-client")]
pub mod remote;
pub mod traits;

pub use mock::MockValidator;
#[cfg(feature = "http-client")]
pub use remote::RemoteTokenValidator;
pub use traits::{AuthContext, TokenValidator};
