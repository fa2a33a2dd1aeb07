//! Request-scoped correlation IDs for tower/axum services.
//!
//! [`RequestIdLayer`] reads `X-Request-Id` from each inbound request, or asks
//! a [`MakeRequestId`] provider for a fresh one when the header is absent or
//! empty. The identifier is layered onto the request's [`Context`] and echoed
//! on the response under the same header.
//!
//! Downstream code reads it back through the context:
//!
//! ```
//! use request_id::{get_from_context, with_request_id, Context};
//!
//! let ctx = with_request_id(&Context::background(), "abc123");
//! assert_eq!(get_from_context(Some(&ctx)), Some("abc123"));
//! assert_eq!(get_from_context(Some(&Context::background())), None);
//! ```

pub mod context;
pub mod error;
#[cfg(feature = "axum")]
pub mod extract;
pub mod middleware;
pub mod provider;

pub use context::{get_from_context, with_request_id, Context};
pub use error::RequestIdError;
#[cfg(feature = "axum")]
pub use extract::{RequestId, RequestIdRejection};
pub use middleware::{middleware, RequestIdLayer, RequestIdService, HEADER, REQUEST_ID_HEADER};
pub use provider::{
    default_request_id, try_generate_request_id, DefaultRequestIdProvider, MakeRequestId,
    UuidRequestIdProvider,
};
