//! Identifier providers.
//!
//! The middleware takes any [`MakeRequestId`]; closures `Fn() -> String`
//! qualify, so tests can inject a fixed value.

use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::error::RequestIdError;

/// Number of random bytes behind a default identifier (32 hex characters).
const REQUEST_ID_BYTES: usize = 16;

/// Produces a new identifier for a request that arrived without one.
///
/// Called once per such request, possibly from many tasks at once.
pub trait MakeRequestId {
    fn make_request_id(&self) -> String;
}

impl<F> MakeRequestId for F
where
    F: Fn() -> String,
{
    fn make_request_id(&self) -> String {
        self()
    }
}

/// 16 bytes from the OS random source as lowercase hex.
///
/// Yields an empty identifier if the random source fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRequestIdProvider;

impl MakeRequestId for DefaultRequestIdProvider {
    fn make_request_id(&self) -> String {
        default_request_id()
    }
}

/// Hyphenated UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestIdProvider;

impl MakeRequestId for UuidRequestIdProvider {
    fn make_request_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Generate a 32-character lowercase hex identifier, or an empty string if
/// the OS random source fails.
pub fn default_request_id() -> String {
    fail_open(try_generate_request_id())
}

/// Generate a 32-character lowercase hex identifier.
pub fn try_generate_request_id() -> Result<String, RequestIdError> {
    try_generate_from(&mut OsRng)
}

fn try_generate_from<R: RngCore + ?Sized>(rng: &mut R) -> Result<String, RequestIdError> {
    let mut buf = [0u8; REQUEST_ID_BYTES];
    rng.try_fill_bytes(&mut buf)?;
    Ok(buf.iter().map(|b| format!("{b:02x}")).collect())
}

fn fail_open(result: Result<String, RequestIdError>) -> String {
    match result {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to generate request id, continuing without one");
            String::new()
        }
    }
}
