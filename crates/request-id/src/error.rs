//! Error types.

/// Failures while producing a request identifier.
///
/// The middleware never surfaces these; the default provider logs them and
/// falls back to an empty identifier.
#[derive(Debug, thiserror::Error)]
pub enum RequestIdError {
    #[error("entropy source unavailable: {0}")]
    Entropy(#[from] rand::Error),
}
