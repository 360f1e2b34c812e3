//! Shared error type across hitcounter crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request or config.
    BadRequest,
    /// Counter store could not confirm a write.
    StoreUnavailable,
    /// Downstream handler ran and reported a fault.
    DownstreamError,
    /// Downstream handler could not be invoked at all.
    DownstreamUnreachable,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ClientCode::DownstreamError => "DOWNSTREAM_ERROR",
            ClientCode::DownstreamUnreachable => "DOWNSTREAM_UNREACHABLE",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HitCounterError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HitCounterError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    /// Carries the fault exactly as the downstream reported it.
    #[error("downstream error: {0}")]
    DownstreamError(String),
    #[error("downstream unreachable: {0}")]
    DownstreamUnreachable(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl HitCounterError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            HitCounterError::StoreUnavailable(_) => ClientCode::StoreUnavailable,
            HitCounterError::DownstreamError(_) => ClientCode::DownstreamError,
            HitCounterError::DownstreamUnreachable(_) => ClientCode::DownstreamUnreachable,
            HitCounterError::BadRequest(_) => ClientCode::BadRequest,
            HitCounterError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            HitCounterError::Internal(_) => ClientCode::Internal,
        }
    }
}
