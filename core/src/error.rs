//! Error types for the networking core.
//!
//! # Design
//! Three layers, each surfaced unchanged to whoever called the layer above:
//! - [`TransportError`]: the request never produced a response. Includes the
//!   routing failures of the test-double transports.
//! - [`CredentialStoreError`]: the secret store failed. The auth service
//!   propagates these from `save_token`/`delete_token` only.
//! - [`ApiError`]: everything the network service can return. A status
//!   outside `[200, 300)` and an undecodable body get their own variants so
//!   callers never confuse them with transport failures.
//!
//! A missing base URL is not represented here: it is a setup bug and panics.

use std::io;

/// Errors returned by `NetworkService` and `MockNetworkService`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered outside `[200, 300)`.
    #[error("invalid status code: {status}")]
    InvalidStatusCode { status: u16 },

    /// The response body could not be decoded into the requested shape.
    #[error("decoding failed: {0}")]
    Decoding(#[source] serde_json::Error),

    /// The endpoint body could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The base URL cannot have path segments appended (e.g. `mailto:`).
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Never produced by the request pipeline. Lets callers mix token
    /// management and requests in one function with `?`.
    #[error(transparent)]
    Credential(#[from] CredentialStoreError),
}

impl ApiError {
    /// The HTTP status carried by [`ApiError::InvalidStatusCode`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::InvalidStatusCode { status } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by `Transport::send`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request has no URL")]
    MissingUrl,

    /// The URL scheme is not `http` or `https`, so no HTTP response can exist.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("no canned route matched the request")]
    NoRouteMatch,

    #[error("{count} canned routes matched the request")]
    AmbiguousRouteMatch { count: usize },

    #[error("request did not match the expected pattern")]
    PatternNotMatched,

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors reported by a `CredentialStore` backend.
///
/// "Not found" is never an error: `load` returns `Ok(None)` and `delete` of an
/// absent key succeeds.
#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    /// The stored secrets could not be encoded for the backend.
    #[error("credential encoding failed: {0}")]
    Encoding(String),

    /// The backend returned data that is not a readable secret.
    #[error("credential decoding failed: {0}")]
    Decoding(String),

    /// The backend itself reported a failure.
    #[error("credential store {operation} failed ({}): {source}", .source.kind())]
    Backend {
        operation: &'static str,
        #[source]
        source: io::Error,
    },
}
