//! HTTP adapter for a self-hosted text-embedding service.
//!
//! One POST per text, no batching, no retry, no connection reuse; the
//! service answers with either a bare vector or a wrapped record, and the
//! decoder fails closed on anything else.

pub mod client;
pub mod format;
pub mod response;

pub use client::{DEFAULT_URL, EmbeddingClient, EmbeddingConfig};
pub use response::EmbeddingPayload;

use thiserror::Error;

/// Embedding adapter errors.
#[derive(Error, Debug)]
pub enum EmbedError {
    /// The response body had an unexpected top-level shape or element type.
    #[error("invalid embedding response format")]
    InvalidResponse,

    /// A wrapped response was missing a link in the `data[0].embedding` path.
    #[error("embedding response missing `{0}`")]
    MissingField(&'static str),

    /// The base URL and subpath do not form a valid endpoint.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// A configured extra header could not be encoded.
    #[error("invalid header: {0}")]
    Header(String),

    /// Transport-level failure, passed through from the HTTP client.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type EmbedResult<T> = Result<T, EmbedError>;
