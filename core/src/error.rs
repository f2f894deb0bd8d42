//! Error types for the categories client.
//!
//! # Design
//! One variant per failure stage of a round-trip: encoding the payload,
//! constructing the request, moving bytes over the network, checking the
//! status code and decoding the body. Any status other than the one an
//! operation expects is an `UnexpectedStatus`; client and server errors are
//! not told apart.

use thiserror::Error;

/// Errors returned by `CategoriesClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The request could not be constructed (bad URL, header or method).
    #[error("failed to create request: {0}")]
    InvalidRequest(String),

    /// The request could not be sent or the response could not be read.
    #[error("failed to send request: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a status other than the expected one.
    #[error("unexpected status code: got {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl ApiError {
    /// Status code of an `UnexpectedStatus` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
