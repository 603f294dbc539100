//! Error types for the document-database client.
//!
//! # Design
//! Every failure falls into one of three kinds: the exchange itself failed
//! (`Transport`), the server answered with something other than the expected
//! success marker (`UnexpectedResponse`), or a structured response could not
//! be decoded (`Parse`). Non-2xx statuses keep their code and body in
//! `HttpStatus` for diagnosis but report the `Transport` kind, since the
//! request did not complete successfully.

use thiserror::Error;

/// Errors returned by `CouchClient` and `Transport` implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, protocol, timeout or URL failure below HTTP semantics.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The body did not match the expected success marker. Carries the raw
    /// server response.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The response body was not the JSON shape the operation expects.
    #[error("malformed response: {0}")]
    Parse(String),
}

/// Coarse classification of an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    UnexpectedResponse,
    Parse,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) | ApiError::HttpStatus { .. } => ErrorKind::Transport,
            ApiError::UnexpectedResponse(_) => ErrorKind::UnexpectedResponse,
            ApiError::Parse(_) => ErrorKind::Parse,
        }
    }

    /// Raw server body attached to the error, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ApiError::HttpStatus { body, .. } | ApiError::UnexpectedResponse(body) => Some(body),
            ApiError::Transport(_) | ApiError::Parse(_) => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
