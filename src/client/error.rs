use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Failures raised by [`Client`](super::Client).
///
/// Remote failures are never retried or recovered here; they reach the caller
/// as-is so the adapter layer can decide how to translate them.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} is not a file")]
    NotAFile { path: String },

    #[error("invalid base64 content for {path}: {source}")]
    Content {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("access token is not a valid header value")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to read input stream: {0}")]
    Stream(#[source] std::io::Error),
}

impl ClientError {
    /// HTTP status of the failed response, if the remote answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::CONFLICT) | Some(StatusCode::UNPROCESSABLE_ENTITY)
        )
    }
}
