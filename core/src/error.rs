//! Error types for the request client.
//!
//! # Design
//! Every failed call settles into one `Error`. Failures that happened after a
//! response arrived (`HttpStatus`, `Rejected`) embed that response, so
//! `Error::response` gives callers the same `{error, response}` view no
//! matter how the call failed. Transport failures carry no response at all.
//!
//! Handler failures are not normalized: the error a transform returned is
//! passed through untouched inside `Handler`.

use thiserror::Error;

use crate::outcome::Response;

/// Boxed error returned by transform and error handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by a `Transport` when no response could be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport gave up waiting for the server.
    #[error("request timed out")]
    Timeout,

    /// DNS, connect or reset failures.
    #[error("connection error: {0}")]
    Connection(String),

    #[error("{0}")]
    Other(String),
}

/// Errors a call to `Client::request` settles with.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value cannot be used (unknown method, empty URL,
    /// unencodable body).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No response was obtained at all.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),

    /// A response arrived but its status is missing or outside `[200, 400)`.
    #[error("HTTP status failure: {}", status_label(.response.status))]
    HttpStatus { response: Box<Response> },

    /// A custom classifier refused the response.
    #[error("request rejected: {message}")]
    Rejected {
        message: String,
        response: Option<Box<Response>>,
    },

    /// A transform or error handler failed; the rest of the call was aborted.
    #[error("transform handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The response body does not match the requested type.
    #[error("response body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a response whose status was not accepted.
    pub fn status(response: Response) -> Self {
        Error::HttpStatus {
            response: Box::new(response),
        }
    }

    /// Reject a response with a custom message.
    pub fn rejected(message: impl Into<String>, response: Option<Response>) -> Self {
        Error::Rejected {
            message: message.into(),
            response: response.map(Box::new),
        }
    }

    /// The response this failure carries, if one was received.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::HttpStatus { response } => Some(response.as_ref()),
            Error::Rejected { response, .. } => response.as_deref(),
            _ => None,
        }
    }

    /// Status code of the embedded response.
    pub fn status_code(&self) -> Option<u16> {
        self.response().and_then(|response| response.status)
    }

    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Error::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Transport(err)
    }
}

fn status_label(status: Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no status".to_string(),
    }
}
