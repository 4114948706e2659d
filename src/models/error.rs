//! Error types for the adapter.
//!
//! Every variant is scoped to a single invocation and is never retried; the
//! adapter logs it and answers the load balancer with a gateway timeout.

use lambda_runtime::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The event body was flagged as base64 but did not decode.
    #[error("Could not decode base64 request body: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Method, URL or headers could not form an HTTP request.
    #[error("Could not build HTTP request: {0}")]
    RequestConstruction(String),

    /// The handler finished without setting a status or writing a body.
    #[error("Status code not set on response")]
    IncompleteResponse,
}

impl AdapterError {
    /// Error type reported to the Lambda runtime.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Decode(_) => "DecodeError",
            Self::RequestConstruction(_) => "RequestConstructionError",
            Self::IncompleteResponse => "IncompleteResponseError",
        }
    }
}

impl From<http::Error> for AdapterError {
    fn from(error: http::Error) -> Self {
        Self::RequestConstruction(error.to_string())
    }
}

impl From<AdapterError> for Diagnostic {
    fn from(error: AdapterError) -> Self {
        Self {
            error_type: error.error_type().to_string(),
            error_message: error.to_string(),
        }
    }
}
