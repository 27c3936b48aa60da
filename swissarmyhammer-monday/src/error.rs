//! Error types for the monday client

use crate::columns::ColumnKind;
use thiserror::Error;

/// Result type for monday operations
pub type Result<T> = std::result::Result<T, MondayError>;

/// Failures raised by a [`Transport`](crate::transport::Transport) when a remote call
/// cannot complete.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    /// The service answered with a non-success HTTP status
    #[error("HTTP {status_code}: {body}")]
    Status { status_code: u16, body: String },

    /// The request never produced a response (DNS, TLS, timeout, reset)
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// The response body was not JSON
    #[error("invalid response body: {message}")]
    InvalidBody { message: String },

    /// The configured endpoint is not a usable URL
    #[error("invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

/// Errors that can occur in monday operations
#[derive(Debug, Error)]
pub enum MondayError {
    /// Remote call failed, propagated unchanged from the transport
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// One column payload could not be decoded into its declared kind
    #[error("cannot parse column '{id}' as {kind}: {message}")]
    ColumnParse {
        id: String,
        kind: ColumnKind,
        message: String,
    },

    /// Column kind the codec has no case for
    #[error("unsupported column kind: {kind}")]
    UnsupportedColumnKind { kind: String },

    /// Bulk creation confirmed fewer or more items than were submitted
    #[error("item creation not confirmed for: {}", missing.join(", "))]
    PartialCreation { missing: Vec<String> },

    /// Same column identifier appears twice in one column value set
    #[error("duplicate column id: {id}")]
    DuplicateColumn { id: String },

    /// The service returned a GraphQL `errors` array
    #[error("GraphQL error: {}", messages.join("; "))]
    GraphQl { messages: Vec<String> },

    /// Response JSON lacks the shape the query asked for
    #[error("unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {message}")]
    Config { message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MondayError {
    /// Create a column parse error
    pub fn column_parse(
        id: impl Into<String>,
        kind: ColumnKind,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::ColumnParse {
            id: id.into(),
            kind,
            message: message.to_string(),
        }
    }

    /// Create an unexpected response error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl std::fmt::Display) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }
}

impl From<figment::Error> for MondayError {
    fn from(err: figment::Error) -> Self {
        Self::config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MondayError::column_parse("status", ColumnKind::Status, "missing label");
        assert_eq!(
            err.to_string(),
            "cannot parse column 'status' as status: missing label"
        );
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err: MondayError = TransportError::Status {
            status_code: 500,
            body: "boom".into(),
        }
        .into();
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn test_partial_creation_lists_inputs() {
        let err = MondayError::PartialCreation {
            missing: vec!["Test Item 1".into(), "Test Item 2".into()],
        };
        assert!(err.to_string().contains("Test Item 1, Test Item 2"));
    }
}
