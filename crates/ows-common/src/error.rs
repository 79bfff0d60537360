//! Error types for the protocol binding layer.
//!
//! Two kinds of failure are kept apart on purpose: [`CodecError`] is a single
//! fatal condition (no binding, unparsable input, an unencodable value) while
//! [`ValidationFailure`] carries every rule a structurally sound request
//! violated. Readers return [`ReadError`], which holds exactly one of the two.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::report::ValidationFailure;

/// Result type alias using CodecError.
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type returned by every reader.
pub type ReadResult<T> = Result<T, ReadError>;

/// Wire encoding of a request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Encoding {
    Kvp,
    Xml,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Kvp => write!(f, "KVP"),
            Encoding::Xml => write!(f, "XML"),
        }
    }
}

/// Fatal, non-aggregated codec error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    // === Dispatch Errors ===
    #[error("No binding registered for service '{service}', operation '{operation}', version '{version}'")]
    UnsupportedBinding {
        service: String,
        operation: String,
        version: String,
    },

    #[error("{operation} {version} does not support the {encoding} encoding")]
    UnsupportedEncoding {
        operation: String,
        version: String,
        encoding: Encoding,
    },

    // === Malformed Input ===
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Unexpected element '{found}', expected '{expected}'")]
    UnexpectedElement { expected: String, found: String },

    #[error("XML error: {0}")]
    Xml(String),

    // === Semantic Errors ===
    #[error("Operator '{operator}' in '{field}' is not supported by {operation} {version}")]
    UnsupportedOperator {
        field: String,
        operator: String,
        operation: String,
        version: String,
    },

    #[error("'{field}' cannot be encoded by {operation} {version}: {reason}")]
    Unrepresentable {
        field: String,
        operation: String,
        version: String,
        reason: String,
    },

    #[error("Vendor extension '{0}' collides with a standard parameter")]
    ExtensionConflict(String),

    #[error("Expected a {expected} message, got {found}")]
    WrongMessage { expected: String, found: String },
}

impl CodecError {
    pub fn unsupported_binding(
        service: impl Into<String>,
        operation: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        CodecError::UnsupportedBinding {
            service: service.into(),
            operation: operation.into(),
            version: version.into(),
        }
    }

    pub fn unsupported_encoding(operation: &str, version: &str, encoding: Encoding) -> Self {
        CodecError::UnsupportedEncoding {
            operation: operation.to_string(),
            version: version.to_string(),
            encoding,
        }
    }

    /// Get the OWS exception code for this error.
    pub fn ows_exception_code(&self) -> &'static str {
        match self {
            CodecError::UnsupportedBinding { .. } | CodecError::UnsupportedEncoding { .. } => {
                "OperationNotSupported"
            }
            CodecError::Malformed(_)
            | CodecError::MissingElement(_)
            | CodecError::UnexpectedElement { .. }
            | CodecError::Xml(_) => "InvalidRequest",
            CodecError::UnsupportedOperator { .. } | CodecError::Unrepresentable { .. } => {
                "OptionNotSupported"
            }
            CodecError::ExtensionConflict(_) => "InvalidParameterValue",
            CodecError::WrongMessage { .. } => "NoApplicableCode",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            CodecError::Malformed(_)
            | CodecError::MissingElement(_)
            | CodecError::UnexpectedElement { .. }
            | CodecError::Xml(_)
            | CodecError::ExtensionConflict(_) => 400,

            CodecError::UnsupportedBinding { .. }
            | CodecError::UnsupportedEncoding { .. }
            | CodecError::UnsupportedOperator { .. }
            | CodecError::Unrepresentable { .. } => 501,

            CodecError::WrongMessage { .. } => 500,
        }
    }
}

impl From<quick_xml::Error> for CodecError {
    fn from(err: quick_xml::Error) -> Self {
        CodecError::Xml(err.to_string())
    }
}

/// Error returned by readers: either a structural failure or the full list
/// of validation violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadError {
    #[error(transparent)]
    Structural(#[from] CodecError),

    #[error(transparent)]
    Invalid(#[from] ValidationFailure),
}

impl ReadError {
    pub fn as_structural(&self) -> Option<&CodecError> {
        match self {
            ReadError::Structural(err) => Some(err),
            ReadError::Invalid(_) => None,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            ReadError::Structural(_) => None,
            ReadError::Invalid(failure) => Some(failure),
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            ReadError::Structural(err) => err.http_status_code(),
            ReadError::Invalid(_) => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ValidationReport, Violation};

    #[test]
    fn test_error_status_codes() {
        assert_eq!(CodecError::Malformed("x".to_string()).http_status_code(), 400);
        assert_eq!(
            CodecError::unsupported_binding("SOS", "GetObservation", "9.9.9").http_status_code(),
            501
        );
        assert_eq!(
            CodecError::WrongMessage {
                expected: "GetResult".to_string(),
                found: "GetObservation".to_string()
            }
            .http_status_code(),
            500
        );
    }

    #[test]
    fn test_unsupported_binding_display_names_triple() {
        let err = CodecError::unsupported_binding("SOS", "GetObservation", "3.0.0");
        let display = err.to_string();
        assert!(display.contains("SOS"));
        assert!(display.contains("GetObservation"));
        assert!(display.contains("3.0.0"));
        assert_eq!(err.ows_exception_code(), "OperationNotSupported");
    }

    #[test]
    fn test_read_error_keeps_kinds_apart() {
        let structural: ReadError = CodecError::MissingElement("sos:offering".to_string()).into();
        assert!(structural.as_structural().is_some());
        assert!(structural.as_validation().is_none());

        let mut report = ValidationReport::new();
        report.add(Violation::missing("offering"));
        let invalid: ReadError = report.process().unwrap_err().into();
        assert!(invalid.as_validation().is_some());
        assert!(invalid.as_structural().is_none());
        assert_eq!(invalid.http_status_code(), 400);
    }
}
