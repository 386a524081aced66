//! Error types for the uri-list codec and the address API client.
//!
//! # Design
//! Decoding is all-or-nothing, so every `CodecError` raised while reading
//! means the whole payload is rejected. `Instantiation` and `MalformedUri`
//! are the "message not readable" cases a content-negotiation layer turns
//! into a 4xx response. I/O failures from the caller's streams pass through
//! unchanged in `Io`.

use std::fmt;
use std::io;

/// Errors raised by `UriListCodec`.
#[derive(Debug)]
pub enum CodecError {
    /// The decode target could not be constructed.
    Instantiation(String),

    /// A non-blank line is not an absolute URI. `line` is 1-based.
    MalformedUri {
        line: usize,
        input: String,
        reason: String,
    },

    /// A mapping delegated to a nested mapping deeper than allowed.
    NestingTooDeep { max: usize },

    /// The underlying stream failed.
    Io(io::Error),
}

impl CodecError {
    /// True for failures that mean the request body cannot be read as a
    /// uri-list (as opposed to a transport failure).
    pub fn is_not_readable(&self) -> bool {
        matches!(
            self,
            CodecError::Instantiation(_) | CodecError::MalformedUri { .. }
        )
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Instantiation(msg) => {
                write!(f, "cannot instantiate uri-list target: {msg}")
            }
            CodecError::MalformedUri {
                line,
                input,
                reason,
            } => write!(f, "line {line}: '{input}' is not a valid URI: {reason}"),
            CodecError::NestingTooDeep { max } => {
                write!(f, "'_links' nesting exceeds {max} level(s)")
            }
            CodecError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        CodecError::Io(e)
    }
}

/// Errors returned by `AddressClient` build and parse methods.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned 404.
    NotFound,

    /// The server returned a non-2xx status other than 404.
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),

    /// A uri-list body could not be encoded or decoded.
    Codec(CodecError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::HttpError { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            ApiError::Codec(e) => write!(f, "uri-list: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(e: CodecError) -> Self {
        ApiError::Codec(e)
    }
}
