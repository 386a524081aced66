//! Failures a handler reports to the client.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use urilist_core::CodecError;

#[derive(Debug)]
pub enum AppError {
    NotFound,

    /// Request body is not `text/uri-list`.
    UnsupportedMediaType(String),

    /// The uri-list body could not be decoded.
    NotReadable(CodecError),

    /// A link does not point at a known address.
    UnknownAddress(String),

    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::NotReadable(_) | AppError::UnknownAddress(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound => write!(f, "not found"),
            AppError::UnsupportedMediaType(found) => {
                write!(f, "expected text/uri-list, got '{found}'")
            }
            AppError::NotReadable(e) => write!(f, "unreadable uri-list: {e}"),
            AppError::UnknownAddress(href) => write!(f, "no address at {href}"),
            AppError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
