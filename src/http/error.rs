//! Per-request failures and their HTTP mapping.

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::error_page;

/// Everything that can go wrong while answering one request.
///
/// These never leave the handler; each one becomes an HTTP response.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed request path: {0}")]
    BadRequest(String),

    #[error("path escapes the document root: {0}")]
    Traversal(String),

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),

    #[error("internal error: {0}")]
    Internal(#[from] std::io::Error),
}

impl RequestError {
    /// The status code sent for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Traversal(_) | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a filesystem lookup failure for `path`.
    pub fn from_lookup(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::Forbidden(path.to_string()),
            _ => Self::NotFound(path.to_string()),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            )],
            error_page(status),
        )
            .into_response();

        if let Self::MethodNotAllowed(_) = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn status_codes() {
        assert_eq!(
            RequestError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::Traversal("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RequestError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RequestError::MethodNotAllowed(Method::POST).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            RequestError::Internal(Error::other("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn lookup_errors() {
        let denied = RequestError::from_lookup("/a", Error::from(ErrorKind::PermissionDenied));
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        let missing = RequestError::from_lookup("/a", Error::from(ErrorKind::NotFound));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn method_not_allowed_sets_allow() {
        let response = RequestError::MethodNotAllowed(Method::DELETE).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, HEAD");
    }
}
