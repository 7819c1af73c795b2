//! Request dispatch.
//!
//! Every request lands in [`serve_request`]. The capability set is fixed:
//! `GET` and `HEAD` of files, index documents and directory listings, with
//! everything else mapped to an error status. New methods or routes become
//! explicit match arms in [`FileServer::respond`], not implicit dispatch.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::http::error::RequestError;
use crate::http::files::FileServer;

/// Axum handler used as the router fallback.
pub async fn serve_request(
    State(files): State<Arc<FileServer>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match files.respond(&method, &uri, &headers).await {
        Ok(response) => response,
        Err(err) => {
            log_request_error(&method, &uri, &err);
            err.into_response()
        }
    }
}

fn log_request_error(method: &Method, uri: &Uri, err: &RequestError) {
    match err {
        RequestError::Traversal(_) => {
            tracing::warn!(method = %method, path = %uri.path(), "Rejected path traversal attempt")
        }
        RequestError::Internal(e) => {
            tracing::error!(method = %method, path = %uri.path(), error = %e, "Failed to serve file")
        }
        _ => tracing::debug!(
            method = %method,
            path = %uri.path(),
            status = err.status().as_u16(),
            "Request rejected"
        ),
    }
}
