//! Response construction for files, redirects and error pages.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use crate::http::error::RequestError;

/// Minimal HTML body for an error status.
pub fn error_page(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{code} {reason}</title>\n</head>\n<body>\n<h1>{code} {reason}</h1>\n\
         </body>\n</html>\n",
        code = status.as_u16(),
    )
}

/// Respond with the file at `path`, whose metadata is `meta`.
///
/// `HEAD` gets the same headers with an empty body. A fresh
/// `If-Modified-Since` short-circuits to `304 Not Modified`.
pub async fn file_response(
    method: &Method,
    headers: &HeaderMap,
    path: &Path,
    meta: &std::fs::Metadata,
) -> Result<Response, RequestError> {
    let modified = meta.modified().ok();

    if let Some(modified) = modified {
        if not_modified_since(headers, modified) {
            let mut response = StatusCode::NOT_MODIFIED.into_response();
            set_last_modified(response.headers_mut(), modified);
            return Ok(response);
        }
    }

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let body = if *method == Method::HEAD {
        Body::empty()
    } else {
        let file = tokio::fs::File::open(path).await?;
        Body::from_stream(ReaderStream::new(file))
    };

    let mut response = Response::new(body);
    let response_headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        response_headers.insert(header::CONTENT_TYPE, value);
    }
    response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.len()));
    if let Some(modified) = modified {
        set_last_modified(response_headers, modified);
    }
    Ok(response)
}

/// Respond with an in-memory HTML document.
pub fn html_response(method: &Method, html: String) -> Response {
    let length = html.len();
    let body = if *method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(html)
    };
    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    response
}

/// `301` to `location`.
pub fn moved_permanently(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response(),
        Err(_) => RequestError::BadRequest(location.to_string()).into_response(),
    }
}

fn set_last_modified(headers: &mut HeaderMap, modified: SystemTime) {
    if let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(modified)) {
        headers.insert(header::LAST_MODIFIED, value);
    }
}

fn not_modified_since(headers: &HeaderMap, modified: SystemTime) -> bool {
    let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok())
    else {
        return false;
    };

    // HTTP dates have whole-second precision.
    match (unix_secs(modified), unix_secs(since)) {
        (Some(modified), Some(since)) => modified <= since,
        _ => false,
    }
}

fn unix_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
