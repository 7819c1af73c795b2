//! URL path to filesystem path mapping.
//!
//! The request path is decoded and normalized lexically before touching the
//! filesystem. `..` may only climb back out of segments the same request
//! descended into; anything that would go above the document root is a
//! traversal attempt.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::http::error::RequestError;

/// Map `url_path` onto `root`.
///
/// The result is lexically inside `root`; symlinks are checked separately
/// once the target is known to exist (see [`ensure_within_root`]).
pub fn resolve_request_path(root: &Path, url_path: &str) -> Result<PathBuf, RequestError> {
    if !url_path.starts_with('/') {
        return Err(RequestError::BadRequest(url_path.to_string()));
    }

    let decoded = percent_decode_str(url_path)
        .decode_utf8()
        .map_err(|_| RequestError::BadRequest(url_path.to_string()))?;
    if decoded.contains(['\0', '\\']) {
        return Err(RequestError::BadRequest(url_path.to_string()));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(RequestError::Traversal(url_path.to_string()));
                }
            }
            _ => {
                // Reject anything the platform would read as more than one
                // plain name, e.g. a drive prefix.
                let mut components = Path::new(segment).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => segments.push(segment),
                    _ => return Err(RequestError::Traversal(url_path.to_string())),
                }
            }
        }
    }

    let mut path = root.to_path_buf();
    path.extend(segments);
    Ok(path)
}

/// Canonicalize an existing `path` and confirm it is still under `root`.
///
/// `root` must already be canonical.
pub async fn ensure_within_root(
    root: &Path,
    path: &Path,
    url_path: &str,
) -> Result<PathBuf, RequestError> {
    let canonical = tokio::fs::canonicalize(path)
        .await
        .map_err(|e| RequestError::from_lookup(url_path, e))?;
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        Err(RequestError::Traversal(url_path.to_string()))
    }
}
