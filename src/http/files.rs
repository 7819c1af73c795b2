//! Static file serving beneath a document root.

use std::path::{Path, PathBuf};

use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;

use crate::config::FilesConfig;
use crate::http::error::RequestError;
use crate::http::listing::{read_entries, render_listing};
use crate::http::resolve::{ensure_within_root, resolve_request_path};
use crate::http::response::{file_response, html_response, moved_permanently};

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct FileServer {
    root: PathBuf,
    index_files: Vec<String>,
    directory_listing: bool,
}

impl FileServer {
    /// Serve `config.document_root`, resolved to an absolute canonical path.
    pub async fn new(config: &FilesConfig) -> std::io::Result<Self> {
        let root = tokio::fs::canonicalize(&config.document_root).await?;
        if !tokio::fs::metadata(&root).await?.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        tracing::info!(root = %root.display(), "Serving files");

        Ok(Self {
            root,
            index_files: config.index_files.clone(),
            directory_listing: config.directory_listing,
        })
    }

    /// Canonical document root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Answer a `GET` or `HEAD` for `uri`.
    pub async fn respond(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> Result<Response, RequestError> {
        if *method != Method::GET && *method != Method::HEAD {
            return Err(RequestError::MethodNotAllowed(method.clone()));
        }

        let url_path = uri.path();
        let candidate = resolve_request_path(&self.root, url_path)?;
        let path = ensure_within_root(&self.root, &candidate, url_path).await?;
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| RequestError::from_lookup(url_path, e))?;

        if meta.is_dir() {
            return self.respond_directory(method, uri, headers, &path).await;
        }
        if meta.is_file() {
            return file_response(method, headers, &path, &meta).await;
        }
        Err(RequestError::NotFound(url_path.to_string()))
    }

    async fn respond_directory(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        dir: &Path,
    ) -> Result<Response, RequestError> {
        let url_path = uri.path();
        if !url_path.ends_with('/') {
            // A leading `//` would make the Location scheme-relative, i.e. another host.
            let path = url_path.trim_start_matches('/');
            let location = match uri.query() {
                Some(query) => format!("/{path}/?{query}"),
                None => format!("/{path}/"),
            };
            return Ok(moved_permanently(&location));
        }

        for name in &self.index_files {
            let index = dir.join(name);
            if let Ok(meta) = tokio::fs::metadata(&index).await {
                if meta.is_file() {
                    let index = ensure_within_root(&self.root, &index, url_path).await?;
                    return file_response(method, headers, &index, &meta).await;
                }
            }
        }

        if !self.directory_listing {
            return Err(RequestError::NotFound(url_path.to_string()));
        }

        let entries = read_entries(dir)
            .await
            .map_err(|e| RequestError::from_lookup(url_path, e))?;
        let display_path = percent_encoding::percent_decode_str(url_path).decode_utf8_lossy();
        Ok(html_response(method, render_listing(&display_path, &entries)))
    }
}
