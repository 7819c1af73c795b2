//! Configuration validation.
//!
//! Serde handles the syntax; this pass checks value ranges and filesystem
//! preconditions. All problems are collected and reported together.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a [`ServerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("port must be between 1 and 65535")]
    Port,

    #[error("max_connections must be greater than zero")]
    MaxConnections,

    #[error("document root {} does not exist", .0.display())]
    DocumentRootMissing(PathBuf),

    #[error("document root {} is not a directory", .0.display())]
    DocumentRootNotDirectory(PathBuf),

    #[error("index file name {0:?} must be a plain file name")]
    IndexFile(String),

    #[error("timeout {0} must be greater than zero")]
    Timeout(&'static str),

    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::Port);
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::MaxConnections);
    }

    let root = &config.files.document_root;
    match std::fs::metadata(root) {
        Ok(meta) if !meta.is_dir() => {
            errors.push(ValidationError::DocumentRootNotDirectory(root.clone()))
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::DocumentRootMissing(root.clone())),
    }

    for name in &config.files.index_files {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            errors.push(ValidationError::IndexFile(name.clone()));
        }
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("handshake_secs", timeouts.handshake_secs),
        ("header_read_secs", timeouts.header_read_secs),
        ("request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::Timeout(name));
        }
    }

    if config
        .observability
        .log_level
        .parse::<tracing::Level>()
        .is_err()
    {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
