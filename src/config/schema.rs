//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files, and
//! every section falls back to its defaults so an empty file is valid.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the file server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, port, connection limit).
    pub listener: ListenerConfig,

    /// Certificate and private key locations.
    pub tls: TlsConfig,

    /// What gets served and how directories are handled.
    pub files: FilesConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Startup banner settings.
    pub banner: BannerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// IP address to bind (e.g., "0.0.0.0").
    pub bind_address: String,

    /// TCP port, 1-65535.
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl ListenerConfig {
    /// Combine `bind_address` and `port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.bind_address.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8443,
            max_connections: 1024,
        }
    }
}

/// TLS material for the listener.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to certificate chain file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: PathBuf::from("cert.pem"),
            key_path: PathBuf::from("key.pem"),
        }
    }
}

/// Static file settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory served as `/`.
    pub document_root: PathBuf,

    /// Index documents tried, in order, when a directory is requested.
    pub index_files: Vec<String>,

    /// Generate an HTML listing for directories without an index document.
    pub directory_listing: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            document_root: PathBuf::from("."),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            directory_listing: true,
        }
    }
}

/// Timeout configuration for connections and requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// TLS handshake timeout in seconds.
    pub handshake_secs: u64,

    /// Time allowed to receive a complete request head, in seconds.
    pub header_read_secs: u64,

    /// Time allowed for a handler to produce a response, in seconds.
    pub request_secs: u64,

    /// How long open connections may drain after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            handshake_secs: 10,
            header_read_secs: 30,
            request_secs: 30,
            shutdown_grace_secs: 5,
        }
    }
}

/// Startup banner configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BannerConfig {
    /// Path appended to the printed access URLs (e.g., "/CANNON/").
    pub url_path: String,

    /// Label for the LAN access line.
    pub lan_label: String,

    /// Public address the LAN probe "connects" its UDP socket to.
    /// Nothing is ever sent to it.
    pub probe_target: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            url_path: "/".to_string(),
            lan_label: "Access from LAN".to_string(),
            probe_target: "8.8.8.8:80".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, one event per line.
    #[default]
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
