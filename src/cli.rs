//! Command-line interface.
//!
//! Every flag is optional and can also be set through the environment; unset
//! flags leave the config file (or built-in default) value untouched.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{read_config, validate_config, ConfigError, LogFormat, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "lan-https-serve")]
#[command(version, about = "Serve a directory over HTTPS on the local network", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "LAN_SERVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// IP address to bind
    #[arg(long, env = "LAN_SERVE_BIND")]
    pub bind: Option<String>,

    /// TCP port to listen on
    #[arg(short, long, env = "LAN_SERVE_PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Directory to serve
    #[arg(short, long, env = "LAN_SERVE_ROOT")]
    pub root: Option<PathBuf>,

    /// PEM certificate chain
    #[arg(long, env = "LAN_SERVE_CERT")]
    pub cert: Option<PathBuf>,

    /// PEM private key
    #[arg(long, env = "LAN_SERVE_KEY")]
    pub key: Option<PathBuf>,

    /// Path appended to the URLs printed at startup
    #[arg(long, env = "LAN_SERVE_URL_PATH")]
    pub url_path: Option<String>,

    /// Label for the LAN URL line of the banner
    #[arg(long, env = "LAN_SERVE_LAN_LABEL")]
    pub lan_label: Option<String>,

    /// Do not generate listings for directories without an index document
    #[arg(long, env = "LAN_SERVE_NO_LISTING")]
    pub no_listing: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LAN_SERVE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, env = "LAN_SERVE_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Merge defaults, the optional config file and these flags, then validate.
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(self, config: &mut ServerConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(root) = self.root {
            config.files.document_root = root;
        }
        if let Some(cert) = self.cert {
            config.tls.cert_path = cert;
        }
        if let Some(key) = self.key {
            config.tls.key_path = key;
        }
        if let Some(url_path) = self.url_path {
            config.banner.url_path = url_path;
        }
        if let Some(lan_label) = self.lan_label {
            config.banner.lan_label = lan_label;
        }
        if self.no_listing {
            config.files.directory_listing = false;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}
