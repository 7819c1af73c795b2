//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the document root
//! - Load the TLS certificate, then bind the listener
//! - Probe the LAN address and build the banner
//!
//! # Design Decisions
//! - Fail fast: any error before the serve loop is fatal
//! - Certificates load before the bind so a bad certificate never opens the port
//! - The LAN probe can only degrade the banner, never fail startup

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::config::{BannerConfig, ServerConfig};
use crate::http::{FileServer, HttpServer};
use crate::lifecycle::{signals, Shutdown};
use crate::net::{lan_ip_or_loopback, BindError, CertificateLoadError, Listener, TlsContext};

/// Fatal errors before the serve loop starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("document root {}: {source}", .path.display())]
    DocumentRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Certificate(#[from] CertificateLoadError),

    #[error(transparent)]
    Bind(#[from] BindError),
}

impl StartupError {
    /// Extra operator guidance printed under the error, if any.
    pub fn hint(&self, config: &ServerConfig) -> Option<String> {
        match self {
            Self::Certificate(e) if e.is_not_found() => Some(format!(
                "Make sure {} and {} exist relative to the working directory, \
                 or point --cert/--key at them",
                config.tls.cert_path.display(),
                config.tls.key_path.display()
            )),
            Self::Bind(_) => Some(format!(
                "Is another server already using port {}?",
                config.listener.port
            )),
            _ => None,
        }
    }
}

/// Startup banner printed to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    bind: SocketAddr,
    lan_ip: IpAddr,
    url_path: String,
    lan_label: String,
}

impl Banner {
    pub fn new(bind: SocketAddr, lan_ip: IpAddr, config: &BannerConfig) -> Self {
        let url_path = if config.url_path.starts_with('/') {
            config.url_path.clone()
        } else {
            format!("/{}", config.url_path)
        };
        Self {
            bind,
            lan_ip,
            url_path,
            lan_label: config.lan_label.clone(),
        }
    }

    pub fn lan_ip(&self) -> IpAddr {
        self.lan_ip
    }

    pub fn bind_url(&self) -> String {
        format!("https://{}", self.bind)
    }

    pub fn local_url(&self) -> String {
        format!("https://localhost:{}{}", self.bind.port(), self.url_path)
    }

    pub fn lan_url(&self) -> String {
        format!(
            "https://{}{}",
            SocketAddr::new(self.lan_ip, self.bind.port()),
            self.url_path
        )
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Server running on {}", self.bind_url())?;
        writeln!(f, "Access from this computer: {}", self.local_url())?;
        writeln!(f, "{}: {}", self.lan_label, self.lan_url())?;
        write!(f, "Press Ctrl+C to stop")
    }
}

/// A server that has passed every startup check and is ready to serve.
pub struct Prepared {
    pub server: HttpServer,
    pub listener: Listener,
    pub banner: Banner,
}

/// Run the startup sequence up to, but not including, the serve loop.
pub async fn prepare(config: &ServerConfig) -> Result<Prepared, StartupError> {
    let files = FileServer::new(&config.files)
        .await
        .map_err(|source| StartupError::DocumentRoot {
            path: config.files.document_root.clone(),
            source,
        })?;

    let tls = TlsContext::load(&config.tls.cert_path, &config.tls.key_path).await?;
    let listener = Listener::bind(&config.listener).await?;
    let bound = listener.local_addr();

    let lan_ip = lan_ip_or_loopback(&config.banner.probe_target).await;
    tracing::info!(lan_ip = %lan_ip, "LAN address resolved");

    Ok(Prepared {
        server: HttpServer::new(files, tls, config.timeouts.clone()),
        listener,
        banner: Banner::new(bound, lan_ip, &config.banner),
    })
}

/// Start the server and block until a termination signal has been handled.
pub async fn run(config: &ServerConfig) -> Result<(), StartupError> {
    let Prepared {
        server,
        listener,
        banner,
    } = prepare(config).await?;

    // Handlers go in before the banner so a signal sent on seeing it is handled.
    let shutdown = Shutdown::new();
    let signal_task = signals::spawn_signal_listener(shutdown.clone());

    println!("{banner}");
    server.run(listener, shutdown).await;
    signal_task.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
