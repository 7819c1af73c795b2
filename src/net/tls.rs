//! TLS configuration and certificate loading.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::ServerConfig;
use thiserror::Error;
use tokio_rustls::TlsAcceptor;

/// Failure to build the [`TlsContext`]. Always fatal at startup.
#[derive(Debug, Error)]
pub enum CertificateLoadError {
    /// The certificate or key file does not exist.
    #[error("certificate files not found: {} is missing", .path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid certificate or private key: {reason}")]
    Parse { reason: String },
}

impl CertificateLoadError {
    /// True when a certificate or key file was simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }
}

/// Loaded certificate chain and private key.
///
/// Immutable after construction and cheap to clone; every connection task
/// shares the same inner `rustls::ServerConfig`.
#[derive(Clone)]
pub struct TlsContext {
    config: Arc<ServerConfig>,
}

impl std::fmt::Debug for TlsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsContext")
            .field("alpn_protocols", &self.config.alpn_protocols)
            .finish_non_exhaustive()
    }
}

impl TlsContext {
    /// Load a PEM certificate chain and private key from disk.
    pub async fn load(cert_path: &Path, key_path: &Path) -> Result<Self, CertificateLoadError> {
        let cert_pem = read_pem(cert_path).await?;
        let key_pem = read_pem(key_path).await?;

        let context = Self::from_pem(&cert_pem, &key_pem)?;
        tracing::info!(
            cert = %cert_path.display(),
            key = %key_path.display(),
            "TLS certificate loaded"
        );
        Ok(context)
    }

    /// Build a context from PEM-encoded certificate chain and key bytes.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self, CertificateLoadError> {
        let certs = rustls_pemfile::certs(&mut std::io::BufReader::new(cert_pem))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CertificateLoadError::parse(format!("certificate chain: {e}")))?;
        if certs.is_empty() {
            return Err(CertificateLoadError::parse("no certificate found in PEM data"));
        }

        let key = rustls_pemfile::private_key(&mut std::io::BufReader::new(key_pem))
            .map_err(|e| CertificateLoadError::parse(format!("private key: {e}")))?
            .ok_or_else(|| CertificateLoadError::parse("no private key found in PEM data"))?;

        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let mut config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| CertificateLoadError::parse(e.to_string()))?
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| CertificateLoadError::parse(e.to_string()))?;
        config.alpn_protocols = vec![b"http/1.1".to_vec()];

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Acceptor performing the server side of the handshake.
    pub fn acceptor(&self) -> TlsAcceptor {
        TlsAcceptor::from(Arc::clone(&self.config))
    }
}

async fn read_pem(path: &Path) -> Result<Vec<u8>, CertificateLoadError> {
    tokio::fs::read(path).await.map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            CertificateLoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            CertificateLoadError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
