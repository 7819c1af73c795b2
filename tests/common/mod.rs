//! Shared fixtures for integration tests.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use lan_https_serve::config::{FilesConfig, ServerConfig, TimeoutConfig};
use lan_https_serve::http::{build_router, FileServer};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use tempfile::TempDir;

pub const INDEX_HTML: &str = "<h1>hello from the headset</h1>";
pub const SECRET: &str = "outside the document root";

/// A scratch tree:
///
/// ```text
/// <tmp>/outside.txt          (must never be served)
/// <tmp>/site/index.html
/// <tmp>/site/CANNON/js/main.js
/// <tmp>/site/assets/         (no index, gets a listing)
/// ```
pub struct Site {
    pub dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("outside.txt"), SECRET).unwrap();

        let root = dir.path().join("site");
        std::fs::create_dir_all(root.join("CANNON").join("js")).unwrap();
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::write(root.join("index.html"), INDEX_HTML).unwrap();
        std::fs::write(root.join("CANNON").join("js").join("main.js"), "console.log('cannon');").unwrap();
        std::fs::write(root.join("assets").join("model.glb"), [0x67u8, 0x6c, 0x54, 0x46, 0, 1, 2, 255]).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("site")
    }

    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root().join(relative);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn files_config(&self) -> FilesConfig {
        FilesConfig {
            document_root: self.root(),
            ..Default::default()
        }
    }

    pub async fn router(&self) -> Router {
        let files = FileServer::new(&self.files_config()).await.unwrap();
        build_router(files, &TimeoutConfig::default())
    }
}

/// Write a self-signed certificate for `localhost` / `127.0.0.1` into `dir`.
pub fn write_self_signed(dir: &Path) -> (PathBuf, PathBuf) {
    let key = rcgen::KeyPair::generate().unwrap();
    let cert = rcgen::CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()])
        .unwrap()
        .self_signed(&key)
        .unwrap();

    let cert_path = dir.join("cert.pem");
    let key_path = dir.join("key.pem");
    std::fs::write(&cert_path, cert.pem()).unwrap();
    std::fs::write(&key_path, key.serialize_pem()).unwrap();
    (cert_path, key_path)
}

/// Config for a loopback server on `port` with certificates from `tls_dir`.
#[allow(dead_code)]
pub fn loopback_config(site: &Site, tls_dir: &Path, port: u16) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1".into();
    config.listener.port = port;
    config.files = site.files_config();
    config.tls.cert_path = tls_dir.join("cert.pem");
    config.tls.key_path = tls_dir.join("key.pem");
    config
}

/// HTTPS client that trusts the self-signed test certificate.
#[allow(dead_code)]
pub fn https_client(addr: SocketAddr) -> reqwest::Client {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .resolve("localhost", addr)
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// Raw TLS client for tests that need to put arbitrary bytes on the wire.
#[allow(dead_code)]
pub fn tls_connector() -> tokio_rustls::TlsConnector {
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let config = rustls::ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .unwrap()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert(provider)))
        .with_no_client_auth();
    tokio_rustls::TlsConnector::from(Arc::new(config))
}

/// Skips chain validation but still checks handshake signatures.
#[derive(Debug)]
struct AcceptAnyServerCert(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
