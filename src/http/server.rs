//! HTTPS server setup and the accept loop.
//!
//! # Responsibilities
//! - Build the Axum router around the static file handler
//! - Wire up middleware (tracing, request ID, timeout, headers)
//! - Accept connections, run the TLS handshake, drive HTTP/1 per connection
//! - Stop accepting on shutdown and let open connections drain

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Request};
use axum::Router;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;
use tower::ServiceExt;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Instrument;

use crate::config::TimeoutConfig;
use crate::http::files::FileServer;
use crate::http::handler::serve_request;
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::net::{ConnectionGuard, ConnectionPermit, ConnectionTracker, Listener, TlsContext};

/// Pause after a failed `accept` so descriptor exhaustion does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(files: FileServer, timeouts: &TimeoutConfig) -> Router {
    Router::new()
        .fallback(serve_request)
        .with_state(Arc::new(files))
        .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs)))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// HTTPS server for static files.
pub struct HttpServer {
    router: Router,
    tls: TlsContext,
    timeouts: TimeoutConfig,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Create a new server for `files` using the loaded TLS context.
    pub fn new(files: FileServer, tls: TlsContext, timeouts: TimeoutConfig) -> Self {
        let router = build_router(files, &timeouts);
        Self {
            router,
            tls,
            timeouts,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Accept connections until `shutdown` triggers, then drain.
    ///
    /// Per-connection failures are logged and never end the loop.
    pub async fn run(self, listener: Listener, shutdown: Shutdown) {
        let mut stop = shutdown.subscribe();
        tracing::info!(
            address = %listener.local_addr(),
            max_connections = listener.max_connections(),
            "HTTPS server accepting connections"
        );

        loop {
            tokio::select! {
                _ = stop.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => self.spawn_connection(stream, peer, permit, &shutdown),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        drop(listener);

        let open = self.tracker.active_count();
        if open > 0 {
            let grace = Duration::from_secs(self.timeouts.shutdown_grace_secs);
            tracing::info!(open_connections = open, grace_secs = grace.as_secs(), "Draining connections");
            if !self.tracker.drain(grace).await {
                tracing::warn!(
                    open_connections = self.tracker.active_count(),
                    "Grace period elapsed, closing remaining connections"
                );
            }
        }
        tracing::info!("HTTPS server stopped");
    }

    fn spawn_connection(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        permit: ConnectionPermit,
        shutdown: &Shutdown,
    ) {
        let guard = self.tracker.track();
        let stop = shutdown.subscribe();
        let span = tracing::debug_span!("connection", id = %guard.id(), peer = %peer);
        let connection = Connection {
            router: self.router.clone(),
            tls: self.tls.clone(),
            timeouts: self.timeouts.clone(),
            stop,
            _guard: guard,
            _permit: permit,
        };
        tokio::spawn(connection.serve(stream).instrument(span));
    }
}

/// Everything one connection task owns.
struct Connection {
    router: Router,
    tls: TlsContext,
    timeouts: TimeoutConfig,
    stop: ShutdownSignal,
    _guard: ConnectionGuard,
    _permit: ConnectionPermit,
}

impl Connection {
    async fn serve(mut self, stream: TcpStream) {
        let handshake = Duration::from_secs(self.timeouts.handshake_secs);
        let tls_stream = match tokio::time::timeout(handshake, self.tls.acceptor().accept(stream)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "TLS handshake failed");
                return;
            }
            Err(_) => {
                tracing::debug!(timeout_secs = handshake.as_secs(), "TLS handshake timed out");
                return;
            }
        };

        let router = self.router;
        let service = hyper::service::service_fn(move |request: Request<Incoming>| {
            router.clone().oneshot(request)
        });

        let connection = http1::Builder::new()
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(self.timeouts.header_read_secs))
            .serve_connection(TokioIo::new(tls_stream), service);
        tokio::pin!(connection);

        let mut draining = false;
        let result = loop {
            tokio::select! {
                result = connection.as_mut() => break result,
                _ = self.stop.recv(), if !draining => {
                    draining = true;
                    connection.as_mut().graceful_shutdown();
                }
            }
        };

        if let Err(e) = result {
            tracing::debug!(error = %e, "Connection ended with error");
        }
    }
}
