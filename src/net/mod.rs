//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → tls.rs (TLS handshake with the loaded certificate)
//!     → connection.rs (lifecycle tracking for shutdown)
//!     → Hand off to HTTP layer
//!
//! probe.rs runs once at startup to find the LAN address for the banner.
//! ```

pub mod connection;
pub mod listener;
pub mod probe;
pub mod tls;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{BindError, ConnectionPermit, Listener};
pub use probe::{lan_ip_or_loopback, probe_lan_ip, ProbeError};
pub use tls::{CertificateLoadError, TlsContext};
