//! Static HTTPS file server for the local network.
//!
//! Serves a directory over TLS with a locally supplied certificate and
//! prints the LAN URL other devices (a headset browser, a phone) can open.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, StartupError};
