//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS connection
//!     → server.rs (hyper HTTP/1 connection, Axum router, middleware)
//!     → handler.rs (single dispatch point)
//!     → files.rs (method check, directory vs file)
//!         → resolve.rs (URL path → path under the document root)
//!         → listing.rs (generated directory index)
//!     → response.rs (file bodies, redirects, error pages)
//!     → Send to client
//! ```

pub mod error;
pub mod files;
pub mod handler;
pub mod listing;
pub mod resolve;
pub mod response;
pub mod server;

pub use error::RequestError;
pub use files::FileServer;
pub use server::{build_router, HttpServer};
