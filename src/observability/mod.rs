//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → tower-http TraceLayer request spans (debug level)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, pretty or JSON)
//! ```

pub mod logging;
