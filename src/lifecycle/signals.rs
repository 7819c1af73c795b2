//! OS signal handling.
//!
//! Ctrl+C (SIGINT) and, on Unix, SIGTERM both mean "stop serving". There is
//! no reload signal; configuration is read once.

use crate::lifecycle::Shutdown;

/// Termination signal handlers.
///
/// On Unix the handlers are registered with the OS when [`install`] returns,
/// so a signal arriving before the first [`recv`] is not lost.
///
/// [`install`]: TerminationSignals::install
/// [`recv`]: TerminationSignals::recv
pub struct TerminationSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    /// Register the handlers. Must be called inside a Tokio runtime.
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Register the handlers. Must be called inside a Tokio runtime.
    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Resolve on the next termination signal.
    #[cfg(unix)]
    pub async fn recv(&mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => tracing::info!("Received SIGINT"),
            _ = self.terminate.recv() => tracing::info!("Received SIGTERM"),
        }
    }

    /// Resolve on the next termination signal.
    #[cfg(not(unix))]
    pub async fn recv(&mut self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Install signal handlers now and spawn a task that triggers `shutdown` on
/// the first termination signal.
pub fn spawn_signal_listener(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    let installed = TerminationSignals::install();
    tokio::spawn(async move {
        match installed {
            Ok(mut signals) => {
                signals.recv().await;
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to install signal handlers"),
        }
    })
}
