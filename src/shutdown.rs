//! Cooperative shutdown signalling.
//!
//! A cloneable handle shared by the server, the scheduler, and in-flight
//! scrapes. Once a stop is requested it stays requested; a restart request
//! is a stop plus a flag the process exit code reports to the supervisor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

struct Inner {
    stopping: watch::Sender<bool>,
    restart: AtomicBool,
}

/// Shared stop handle
#[derive(Clone)]
pub struct Shutdown(Arc<Inner>);

impl Shutdown {
    pub fn new() -> Self {
        let (stopping, _) = watch::channel(false);
        Self(Arc::new(Inner {
            stopping,
            restart: AtomicBool::new(false),
        }))
    }

    /// Request a stop. Idempotent.
    pub fn request_stop(&self) {
        self.0.stopping.send_replace(true);
    }

    /// Request a stop that the supervisor should answer by starting a
    /// fresh process.
    pub fn request_restart(&self) {
        self.0.restart.store(true, Ordering::SeqCst);
        self.request_stop();
    }

    pub fn is_stopping(&self) -> bool {
        *self.0.stopping.borrow()
    }

    pub fn restart_requested(&self) -> bool {
        self.0.restart.load(Ordering::SeqCst)
    }

    /// Wait until a stop has been requested. Resolves immediately if one
    /// already has.
    pub async fn wait(&self) {
        let mut rx = self.0.stopping.subscribe();
        // The sender lives as long as this handle, so wait_for cannot fail
        let _ = rx.wait_for(|stopping| *stopping).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Flip the shutdown handle when the process receives a termination signal.
pub fn listen_for_signals(shutdown: Shutdown) {
    #[cfg(unix)]
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to set up SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to set up SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
        }
        shutdown.request_stop();
    });

    #[cfg(windows)]
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C, shutting down...");
        shutdown.request_stop();
    });
}
