//! Centralized shutdown management

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use super::constants::SHUTDOWN_TIMEOUT_SECS;
use crate::data::SqliteService;

/// Centralized shutdown service for coordinating graceful shutdown
#[derive(Clone)]
pub struct ShutdownService {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
    database: Arc<SqliteService>,
}

impl ShutdownService {
    pub fn new(database: Arc<SqliteService>) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
            handles: Arc::new(Mutex::new(Vec::new())),
            database,
        }
    }

    /// Register a background task handle to be awaited during shutdown
    pub async fn register(&self, handle: JoinHandle<()>) {
        self.handles.lock().await.push(handle);
    }

    /// Subscribe to shutdown signal
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }

    /// Trigger shutdown
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Check if shutdown was triggered
    #[cfg(test)]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Trigger shutdown, wait for registered tasks, then checkpoint and close the database
    pub async fn shutdown(&self) {
        tracing::debug!("Initiating graceful shutdown...");
        self.trigger();

        let handles = std::mem::take(&mut *self.handles.lock().await);
        tracing::debug!(
            count = handles.len(),
            "Waiting for background tasks to finish..."
        );

        let timeout = Duration::from_secs(SHUTDOWN_TIMEOUT_SECS);
        match tokio::time::timeout(timeout, futures::future::join_all(handles)).await {
            Ok(_) => tracing::debug!("All background tasks completed"),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    "Timeout waiting for background tasks"
                );
            }
        }

        if let Err(e) = self.database.checkpoint().await {
            tracing::warn!("SQLite checkpoint failed: {}", e);
        }
        self.database.close().await;

        tracing::debug!("Shutdown complete");
    }

    /// Wait for shutdown signal (for use with axum graceful shutdown)
    /// Returns an owned future that can be passed to graceful_shutdown
    pub fn wait(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.rx.clone();
        async move {
            let _ = rx.wait_for(|&v| v).await;
        }
    }

    /// Install OS signal handlers and auto-trigger on Ctrl+C/SIGTERM
    pub fn install_signal_handlers(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(mut signal) => {
                        signal.recv().await;
                    }
                    Err(e) => {
                        tracing::error!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::debug!("Received Ctrl+C, shutting down"),
                _ = terminate => tracing::debug!("Received SIGTERM, shutting down"),
            }

            service.trigger();
        });
    }
}
