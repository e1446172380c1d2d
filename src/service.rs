//! Service manager and graceful shutdown (spec.md §5: every long-running
//! task must be cancellable). `Xevion-Banner`'s `app.rs` references a
//! `crate::services::manager::ServiceManager` and
//! `crate::services::signals::handle_shutdown_signals` that weren't present
//! in the retrieved pack; this module is rebuilt directly from the shape
//! `app.rs` implies: named background tasks, a broadcast shutdown signal,
//! and a bounded grace period before abandoning stragglers.

use std::time::Duration;

use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{info, warn};

/// A long-running task that runs until `shutdown_rx` fires.
#[async_trait::async_trait]
pub trait Service: Send {
    async fn run(self: Box<Self>, shutdown_rx: broadcast::Receiver<()>);
}

pub struct ServiceManager {
    shutdown_tx: broadcast::Sender<()>,
    handles: Vec<(String, JoinHandle<()>)>,
    services: Vec<(String, Box<dyn Service>)>,
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceManager {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            shutdown_tx,
            handles: Vec::new(),
            services: Vec::new(),
        }
    }

    pub fn register_service(&mut self, name: &str, service: Box<dyn Service>) {
        self.services.push((name.to_owned(), service));
    }

    pub fn has_services(&self) -> bool {
        !self.services.is_empty()
    }

    /// Spawn every registered service as its own task.
    pub fn spawn_all(&mut self) {
        for (name, service) in self.services.drain(..) {
            let shutdown_rx = self.shutdown_tx.subscribe();
            info!(service = %name, "starting service");
            let handle = tokio::spawn(service.run(shutdown_rx));
            self.handles.push((name, handle));
        }
    }

    /// Block until SIGINT/SIGTERM, then broadcast shutdown and wait up to
    /// `grace_period` for every service to finish before abandoning them.
    pub async fn run_until_shutdown(self, grace_period: Duration) {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received, stopping services");
        let _ = self.shutdown_tx.send(());

        let joined = time::timeout(grace_period, futures_join_all(self.handles)).await;
        if joined.is_err() {
            warn!(grace_period = ?grace_period, "not all services stopped in time, abandoning stragglers");
        }
    }
}

async fn futures_join_all(handles: Vec<(String, JoinHandle<()>)>) {
    for (name, handle) in handles {
        if let Err(e) = handle.await {
            warn!(service = %name, error = %e, "service task panicked");
        }
    }
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
