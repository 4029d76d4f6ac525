//! Scheduler Loop: cycle, sleep, repeat

use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info};

use super::client::UpdateClient;
use crate::error::Result;

/// Drives [`UpdateClient`] cycles at a fixed interval
///
/// No jitter, no backoff. A cycle always runs to completion; shutdown is
/// only observed while sleeping.
pub struct Scheduler {
    client: UpdateClient,
    interval: Duration,
}

impl Scheduler {
    pub fn new(client: UpdateClient, interval: Duration) -> Self {
        Self { client, interval }
    }

    pub fn client(&self) -> &UpdateClient {
        &self.client
    }

    /// Run until SIGINT/SIGTERM or a fatal error
    ///
    /// The signal handlers are installed before the first cycle, so a signal
    /// that arrives mid-cycle is held until the cycle has completed.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: Fatal error from a cycle (see [`crate::Error::is_fatal`])
    pub async fn run(&mut self) -> Result<()> {
        match ShutdownSignals::install() {
            Ok(signals) => self.run_until(signals.recv()).await,
            Err(e) => {
                error!("Failed to install signal handlers: {}", e);
                self.run_until(std::future::pending()).await
            }
        }
    }

    /// Run until `shutdown` resolves or a fatal error occurs
    ///
    /// This is what [`Scheduler::run`] uses with OS signals; tests pass a
    /// oneshot receiver or a pending future instead.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Scheduler started (interval: {:?})", self.interval);

        loop {
            match self.client.cycle().await {
                Ok(outcome) => debug!("Cycle finished: {:?}", outcome),
                Err(e) if e.is_fatal() => {
                    error!("Fatal error, stopping scheduler: {}", e);
                    return Err(e);
                }
                Err(e) => error!("Cycle failed: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    info!("Shutdown signal received, scheduler stopped");
                    return Ok(());
                }
            }
        }
    }
}

/// Registered SIGTERM and SIGINT listeners
#[cfg(unix)]
struct ShutdownSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    /// Register both listeners now; deliveries from here on are buffered
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    async fn recv(mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => info!("Received SIGTERM"),
            _ = self.sigint.recv() => info!("Received SIGINT"),
        }
    }
}

/// CTRL-C listener
#[cfg(not(unix))]
struct ShutdownSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(mut self) {
        match self.ctrl_c.recv().await {
            Some(()) => info!("Received CTRL-C"),
            None => std::future::pending::<()>().await,
        }
    }
}
