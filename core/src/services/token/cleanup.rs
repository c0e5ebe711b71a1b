//! Background sweeping of expired revocation entries
//!
//! The scheduler owns one Tokio task for the lifetime of the service. Each
//! tick runs `RevocationRegistry::sweep` in its own child task so that a
//! panicking sweep is observed as a `JoinError` and logged instead of taking
//! the loop down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::{DomainError, DomainResult};
use crate::repositories::RevocationRegistry;

/// Periodic sweep worker with a one-shot stop signal
pub struct CleanupScheduler {
    cancel: CancellationToken,
    stopped: AtomicBool,
    handle: JoinHandle<()>,
}

impl CleanupScheduler {
    /// Spawns the sweep loop on the current Tokio runtime
    ///
    /// The first sweep runs one `interval` after start.
    ///
    /// # Returns
    ///
    /// * `Ok(CleanupScheduler)` - The worker is running
    /// * `Err(DomainError::Configuration)` - Called outside a Tokio runtime
    pub fn start(registry: Arc<dyn RevocationRegistry>, interval: Duration) -> DomainResult<Self> {
        let runtime = Handle::try_current().map_err(|e| DomainError::Configuration {
            message: format!("revocation cleanup needs a running Tokio runtime: {}", e),
        })?;

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run(registry, interval, cancel.clone()));

        Ok(Self {
            cancel,
            stopped: AtomicBool::new(false),
            handle,
        })
    }

    /// Signals the worker to stop
    ///
    /// Only the first call has any effect. A sweep already in progress runs
    /// to completion.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Whether the worker task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CleanupScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(registry: Arc<dyn RevocationRegistry>, interval: Duration, cancel: CancellationToken) {
    info!(?interval, "Revocation cleanup started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => sweep_once(&registry).await,
        }
    }

    info!("Revocation cleanup stopped");
}

async fn sweep_once(registry: &Arc<dyn RevocationRegistry>) {
    let registry = Arc::clone(registry);
    match tokio::spawn(async move { registry.sweep().await }).await {
        Ok(Ok(0)) => {}
        Ok(Ok(removed)) => debug!(removed, "Swept expired revocation entries"),
        Ok(Err(e)) => warn!(error = %e, "Revocation sweep failed"),
        Err(e) if e.is_panic() => error!("Revocation sweep panicked; cleanup continues"),
        Err(e) => warn!(error = %e, "Revocation sweep was cancelled"),
    }
}
