//! Periodic eviction of expired push-gateway metrics.
//!
//! Spawns a task that deletes metrics whose `expires_at` has passed, on a
//! fixed interval driven by `tokio::time::interval`.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use vigil_db::repositories::PushgatewayRepo;
use vigil_db::DbPool;

/// Upper bound on a single sweep.
const SWEEP_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle on a running cleanup task.
pub struct CleanupHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl CleanupHandle {
    /// Signal the loop to stop and wait until it has exited.
    ///
    /// A sweep already in progress runs to completion first.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "Pushgateway cleanup task failed");
        }
    }
}

/// Start the cleanup loop on the current runtime.
pub fn spawn(pool: DbPool, every: Duration) -> CleanupHandle {
    let cancel = CancellationToken::new();
    let join = tokio::spawn(run(pool, every, cancel.clone()));
    CleanupHandle { cancel, join }
}

/// Ticker for the sweep loop. A sweep that overruns pushes the next tick
/// back instead of firing the missed ones back to back.
fn sweep_interval(every: Duration) -> Interval {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Run the cleanup loop until `cancel` is triggered.
pub async fn run(pool: DbPool, every: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = every.as_secs(),
        "Pushgateway cleanup job started"
    );

    let mut interval = sweep_interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Pushgateway cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match tokio::time::timeout(SWEEP_TIMEOUT, PushgatewayRepo::clean_expired(&pool)).await {
                    Ok(Ok(deleted)) if deleted > 0 => {
                        tracing::info!(deleted, "Pushgateway cleanup: removed expired metrics");
                    }
                    Ok(Ok(_)) => {
                        tracing::debug!("Pushgateway cleanup: nothing expired");
                    }
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "Pushgateway cleanup failed");
                    }
                    Err(_) => {
                        tracing::error!(
                            timeout_secs = SWEEP_TIMEOUT.as_secs(),
                            "Pushgateway cleanup timed out"
                        );
                    }
                }
            }
        }
    }
}
