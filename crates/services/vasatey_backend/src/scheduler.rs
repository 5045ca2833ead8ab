// --- File: crates/services/vasatey_backend/src/scheduler.rs ---
//! In-process retention schedule.
//!
//! Runs the cleanup job on a fixed interval until the cancellation token
//! fires. The first run happens one full period after start-up.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use vasatey_alerts::cleanup::CleanupJob;

/// Spawn the cleanup loop, or return `None` when no interval is configured.
pub fn spawn_cleanup_schedule(
    job: Arc<CleanupJob>,
    days_old: u32,
    interval_hours: Option<u64>,
    cancel: CancellationToken,
) -> Option<JoinHandle<()>> {
    let hours = interval_hours.filter(|h| *h > 0)?;
    let period = Duration::from_secs(hours * 3600);
    Some(tokio::spawn(run(job, days_old, period, cancel)))
}

/// Run the cleanup loop until `cancel` is triggered.
pub async fn run(job: Arc<CleanupJob>, days_old: u32, period: Duration, cancel: CancellationToken) {
    tracing::info!(
        days_old,
        interval_secs = period.as_secs(),
        "Alert retention schedule started"
    );

    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Alert retention schedule stopping");
                break;
            }
            _ = interval.tick() => {
                match job.run(days_old).await {
                    Ok(stats) if stats.is_complete() => {
                        tracing::info!(
                            deleted = stats.total_deleted,
                            scanned = stats.scanned_count,
                            "Alert retention: cleanup finished"
                        );
                    }
                    Ok(stats) => {
                        tracing::warn!(
                            deleted = stats.total_deleted,
                            scanned = stats.scanned_count,
                            failed_batches = stats.batch_errors.len(),
                            "Alert retention: cleanup finished with failed batches"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Alert retention: cleanup failed");
                    }
                }
            }
        }
    }
}
