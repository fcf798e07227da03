//! Continuous collection loop with cooperative shutdown.

use std::time::Duration;

use tokio::sync::watch;

use sweep_collectors::CollectRequest;

use crate::Coordinator;

#[derive(Debug, Clone, Copy)]
pub struct ScheduleConfig {
    /// Pause between successful cycles.
    pub interval: Duration,
    /// Pause after a failed cycle, so a broken store or misconfiguration
    /// does not turn into a hot loop.
    pub failure_cooldown: Duration,
}

/// Run collection cycles until `shutdown` flips to `true`.
///
/// Shutdown is observed between cycles, never mid-cycle: a cycle that has
/// started runs to completion so partially collected data still lands in
/// the store.
pub async fn run_continuous(
    coordinator: &Coordinator,
    platforms: Option<&[String]>,
    request: &CollectRequest,
    schedule: ScheduleConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let wait = match coordinator.collect_data(platforms, request).await {
            Ok(summary) => {
                tracing::info!(
                    collected = summary.total_collected(),
                    inserted = summary.inserted,
                    "scheduled cycle finished"
                );
                schedule.interval
            }
            Err(err) => {
                tracing::error!(error = %err, "scheduled cycle failed, backing off");
                schedule.failure_cooldown
            }
        };

        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            changed = shutdown.changed() => {
                // A dropped sender means no one can ask us to stop later.
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::info!("continuous collection stopped");
}
