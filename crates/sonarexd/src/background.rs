//! Background cache refresh loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use sonarex_core::fetch::fetch_all_projects;

use crate::state::AppState;

/// Periodically fetches all tagged projects and swaps them into the store.
///
/// Runs until `shutdown` is cancelled. A failed cycle leaves the previous
/// snapshot in place; the next tick is the only retry.
pub(crate) async fn refresh_loop(
    state: Arc<AppState>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut tick = tokio::time::interval(interval);
    // An overrun fetch pushes the next tick out by the overrun instead of
    // firing a burst of catch-up ticks.
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("refresh loop stopped");
                return;
            }
            _ = tick.tick() => {}
        }

        let t0 = Instant::now();
        match fetch_all_projects(&state.client, &state.catalog, &state.filter_tag).await {
            Ok(projects) => {
                let count = projects.len();
                let generation = state.store.replace(projects);
                info!(
                    generation,
                    projects = count,
                    duration_ms = t0.elapsed().as_millis() as u64,
                    "metrics cache refreshed"
                );
            }
            Err(e) => {
                error!(
                    error = %e,
                    duration_ms = t0.elapsed().as_millis() as u64,
                    "cache refresh failed; keeping previous snapshot"
                );
            }
        }
    }
}
