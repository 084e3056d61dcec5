//! Periodic sync loop
//!
//! Runs a pass immediately, then once per period. Cancellation stops further
//! scheduling; a pass already in flight always runs to completion.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::Syncer;

/// Drive `syncer` until `shutdown` is cancelled.
pub async fn run_periodic(syncer: &Syncer, period: Duration, shutdown: CancellationToken) {
    info!(period_secs = period.as_secs(), "Syncer started");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!("Syncer stopping");
                break;
            }
            _ = ticker.tick() => {
                syncer.run_pass().await;
            }
        }
    }
}
