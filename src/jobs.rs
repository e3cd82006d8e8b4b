//! Background job: periodic ticket cache refresh.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::RefreshConfig;
use crate::AppState;

/// Spawn the refresh loop. Returns `None` when the interval is 0.
///
/// The first refresh happens one full interval after startup; startup
/// itself is covered by `refresh.on_startup`.
pub fn spawn_refresh(state: AppState, config: &RefreshConfig) -> Option<JoinHandle<()>> {
    if config.interval_secs == 0 {
        tracing::info!("Background refresh disabled");
        return None;
    }

    let period = Duration::from_secs(config.interval_secs);
    tracing::info!(interval_secs = config.interval_secs, "Background refresh enabled");

    Some(tokio::spawn(async move {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = state.store.refresh_from(state.source.as_ref(), None).await {
                tracing::error!(error = %e, "Background refresh failed; keeping cached tickets");
            }
        }
    }))
}
