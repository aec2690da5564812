use std::sync::Arc;
use std::time::Duration;

use burrow_core::{Repository, StorageError};
use jiff::Timestamp;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Removes every record that has expired as of now.
pub async fn purge_once<R: Repository + ?Sized>(repository: &R) -> Result<u64, StorageError> {
    let removed = repository.purge_expired(Timestamp::now()).await?;
    if removed > 0 {
        info!(removed, "purged expired short urls");
    } else {
        debug!("no expired short urls to purge");
    }
    Ok(removed)
}

/// Spawns the periodic purge of expired records.
///
/// Returns `None` when `interval` is zero. The handle is meant to be
/// aborted on shutdown.
pub fn spawn_purge_task<R: Repository>(
    repository: Arc<R>,
    interval: Duration,
) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        info!("expired record purge disabled");
        return None;
    }

    info!(interval_secs = interval.as_secs(), "starting expired record purge");

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = purge_once(repository.as_ref()).await {
                warn!(error = %e, "failed to purge expired short urls");
            }
        }
    }))
}
