//! Background worker that prunes checked shopping-list items on a schedule.

use std::sync::Arc;

use super::checked_items::delete_old_checked_list_items;
use crate::{config::RetentionConfig, db::DbPool, events::EventBus, observability::metrics};

/// Starts the retention worker as a background task.
///
/// The worker runs in a loop, pruning every group at the configured interval.
/// A failed run is logged and the next one is attempted after the usual
/// interval. It will run indefinitely until the task is cancelled.
pub async fn start_retention_worker(
    db: Arc<DbPool>,
    event_bus: Arc<EventBus>,
    config: RetentionConfig,
) {
    if !config.enabled {
        tracing::info!("Retention worker disabled by configuration");
        return;
    }

    tracing::info!(
        interval_hours = config.interval_hours,
        max_checked_items = config.max_checked_items,
        "Starting retention worker"
    );

    let interval = config.interval();

    loop {
        match delete_old_checked_list_items(
            &db,
            Arc::clone(&event_bus),
            None,
            config.max_checked_items,
        )
        .await
        {
            Ok(result) => {
                if result.has_deletions() {
                    tracing::info!(
                        groups = result.groups_scanned,
                        lists = result.lists_scanned,
                        lists_trimmed = result.lists_trimmed,
                        items_deleted = result.items_deleted,
                        "Retention run complete"
                    );
                } else {
                    tracing::debug!(
                        groups = result.groups_scanned,
                        lists = result.lists_scanned,
                        "Retention run complete, no checked items to delete"
                    );
                }
            }
            Err(e) => {
                metrics::record_retention_error();
                tracing::error!(error = %e, "Error running retention");
            }
        }

        tokio::time::sleep(interval).await;
    }
}
