//! Retention of checked shopping-list items.
//!
//! Checked items pile up on long-lived lists. This module keeps only the most
//! recently updated [`MAX_CHECKED_ITEMS`] checked items per list:
//! 1. Resolve the target groups (one group, or all of them)
//! 2. Walk every shopping list of each group
//! 3. Delete checked items beyond the threshold, newest first
//! 4. Publish one `ShoppingListUpdated` event per deleted item
//!
//! The routine can be run on demand or driven by the background worker.

mod checked_items;
mod worker;

pub use checked_items::{
    CheckedItemsRunResult, MAX_CHECKED_ITEMS, RetentionError, delete_old_checked_list_items,
    trim_list_items,
};
pub use worker::start_retention_worker;
