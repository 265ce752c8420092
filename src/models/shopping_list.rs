use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateShoppingList {
    pub name: String,
}

/// A single line on a shopping list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    /// Owning group, taken from the parent list.
    pub group_id: Uuid,
    pub note: String,
    pub quantity: f64,
    pub checked: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateShoppingListItem {
    #[serde(default)]
    pub note: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub position: i32,
}

impl Default for CreateShoppingListItem {
    fn default() -> Self {
        Self {
            note: String::new(),
            quantity: default_quantity(),
            checked: false,
            position: 0,
        }
    }
}

fn default_quantity() -> f64 {
    1.0
}

/// Outcome of a bulk item deletion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkDeleteResult {
    /// Items that existed in the caller's group and were removed.
    pub deleted_items: Vec<ShoppingListItem>,
    /// Requested ids that did not match an item in the caller's group.
    pub not_found_ids: Vec<Uuid>,
}

impl BulkDeleteResult {
    pub fn deleted_count(&self) -> usize {
        self.deleted_items.len()
    }
}
