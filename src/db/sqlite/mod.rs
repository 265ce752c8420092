mod common;
mod groups;
mod shopping_list_items;
mod shopping_lists;

pub use common::SharedConnection;
pub use groups::SqliteGroupRepo;
pub use shopping_list_items::SqliteShoppingListItemRepo;
pub use shopping_lists::SqliteShoppingListRepo;
