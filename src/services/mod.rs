mod shopping_lists;

pub use shopping_lists::ShoppingListService;
