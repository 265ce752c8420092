mod group;
mod shopping_list;

pub use group::*;
pub use shopping_list::*;
