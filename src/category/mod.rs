//! Income and expense categories: the model, the store and the route handlers.

mod core;
mod handlers;
mod store;

pub use core::{
    Category, CategoryName, CategoryType, Color, create_category_table, map_category_row,
    map_category_row_with_offset, seed_default_categories,
};
pub use handlers::{create_category, delete_category, get_categories, update_category};
pub use store::{CategoryStore, SQLiteCategoryStore};
