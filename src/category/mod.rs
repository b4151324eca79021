//! User-owned categories for labelling transactions.

mod db;
mod defaults;
mod delete;
mod domain;
mod page;

pub use db::{
    count_categories, create_category, create_category_table, delete_category, get_categories,
    get_categories_by_kind,
};
pub use defaults::ensure_default_categories;
pub use delete::delete_category_endpoint;
pub use domain::{
    Category, CategoryFormData, CategoryKind, CategoryName, DEFAULT_COLOR, DEFAULT_ICON,
    NewCategory,
};
pub use page::{create_category_endpoint, get_categories_page};
