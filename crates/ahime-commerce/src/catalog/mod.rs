//! Product catalog module.
//!
//! Contains products, categories, and the read-only catalog index the
//! storefront resolves identifiers against.

mod category;
mod index;
mod product;

pub use category::Category;
pub use index::Catalog;
pub use product::Product;
