//! Storefront state for the Ahimè boutique.
//!
//! - **Catalog**: products, categories, read-only indexed catalog
//! - **Cart**: one line per product, quantities, totals and pricing
//! - **Favorites**: liked products, toggled from the product grid
//! - **Search**: filters, sorting and pagination over the catalog
//! - **Storefront**: one visitor's cart and favorites, snapshots, persistence
//!
//! # Example
//!
//! ```rust,ignore
//! use ahime_commerce::prelude::*;
//!
//! let catalog = Catalog::from_json(&std::fs::read_to_string("catalog.json")?)?;
//! let mut storefront = Storefront::default();
//!
//! storefront.add_to_cart_by_id(&catalog, &ProductId::new("p1"), 2)?;
//! storefront.toggle_favorite_by_id(&catalog, &ProductId::new("p7"))?;
//!
//! println!("{} articles, {}", storefront.total_items(), storefront.total_price());
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod favorites;
pub mod search;
pub mod snapshot;
pub mod storefront;

#[cfg(feature = "storage")]
pub mod persistence;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::catalog::{Catalog, Category, Product};

    pub use crate::cart::{Cart, CartLine, CartPricing, LinePricing, MAX_QUANTITY_PER_LINE};
    pub use crate::favorites::Favorites;

    pub use crate::search::{Filter, Pagination, SearchQuery, SearchResults, SortOption};

    pub use crate::snapshot::{RestoreReport, SnapshotLine, StorefrontSnapshot, SNAPSHOT_VERSION};
    pub use crate::storefront::{Storefront, StorefrontConfig, StorefrontSummary};

    #[cfg(feature = "storage")]
    pub use crate::persistence::SnapshotStore;
}
