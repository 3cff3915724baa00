//! Product listing filters.

use crate::catalog::Product;
use crate::ids::CategoryId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A predicate over catalog products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Filter {
    /// Filter by single category.
    Category(CategoryId),
    /// Filter by multiple categories (OR).
    Categories(Vec<CategoryId>),
    /// Filter on the effective (possibly promotional) unit price, bounds inclusive.
    PriceRange {
        min: Option<Money>,
        max: Option<Money>,
    },
    /// Only products with stock left.
    InStock,
    /// Only products with an active promotion.
    OnSale,
    /// Offered in this color (case-insensitive).
    Color(String),
    /// Offered in this size (case-insensitive).
    Size(String),
    /// Minimum average rating; unrated products never match.
    Rating { min: f32 },
    /// Case-insensitive substring match on name and description.
    Text(String),
}

impl Filter {
    /// Create a category filter.
    pub fn category(id: impl Into<CategoryId>) -> Self {
        Filter::Category(id.into())
    }

    /// Create a price range filter.
    pub fn price_range(min: Option<Money>, max: Option<Money>) -> Self {
        Filter::PriceRange { min, max }
    }

    pub fn in_stock() -> Self {
        Filter::InStock
    }

    pub fn on_sale() -> Self {
        Filter::OnSale
    }

    /// Create a text search filter.
    pub fn text(query: impl Into<String>) -> Self {
        Filter::Text(query.into())
    }

    /// Whether `product` passes this filter.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Filter::Category(id) => product.category.as_ref() == Some(id),
            Filter::Categories(ids) => product
                .category
                .as_ref()
                .map(|c| ids.contains(c))
                .unwrap_or(false),
            Filter::PriceRange { min, max } => {
                let price = product.effective_price();
                let above_min = min
                    .map(|m| m.currency == price.currency && price.amount >= m.amount)
                    .unwrap_or(true);
                let below_max = max
                    .map(|m| m.currency == price.currency && price.amount <= m.amount)
                    .unwrap_or(true);
                above_min && below_max
            }
            Filter::InStock => product.is_in_stock(),
            Filter::OnSale => product.has_active_promo(),
            Filter::Color(color) => contains_ignore_case(&product.colors, color),
            Filter::Size(size) => contains_ignore_case(&product.sizes, size),
            Filter::Rating { min } => product.rating.map(|r| r >= *min).unwrap_or(false),
            Filter::Text(query) => {
                let needle = query.trim().to_lowercase();
                if needle.is_empty() {
                    return true;
                }
                product.name.to_lowercase().contains(&needle)
                    || product
                        .description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            }
        }
    }
}

fn contains_ignore_case(values: &[String], wanted: &str) -> bool {
    values.iter().any(|v| v.eq_ignore_ascii_case(wanted.trim()))
}
