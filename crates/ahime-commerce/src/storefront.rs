//! The visitor's storefront session: one cart and one favorites list.

use ahime_observability::StructuredLogger;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::{Catalog, Product};
use crate::error::CommerceError;
use crate::favorites::Favorites;
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// Storefront settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Currency every cart line must be priced in.
    pub currency: Currency,
    /// Refuse cart quantities above the product's stock.
    pub enforce_stock: bool,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            currency: Currency::XOF,
            enforce_stock: true,
        }
    }
}

/// Header badge counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontSummary {
    pub total_items: i64,
    pub total_price: Money,
    pub total_favorites: usize,
}

/// Owns the cart and favorites of one visitor.
///
/// Every container operation is available here. On top of the containers
/// it applies the stock policy from [`StorefrontConfig`] and logs
/// mutations when a logger is attached.
#[derive(Debug, Clone)]
pub struct Storefront {
    pub(crate) config: StorefrontConfig,
    pub(crate) cart: Cart,
    pub(crate) favorites: Favorites,
    logger: Option<StructuredLogger>,
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new(StorefrontConfig::default())
    }
}

impl Storefront {
    pub fn new(config: StorefrontConfig) -> Self {
        Self {
            config,
            cart: Cart::new(config.currency),
            favorites: Favorites::new(),
            logger: None,
        }
    }

    /// Attach a logger; mutations are logged under the `cart` and
    /// `favorites` components.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    // Cart

    /// Add `quantity` units of `product`. Returns the resulting line quantity.
    pub fn add_to_cart(&mut self, product: &Product, quantity: i64) -> Result<i64, CommerceError> {
        let result = self.checked_add(product, quantity);
        match &result {
            Ok(line_quantity) => self.log_cart("line added", &product.id, *line_quantity),
            Err(e) => self.log_rejected(&product.id, e),
        }
        result
    }

    fn checked_add(&mut self, product: &Product, quantity: i64) -> Result<i64, CommerceError> {
        if self.config.enforce_stock && quantity > 0 {
            let requested = self.cart.quantity_of(&product.id).saturating_add(quantity);
            check_stock(product, requested)?;
        }
        self.cart.add_to_cart(product, quantity)
    }

    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> bool {
        let removed = self.cart.remove_from_cart(product_id);
        if removed {
            self.log_cart("line removed", product_id, 0);
        }
        removed
    }

    /// Set a line's quantity; zero or less removes the line.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if self.config.enforce_stock && quantity > 0 {
            if let Some(line) = self.cart.line(product_id) {
                check_stock(&line.product, quantity)?;
            }
        }

        let changed = self.cart.update_quantity(product_id, quantity)?;
        if changed {
            self.log_cart("quantity updated", product_id, quantity.max(0));
        }
        Ok(changed)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear_cart();
        if let Some(logger) = &self.logger {
            logger.for_component("cart").info("cart cleared");
        }
    }

    pub fn total_items(&self) -> i64 {
        self.cart.total_items()
    }

    pub fn total_price(&self) -> Money {
        self.cart.total_price()
    }

    /// Resolve `product_id` in `catalog`, then add it to the cart.
    pub fn add_to_cart_by_id(
        &mut self,
        catalog: &Catalog,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<i64, CommerceError> {
        let product = catalog.require(product_id)?;
        self.add_to_cart(product, quantity)
    }

    // Favorites

    pub fn add_to_favorites(&mut self, product: &Product) -> bool {
        let added = self.favorites.add_to_favorites(product);
        if added {
            self.log_favorite("favorite added", &product.id);
        }
        added
    }

    pub fn remove_from_favorites(&mut self, product_id: &ProductId) -> bool {
        let removed = self.favorites.remove_from_favorites(product_id);
        if removed {
            self.log_favorite("favorite removed", product_id);
        }
        removed
    }

    pub fn is_favorite(&self, product_id: &ProductId) -> bool {
        self.favorites.is_favorite(product_id)
    }

    /// Returns whether the product is a favorite afterwards.
    pub fn toggle_favorite(&mut self, product: &Product) -> bool {
        let now_favorite = self.favorites.toggle_favorite(product);
        let message = if now_favorite {
            "favorite added"
        } else {
            "favorite removed"
        };
        self.log_favorite(message, &product.id);
        now_favorite
    }

    pub fn toggle_favorite_by_id(
        &mut self,
        catalog: &Catalog,
        product_id: &ProductId,
    ) -> Result<bool, CommerceError> {
        let product = catalog.require(product_id)?;
        Ok(self.toggle_favorite(product))
    }

    pub fn clear_favorites(&mut self) {
        self.favorites.clear_favorites();
        if let Some(logger) = &self.logger {
            logger.for_component("favorites").info("favorites cleared");
        }
    }

    pub fn total_favorites(&self) -> usize {
        self.favorites.total_favorites()
    }

    /// Put a favorite in the cart and drop it from favorites.
    ///
    /// Returns `Ok(false)` if the product is not a favorite. If the cart
    /// refuses the product, favorites are left unchanged.
    pub fn move_favorite_to_cart(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        let Some(product) = self.favorites.get(product_id).cloned() else {
            return Ok(false);
        };
        self.add_to_cart(&product, quantity)?;
        self.remove_from_favorites(product_id);
        Ok(true)
    }

    pub fn summary(&self) -> StorefrontSummary {
        StorefrontSummary {
            total_items: self.total_items(),
            total_price: self.total_price(),
            total_favorites: self.total_favorites(),
        }
    }

    fn log_cart(&self, message: &str, product_id: &ProductId, quantity: i64) {
        if let Some(logger) = &self.logger {
            logger
                .for_component("cart")
                .info_builder(message)
                .field("product_id", product_id.as_str())
                .field_i64("quantity", quantity)
                .field_i64("total_items", self.cart.total_items())
                .emit();
        }
    }

    fn log_rejected(&self, product_id: &ProductId, error: &CommerceError) {
        if let Some(logger) = &self.logger {
            logger
                .for_component("cart")
                .warn_builder("add rejected")
                .field("product_id", product_id.as_str())
                .field("reason", error.to_string())
                .emit();
        }
    }

    fn log_favorite(&self, message: &str, product_id: &ProductId) {
        if let Some(logger) = &self.logger {
            logger
                .for_component("favorites")
                .info_builder(message)
                .field("product_id", product_id.as_str())
                .field_i64("total_favorites", self.favorites.total_favorites() as i64)
                .emit();
        }
    }
}

fn check_stock(product: &Product, requested: i64) -> Result<(), CommerceError> {
    let available = i64::from(product.stock);
    if requested > available {
        return Err(CommerceError::InsufficientStock {
            product_id: product.id.to_string(),
            requested,
            available,
        });
    }
    Ok(())
}
