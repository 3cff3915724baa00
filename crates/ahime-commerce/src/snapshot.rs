//! Serializable snapshot of a storefront, and restoring one against a catalog.

use serde::{Deserialize, Serialize};

use crate::cart::MAX_QUANTITY_PER_LINE;
use crate::catalog::Catalog;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Currency;
use crate::storefront::{Storefront, StorefrontConfig};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Cart line as persisted: identifier and quantity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Persisted form of a [`Storefront`].
///
/// Prices are not stored; restoring looks every product up again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontSnapshot {
    pub version: u32,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub cart: Vec<SnapshotLine>,
    #[serde(default)]
    pub favorites: Vec<ProductId>,
}

impl Default for StorefrontSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            currency: Currency::default(),
            cart: Vec::new(),
            favorites: Vec::new(),
        }
    }
}

impl StorefrontSnapshot {
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty() && self.favorites.is_empty()
    }
}

/// What a restore did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Cart lines put back in the cart.
    pub restored_lines: usize,
    /// Favorites put back.
    pub restored_favorites: usize,
    /// Identifiers no longer in the catalog.
    pub missing: Vec<ProductId>,
    /// Lines the cart refused (out of stock, bad quantity, other currency).
    pub skipped: Vec<ProductId>,
}

impl RestoreReport {
    /// Whether every entry came back.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.skipped.is_empty()
    }
}

impl Storefront {
    /// Capture cart lines and favorites, in order.
    pub fn snapshot(&self) -> StorefrontSnapshot {
        StorefrontSnapshot {
            version: SNAPSHOT_VERSION,
            currency: self.cart.currency(),
            cart: self
                .cart
                .lines()
                .iter()
                .map(|line| SnapshotLine {
                    product_id: line.product.id.clone(),
                    quantity: line.quantity,
                })
                .collect(),
            favorites: self.favorites.ids().cloned().collect(),
        }
    }

    /// Merge `snapshot` into this storefront, resolving products in `catalog`.
    ///
    /// Quantities are capped at `MAX_QUANTITY_PER_LINE`, and at the product's
    /// stock when stock is enforced. Entries that cannot be restored are
    /// reported, not fatal. On error nothing is changed.
    pub fn restore(
        &mut self,
        snapshot: &StorefrontSnapshot,
        catalog: &Catalog,
    ) -> Result<RestoreReport, CommerceError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CommerceError::UnsupportedSnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        if snapshot.currency != self.cart.currency() {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.cart.currency().code().to_string(),
                got: snapshot.currency.code().to_string(),
            });
        }

        let mut report = RestoreReport::default();
        let mut cart = self.cart.clone();
        let mut favorites = self.favorites.clone();

        for line in &snapshot.cart {
            let Some(product) = catalog.get(&line.product_id) else {
                tracing::warn!(product_id = %line.product_id, "snapshot line no longer in catalog");
                report.missing.push(line.product_id.clone());
                continue;
            };

            let mut limit = MAX_QUANTITY_PER_LINE;
            if self.config.enforce_stock {
                limit = limit.min(i64::from(product.stock));
            }
            let in_cart = cart.quantity_of(&product.id);
            let quantity = line.quantity.min(limit.saturating_sub(in_cart));

            // Already at the cap: the line is in the cart, nothing to add.
            if quantity <= 0 && in_cart > 0 && line.quantity > 0 {
                report.restored_lines += 1;
                continue;
            }

            match cart.add_to_cart(product, quantity) {
                Ok(_) => report.restored_lines += 1,
                Err(e) => {
                    tracing::warn!(product_id = %line.product_id, error = %e, "snapshot line skipped");
                    report.skipped.push(line.product_id.clone());
                }
            }
        }

        for id in &snapshot.favorites {
            match catalog.get(id) {
                Some(product) => {
                    favorites.add_to_favorites(product);
                    report.restored_favorites += 1;
                }
                None => {
                    tracing::warn!(product_id = %id, "snapshot favorite no longer in catalog");
                    report.missing.push(id.clone());
                }
            }
        }

        self.cart = cart;
        self.favorites = favorites;
        Ok(report)
    }

    /// Build a fresh storefront from `snapshot`.
    pub fn from_snapshot(
        config: StorefrontConfig,
        snapshot: &StorefrontSnapshot,
        catalog: &Catalog,
    ) -> Result<(Self, RestoreReport), CommerceError> {
        let mut storefront = Self::new(config);
        let report = storefront.restore(snapshot, catalog)?;
        Ok((storefront, report))
    }
}
