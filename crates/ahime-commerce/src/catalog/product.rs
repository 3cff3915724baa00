//! Product records as served by the catalog.

use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
///
/// Cart lines and favorite entries hold a copy of this record; the catalog
/// remains the owner of the canonical version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Base unit price.
    pub price: Money,
    /// Promotional price, honored only while `is_on_sale` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_price: Option<Money>,
    /// Whether the promotional price applies.
    #[serde(default)]
    pub is_on_sale: bool,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Category this product is listed under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    /// Image URLs, first one is the cover.
    #[serde(default)]
    pub images: Vec<String>,
    /// Available colors.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Available sizes.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Average customer rating, 0 to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl Product {
    /// Create a product with the required fields; everything else is empty.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            promo_price: None,
            is_on_sale: false,
            stock: 0,
            category: None,
            images: Vec::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            rating: None,
        }
    }

    /// Put the product on sale at `promo_price`.
    pub fn with_promo(mut self, promo_price: Money) -> Self {
        self.promo_price = Some(promo_price);
        self.is_on_sale = true;
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(url.into());
        self
    }

    pub fn with_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    /// The price a customer pays for one unit.
    ///
    /// The promotional price wins only when the product is flagged on sale
    /// and actually carries one.
    pub fn effective_price(&self) -> Money {
        match (self.is_on_sale, self.promo_price) {
            (true, Some(promo)) => promo,
            _ => self.price,
        }
    }

    /// Whether a promotional price currently applies.
    pub fn has_active_promo(&self) -> bool {
        self.is_on_sale && self.promo_price.is_some()
    }

    /// Savings on one unit compared to the base price.
    pub fn unit_savings(&self) -> Money {
        self.price
            .try_subtract(&self.effective_price())
            .unwrap_or_else(|| Money::zero(self.price.currency))
    }

    /// Discount percentage shown on sale badges, rounded down.
    pub fn discount_percentage(&self) -> Option<u32> {
        if !self.has_active_promo() || self.price.amount <= 0 {
            return None;
        }
        let savings = self.unit_savings().amount;
        if savings <= 0 {
            return None;
        }
        Some((savings * 100 / self.price.amount) as u32)
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Cover image, if any.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Check the record against the catalog invariants.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let invalid = |reason: &str| CommerceError::InvalidProduct {
            product_id: self.id.to_string(),
            reason: reason.to_string(),
        };

        if self.id.is_blank() {
            return Err(invalid("identifier is blank"));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("name is blank"));
        }
        if self.price.is_negative() {
            return Err(invalid("price is negative"));
        }
        if let Some(promo) = self.promo_price {
            if promo.currency != self.price.currency {
                return Err(CommerceError::CurrencyMismatch {
                    expected: self.price.currency.code().to_string(),
                    got: promo.currency.code().to_string(),
                });
            }
            if promo.is_negative() {
                return Err(invalid("promotional price is negative"));
            }
            if self.is_on_sale && promo.amount >= self.price.amount {
                return Err(invalid("promotional price must be below the base price"));
            }
        }
        if self.is_on_sale && self.promo_price.is_none() {
            return Err(invalid("on sale without a promotional price"));
        }
        if let Some(rating) = self.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(invalid("rating must be between 0 and 5"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn boubou() -> Product {
        Product::new("boubou-01", "Boubou brodé", Money::xof(15000)).with_stock(4)
    }

    #[test]
    fn test_effective_price_without_promo() {
        let p = boubou();
        assert_eq!(p.effective_price(), Money::xof(15000));
        assert_eq!(p.discount_percentage(), None);
    }

    #[test]
    fn test_effective_price_on_sale() {
        let p = boubou().with_promo(Money::xof(12000));
        assert_eq!(p.effective_price(), Money::xof(12000));
        assert_eq!(p.unit_savings(), Money::xof(3000));
        assert_eq!(p.discount_percentage(), Some(20));
    }

    #[test]
    fn test_promo_ignored_when_not_on_sale() {
        let mut p = boubou().with_promo(Money::xof(12000));
        p.is_on_sale = false;
        assert_eq!(p.effective_price(), Money::xof(15000));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_promo_above_price() {
        let p = boubou().with_promo(Money::xof(15000));
        assert!(matches!(
            p.validate(),
            Err(CommerceError::InvalidProduct { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_sale_without_promo() {
        let mut p = boubou();
        p.is_on_sale = true;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_mixed_currency() {
        let p = boubou().with_promo(Money::new(1000, Currency::EUR));
        assert!(matches!(
            p.validate(),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_rating() {
        assert!(boubou().with_rating(4.5).validate().is_ok());
        assert!(boubou().with_rating(7.0).validate().is_err());
    }

    #[test]
    fn test_deserialize_camel_case_record() {
        let json = r#"{
            "id": "sac-raphia",
            "name": "Sac en raphia",
            "price": { "amount": 8000, "currency": "XOF" },
            "promoPrice": { "amount": 6500, "currency": "XOF" },
            "isOnSale": true,
            "stock": 3,
            "category": "accessoires",
            "colors": ["naturel", "noir"]
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.effective_price(), Money::xof(6500));
        assert_eq!(p.category, Some(CategoryId::new("accessoires")));
        assert!(p.sizes.is_empty());
        assert!(p.validate().is_ok());
    }
}
