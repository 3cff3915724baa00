//! Cart container and cart lines.

use crate::cart::{CartPricing, LinePricing};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_LINE: i64 = 9999;

/// One product and the quantity the customer wants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Copy of the product taken when the line was created.
    pub product: Product,
    /// Always between 1 and `MAX_QUANTITY_PER_LINE`.
    pub quantity: i64,
}

impl CartLine {
    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Unit price charged for this line.
    pub fn unit_price(&self) -> Money {
        self.product.effective_price()
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price().try_multiply(self.quantity)
    }

    fn pricing(&self) -> Result<LinePricing, CommerceError> {
        let unit_price = self.unit_price();
        Ok(LinePricing {
            product_id: self.product.id.clone(),
            base_unit_price: self.product.price,
            unit_price,
            quantity: self.quantity,
            subtotal: self
                .product
                .price
                .try_multiply(self.quantity)
                .ok_or(CommerceError::Overflow)?,
            total: unit_price
                .try_multiply(self.quantity)
                .ok_or(CommerceError::Overflow)?,
        })
    }
}

/// The shopping cart.
///
/// Holds at most one line per product identifier. Operations on a product
/// that is not in the cart are no-ops. Every mutation that changes amounts
/// checks that the cart total stays representable, so `total_price` never
/// fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: Currency,
}

impl Cart {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add `quantity` units of `product`.
    ///
    /// Merges into the existing line for the same product, keeping that
    /// line's product copy. Returns the line's resulting quantity.
    ///
    /// Returns an error, leaving the cart untouched, if:
    /// - `quantity` is not positive
    /// - the product is priced in another currency
    /// - the line would exceed `MAX_QUANTITY_PER_LINE`
    /// - the cart total would overflow
    ///
    /// Stock is not checked here.
    pub fn add_to_cart(&mut self, product: &Product, quantity: i64) -> Result<i64, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        self.check_currency(product)?;

        if let Some(index) = self.position(&product.id) {
            let line = &self.lines[index];
            let new_quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            check_limit(new_quantity)?;
            self.check_total_after(Some(line), line.unit_price(), new_quantity)?;

            self.lines[index].quantity = new_quantity;
            return Ok(new_quantity);
        }

        check_limit(quantity)?;
        self.check_total_after(None, product.effective_price(), quantity)?;
        self.lines.push(CartLine {
            product: product.clone(),
            quantity,
        });
        Ok(quantity)
    }

    /// Remove the line for `product_id`. Returns whether a line was removed.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.product.id != product_id);
        self.lines.len() < len_before
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or less removes the line. Returns whether a line
    /// was changed or removed; an unknown product is a no-op.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_from_cart(product_id));
        }

        let Some(index) = self.position(product_id) else {
            return Ok(false);
        };
        check_limit(quantity)?;
        let line = &self.lines[index];
        self.check_total_after(Some(line), line.unit_price(), quantity)?;

        self.lines[index].quantity = quantity;
        Ok(true)
    }

    /// Remove all lines.
    pub fn clear_cart(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities across lines (not the number of lines).
    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `effective price * quantity` over all lines.
    pub fn total_price(&self) -> Money {
        // Mutations reject any state whose total overflows.
        let amount = self
            .lines
            .iter()
            .map(|l| l.unit_price().amount.saturating_mul(l.quantity))
            .fold(0_i64, i64::saturating_add);
        Money::new(amount, self.currency)
    }

    /// Full pricing breakdown.
    ///
    /// Fails only if the subtotal at base prices overflows.
    pub fn pricing(&self) -> Result<CartPricing, CommerceError> {
        let lines = self
            .lines
            .iter()
            .map(CartLine::pricing)
            .collect::<Result<Vec<_>, _>>()?;

        let subtotal = Money::try_sum(lines.iter().map(|l| &l.subtotal), self.currency)
            .ok_or(CommerceError::Overflow)?;
        let grand_total = Money::try_sum(lines.iter().map(|l| &l.total), self.currency)
            .ok_or(CommerceError::Overflow)?;
        let savings = subtotal
            .try_subtract(&grand_total)
            .ok_or(CommerceError::Overflow)?;

        Ok(CartPricing {
            subtotal,
            savings,
            grand_total,
            lines,
        })
    }

    /// Fold another cart into this one, e.g. a cart restored from storage.
    ///
    /// Quantities of products present in both are added and capped at
    /// `MAX_QUANTITY_PER_LINE`. On error the cart is left untouched.
    pub fn merge(&mut self, other: Cart) -> Result<(), CommerceError> {
        if other.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: other.currency.code().to_string(),
            });
        }

        let mut merged = self.lines.clone();
        for line in other.lines {
            match merged.iter_mut().find(|l| l.product.id == line.product.id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(line.quantity)
                        .min(MAX_QUANTITY_PER_LINE);
                }
                None => merged.push(line),
            }
        }

        checked_total(&merged, self.currency)?;
        self.lines = merged;
        Ok(())
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product.id == product_id)
    }

    /// Quantity held for `product_id`, 0 if absent.
    pub fn quantity_of(&self, product_id: &ProductId) -> i64 {
        self.line(product_id).map(|l| l.quantity).unwrap_or(0)
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.position(product_id).is_some()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|l| &l.product.id == product_id)
    }

    fn check_currency(&self, product: &Product) -> Result<(), CommerceError> {
        let got = product.effective_price().currency;
        if got != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: got.code().to_string(),
            });
        }
        Ok(())
    }

    /// Verify the total if `replaced` were swapped for a line of
    /// `quantity` units at `unit_price`.
    fn check_total_after(
        &self,
        replaced: Option<&CartLine>,
        unit_price: Money,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        let current = checked_total(&self.lines, self.currency)?;
        let without = match replaced {
            Some(line) => {
                let old = line.line_total().ok_or(CommerceError::Overflow)?;
                current.try_subtract(&old).ok_or(CommerceError::Overflow)?
            }
            None => current,
        };
        let added = unit_price
            .try_multiply(quantity)
            .ok_or(CommerceError::Overflow)?;
        without.try_add(&added).ok_or(CommerceError::Overflow)?;
        Ok(())
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

fn check_limit(quantity: i64) -> Result<(), CommerceError> {
    if quantity > MAX_QUANTITY_PER_LINE {
        return Err(CommerceError::QuantityExceedsLimit(
            quantity,
            MAX_QUANTITY_PER_LINE,
        ));
    }
    Ok(())
}

fn checked_total(lines: &[CartLine], currency: Currency) -> Result<Money, CommerceError> {
    lines.iter().try_fold(Money::zero(currency), |acc, line| {
        line.line_total()
            .and_then(|t| acc.try_add(&t))
            .ok_or(CommerceError::Overflow)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product::new(id, format!("Produit {id}"), Money::xof(price)).with_stock(100)
    }

    fn on_sale(id: &str, price: i64, promo: i64) -> Product {
        product(id, price).with_promo(Money::xof(promo))
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Money::xof(0));
        assert_eq!(cart.currency(), Currency::XOF);
    }

    #[test]
    fn test_add_merges_quantities() {
        let mut cart = Cart::default();
        let p = product("p1", 1000);

        assert_eq!(cart.add_to_cart(&p, 2).unwrap(), 2);
        assert_eq!(cart.add_to_cart(&p, 3).unwrap(), 5);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of(&p.id), 5);
    }

    #[test]
    fn test_readd_keeps_first_product_copy() {
        let mut cart = Cart::default();
        cart.add_to_cart(&product("p1", 1000), 1).unwrap();
        cart.add_to_cart(&product("p1", 1500), 1).unwrap();
        assert_eq!(cart.total_price(), Money::xof(2000));
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let mut cart = Cart::default();
        let p = product("p1", 1000);
        cart.add_to_cart(&p, 1).unwrap();

        assert!(cart.update_quantity(&p.id, 0).unwrap());
        assert!(!cart.contains(&p.id));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_negative_removes_line() {
        let mut cart = Cart::default();
        let p = product("p1", 1000);
        cart.add_to_cart(&p, 4).unwrap();
        assert!(cart.update_quantity(&p.id, -3).unwrap());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_sets_quantity() {
        let mut cart = Cart::default();
        let p = product("p1", 1000);
        cart.add_to_cart(&p, 1).unwrap();

        assert!(cart.update_quantity(&p.id, 7).unwrap());
        assert_eq!(cart.total_items(), 7);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut cart = Cart::default();
        cart.add_to_cart(&product("p1", 1000), 1).unwrap();
        assert!(!cart.update_quantity(&ProductId::new("ghost"), 3).unwrap());
        assert!(!cart.update_quantity(&ProductId::new("ghost"), 0).unwrap());
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_total_price_uses_promo() {
        let mut cart = Cart::default();
        cart.add_to_cart(&product("p1", 1000), 2).unwrap();
        cart.add_to_cart(&on_sale("p2", 500, 400), 1).unwrap();

        assert_eq!(cart.total_price(), Money::xof(2400));
    }

    #[test]
    fn test_total_items_counts_quantities() {
        let mut cart = Cart::default();
        cart.add_to_cart(&product("p1", 1000), 3).unwrap();
        cart.add_to_cart(&product("p2", 1000), 2).unwrap();

        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_remove_nonexistent_is_noop() {
        let mut cart = Cart::default();
        cart.add_to_cart(&product("p1", 1000), 2).unwrap();
        let before = cart.clone();

        assert!(!cart.remove_from_cart(&ProductId::new("nonexistent-id")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_existing() {
        let mut cart = Cart::default();
        let p = product("p1", 1000);
        cart.add_to_cart(&p, 2).unwrap();
        cart.add_to_cart(&product("p2", 300), 1).unwrap();

        assert!(cart.remove_from_cart(&p.id));
        assert_eq!(cart.total_price(), Money::xof(300));
    }

    #[test]
    fn test_clear_cart() {
        let mut cart = Cart::default();
        cart.add_to_cart(&product("p1", 1000), 2).unwrap();
        cart.add_to_cart(&product("p2", 1000), 9).unwrap();
        cart.clear_cart();
        assert_eq!(cart.total_items(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_non_positive_add_rejected() {
        let mut cart = Cart::default();
        let p = product("p1", 1000);
        assert!(matches!(
            cart.add_to_cart(&p, 0),
            Err(CommerceError::InvalidQuantity(0))
        ));
        assert!(matches!(
            cart.add_to_cart(&p, -2),
            Err(CommerceError::InvalidQuantity(-2))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_limit() {
        let mut cart = Cart::default();
        let p = product("p1", 10);
        assert!(matches!(
            cart.add_to_cart(&p, MAX_QUANTITY_PER_LINE + 1),
            Err(CommerceError::QuantityExceedsLimit(..))
        ));

        cart.add_to_cart(&p, MAX_QUANTITY_PER_LINE).unwrap();
        assert!(cart.add_to_cart(&p, 1).is_err());
        assert!(cart.update_quantity(&p.id, MAX_QUANTITY_PER_LINE + 1).is_err());
        assert_eq!(cart.quantity_of(&p.id), MAX_QUANTITY_PER_LINE);
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let mut cart = Cart::new(Currency::XOF);
        let euro = Product::new("e1", "Import", Money::new(1999, Currency::EUR));
        assert!(matches!(
            cart.add_to_cart(&euro, 1),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_overflow_rejected_and_cart_untouched() {
        let mut cart = Cart::default();
        let pricey = product("lux", i64::MAX / 2);
        cart.add_to_cart(&pricey, 1).unwrap();
        assert!(matches!(
            cart.add_to_cart(&pricey, 2),
            Err(CommerceError::Overflow)
        ));
        assert!(matches!(
            cart.add_to_cart(&product("lux2", i64::MAX / 2 + 10), 1),
            Err(CommerceError::Overflow)
        ));
        assert_eq!(cart.total_items(), 1);
        assert_eq!(cart.total_price(), Money::xof(i64::MAX / 2));
    }

    #[test]
    fn test_pricing_breakdown() {
        let mut cart = Cart::default();
        cart.add_to_cart(&product("p1", 1000), 2).unwrap();
        cart.add_to_cart(&on_sale("p2", 500, 400), 1).unwrap();

        let pricing = cart.pricing().unwrap();
        assert_eq!(pricing.subtotal, Money::xof(2500));
        assert_eq!(pricing.savings, Money::xof(100));
        assert_eq!(pricing.grand_total, cart.total_price());
        assert_eq!(pricing.lines.len(), 2);
        assert_eq!(pricing.lines[1].unit_price, Money::xof(400));
    }

    #[test]
    fn test_merge_caps_quantities() {
        let mut cart = Cart::default();
        let p = product("p1", 10);
        cart.add_to_cart(&p, MAX_QUANTITY_PER_LINE - 1).unwrap();

        let mut other = Cart::default();
        other.add_to_cart(&p, 5).unwrap();
        other.add_to_cart(&product("p2", 20), 1).unwrap();

        cart.merge(other).unwrap();
        assert_eq!(cart.quantity_of(&p.id), MAX_QUANTITY_PER_LINE);
        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_merge_rejects_other_currency() {
        let mut cart = Cart::default();
        let other = Cart::new(Currency::EUR);
        assert!(cart.merge(other).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn adds_merge_into_one_line(a in 1i64..500, b in 1i64..500) {
                let mut cart = Cart::default();
                let p = product("p", 250);
                cart.add_to_cart(&p, a).unwrap();
                cart.add_to_cart(&p, b).unwrap();

                prop_assert_eq!(cart.line_count(), 1);
                prop_assert_eq!(cart.quantity_of(&p.id), a + b);
            }

            #[test]
            fn totals_match_line_sums(quantities in proptest::collection::vec(1i64..50, 0..8)) {
                let mut cart = Cart::default();
                let mut expected_items = 0;
                let mut expected_price = 0;
                for (i, q) in quantities.iter().enumerate() {
                    let price = 100 * (i as i64 + 1);
                    cart.add_to_cart(&product(&format!("p{i}"), price), *q).unwrap();
                    expected_items += q;
                    expected_price += price * q;
                }

                prop_assert_eq!(cart.total_items(), expected_items);
                prop_assert_eq!(cart.total_price(), Money::xof(expected_price));
            }

            #[test]
            fn quantity_is_never_stored_below_one(ops in proptest::collection::vec((0usize..3, -5i64..10), 0..40)) {
                let mut cart = Cart::default();
                let products = [product("a", 100), product("b", 200), product("c", 300)];
                for (which, q) in ops {
                    let p = &products[which];
                    if q > 0 && q % 2 == 0 {
                        let _ = cart.add_to_cart(p, q);
                    } else {
                        let _ = cart.update_quantity(&p.id, q);
                    }
                }
                prop_assert!(cart.lines().iter().all(|l| l.quantity >= 1));
                prop_assert!(cart.lines().len() <= products.len());
            }
        }
    }
}
