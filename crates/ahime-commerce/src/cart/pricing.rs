//! Cart pricing breakdown.

use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Pricing breakdown for a whole cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartPricing {
    /// Sum of base prices times quantities.
    pub subtotal: Money,
    /// Amount saved through promotional prices.
    pub savings: Money,
    /// What the customer pays (subtotal - savings).
    pub grand_total: Money,
    /// Per-line breakdown, in cart order.
    pub lines: Vec<LinePricing>,
}

impl CartPricing {
    /// Check if any promotion applies.
    pub fn has_savings(&self) -> bool {
        self.savings.is_positive()
    }

    /// Savings as a percentage of the subtotal.
    pub fn savings_percentage(&self) -> f64 {
        if self.subtotal.amount == 0 {
            return 0.0;
        }
        (self.savings.amount as f64 / self.subtotal.amount as f64) * 100.0
    }
}

/// Pricing breakdown for a single cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinePricing {
    pub product_id: ProductId,
    /// Base unit price.
    pub base_unit_price: Money,
    /// Unit price actually charged.
    pub unit_price: Money,
    pub quantity: i64,
    /// Base unit price times quantity.
    pub subtotal: Money,
    /// Charged unit price times quantity.
    pub total: Money,
}

impl LinePricing {
    /// Savings on this line.
    pub fn savings(&self) -> Money {
        self.subtotal
            .try_subtract(&self.total)
            .unwrap_or_else(|| Money::zero(self.total.currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savings_percentage() {
        let pricing = CartPricing {
            subtotal: Money::xof(10000),
            savings: Money::xof(1000),
            grand_total: Money::xof(9000),
            lines: vec![],
        };

        assert!(pricing.has_savings());
        assert!((pricing.savings_percentage() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_savings_percentage_of_empty_cart() {
        let pricing = CartPricing {
            subtotal: Money::xof(0),
            savings: Money::xof(0),
            grand_total: Money::xof(0),
            lines: vec![],
        };
        assert!(!pricing.has_savings());
        assert_eq!(pricing.savings_percentage(), 0.0);
    }

    #[test]
    fn test_line_savings() {
        let line = LinePricing {
            product_id: ProductId::new("p2"),
            base_unit_price: Money::xof(500),
            unit_price: Money::xof(400),
            quantity: 2,
            subtotal: Money::xof(1000),
            total: Money::xof(800),
        };
        assert_eq!(line.savings(), Money::xof(200));
    }
}
