//! Shopping cart module.
//!
//! Contains the cart container, its lines, and the pricing breakdown.

mod cart;
mod pricing;

pub use cart::{Cart, CartLine, MAX_QUANTITY_PER_LINE};
pub use pricing::{CartPricing, LinePricing};
