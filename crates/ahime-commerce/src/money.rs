//! Money type for representing monetary values.
//!
//! Amounts are integers in the smallest unit of the currency. The franc CFA
//! has no subunit, so an `XOF` amount of `2400` is 2 400 FCFA.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// West African CFA franc, used in Bénin.
    #[default]
    XOF,
    EUR,
    USD,
}

impl Currency {
    /// Get the ISO currency code (e.g., "XOF").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::XOF => "XOF",
            Currency::EUR => "EUR",
            Currency::USD => "USD",
        }
    }

    /// Get the display symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::XOF => "FCFA",
            Currency::EUR => "\u{20ac}",
            Currency::USD => "$",
        }
    }

    /// Number of decimal places of the minor unit.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::XOF => 0,
            Currency::EUR | Currency::USD => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "XOF" | "FCFA" | "CFA" => Some(Currency::XOF),
            "EUR" => Some(Currency::EUR),
            "USD" => Some(Currency::USD),
            _ => None,
        }
    }

    fn symbol_first(&self) -> bool {
        matches!(self, Currency::USD)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Shorthand for a franc CFA amount.
    pub fn xof(amount: i64) -> Self {
        Self::new(amount, Currency::XOF)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Add another Money value, `None` on currency mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Subtract another Money value, `None` on currency mismatch or overflow.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a scalar, `None` on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Sum an iterator of Money values in `currency`.
    ///
    /// Returns `None` if any value is in another currency or the sum overflows.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    /// Convert to a decimal value in major units.
    pub fn to_decimal(&self) -> f64 {
        let divisor = 10_i64.pow(self.currency.decimal_places());
        self.amount as f64 / divisor as f64
    }

    /// Format for display, e.g. "2 400 FCFA", "12,50 €" or "$12.50".
    pub fn display(&self) -> String {
        let amount = self.display_amount();
        if self.currency.symbol_first() {
            match amount.strip_prefix('-') {
                Some(abs) => format!("-{}{}", self.currency.symbol(), abs),
                None => format!("{}{}", self.currency.symbol(), amount),
            }
        } else {
            format!("{} {}", amount, self.currency.symbol())
        }
    }

    /// Format the amount without symbol, using the currency's conventions.
    pub fn display_amount(&self) -> String {
        let (group_sep, decimal_sep) = match self.currency {
            Currency::USD => (',', '.'),
            Currency::XOF | Currency::EUR => (' ', ','),
        };
        let places = self.currency.decimal_places();
        let divisor = 10_u64.pow(places);
        let magnitude = self.amount.unsigned_abs();
        let major = group_digits(magnitude / divisor, group_sep);

        let mut out = String::new();
        if self.amount < 0 {
            out.push('-');
        }
        out.push_str(&major);
        if places > 0 {
            out.push(decimal_sep);
            out.push_str(&format!(
                "{:0width$}",
                magnitude % divisor,
                width = places as usize
            ));
        }
        out
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn group_digits(value: u64, sep: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xof_display() {
        assert_eq!(Money::xof(2400).display(), "2 400 FCFA");
        assert_eq!(Money::xof(500).display(), "500 FCFA");
        assert_eq!(Money::xof(1_250_000).display(), "1 250 000 FCFA");
        assert_eq!(Money::xof(0).display(), "0 FCFA");
    }

    #[test]
    fn test_eur_and_usd_display() {
        assert_eq!(Money::new(1250, Currency::EUR).display(), "12,50 \u{20ac}");
        assert_eq!(Money::new(123_456, Currency::EUR).display(), "1 234,56 \u{20ac}");
        assert_eq!(Money::new(4999, Currency::USD).display(), "$49.99");
        assert_eq!(Money::new(-505, Currency::USD).display(), "-$5.05");
    }

    #[test]
    fn test_money_to_decimal() {
        let m = Money::new(4999, Currency::EUR);
        assert!((m.to_decimal() - 49.99).abs() < 0.001);
        assert!((Money::xof(1000).to_decimal() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_try_add_rejects_currency_mismatch() {
        let a = Money::xof(1000);
        let b = Money::new(1000, Currency::EUR);
        assert_eq!(a.try_add(&b), None);
        assert_eq!(a.try_add(&Money::xof(500)), Some(Money::xof(1500)));
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        assert_eq!(Money::xof(i64::MAX).try_add(&Money::xof(1)), None);
        assert_eq!(Money::xof(i64::MAX / 2).try_multiply(3), None);
        assert_eq!(Money::xof(400).try_multiply(3), Some(Money::xof(1200)));
        assert_eq!(Money::xof(1000).try_subtract(&Money::xof(400)), Some(Money::xof(600)));
    }

    #[test]
    fn test_try_sum() {
        let values = [Money::xof(2000), Money::xof(400)];
        assert_eq!(Money::try_sum(values.iter(), Currency::XOF), Some(Money::xof(2400)));
        assert_eq!(Money::try_sum(values.iter(), Currency::EUR), None);
        assert_eq!(Money::try_sum(std::iter::empty(), Currency::XOF), Some(Money::xof(0)));
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("xof"), Some(Currency::XOF));
        assert_eq!(Currency::from_code("FCFA"), Some(Currency::XOF));
        assert_eq!(Currency::from_code("EUR"), Some(Currency::EUR));
        assert_eq!(Currency::from_code("JPY"), None);
    }
}
