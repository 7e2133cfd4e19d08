use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Money Value Object
// ============================================================================
//
// Immutable fixed-point amount tagged with an ISO-4217 style currency code.
// Every operation produces a new value; amounts are never negative.
// Amounts fit NUMERIC(10,2): at most two decimal places and no more than
// 99,999,999.99, so both stores hold exactly the same value.
//
// ============================================================================

pub const DEFAULT_CURRENCY: &str = "EUR";

pub const MAX_SCALE: u32 = 2;

/// Largest storable amount in minor units (99,999,999.99).
pub const MAX_AMOUNT_MINOR: i64 = 9_999_999_999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Amount cannot be negative: {0}")]
    InvalidAmount(Decimal),

    #[error("Cannot operate on different currencies: {left} and {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    #[error("Amount has more than {MAX_SCALE} decimal places: {0}")]
    InvalidPrecision(Decimal),

    #[error("Amount exceeds the supported maximum")]
    Overflow,
}

/// Three-letter upper-case currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl AsRef<str>) -> Result<Self, MoneyError> {
        let code = code.as_ref().trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidCurrency(code));
        }
        Ok(Self(code))
    }

    pub fn eur() -> Self {
        Self(DEFAULT_CURRENCY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::eur()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::InvalidAmount(amount));
        }
        if amount.normalize().scale() > MAX_SCALE {
            return Err(MoneyError::InvalidPrecision(amount));
        }
        if amount > Self::max_amount() {
            return Err(MoneyError::Overflow);
        }
        Ok(Self { amount, currency })
    }

    pub fn max_amount() -> Decimal {
        Decimal::new(MAX_AMOUNT_MINOR, MAX_SCALE)
    }

    /// Builds an amount from minor units, e.g. `from_minor(1050, eur)` is 10.50.
    pub fn from_minor(minor: i64, currency: Currency) -> Result<Self, MoneyError> {
        Self::new(Decimal::new(minor, 2), currency)
    }

    pub fn zero(currency: Currency) -> Self {
        Self { amount: Decimal::ZERO, currency }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self.amount.checked_add(other.amount).ok_or(MoneyError::Overflow)?;
        Money::new(amount, self.currency.clone())
    }

    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self.amount.checked_sub(other.amount).ok_or(MoneyError::Overflow)?;
        Money::new(amount, self.currency.clone())
    }

    pub fn multiply(&self, factor: i64) -> Result<Money, MoneyError> {
        let amount = self
            .amount
            .checked_mul(Decimal::from(factor))
            .ok_or(MoneyError::Overflow)?;
        Money::new(amount, self.currency.clone())
    }

    /// Same amount (numerically, so 10.0 equals 10.00) and same currency.
    pub fn equals(&self, other: &Money) -> bool {
        self == other
    }

    pub fn greater_than(&self, other: &Money) -> Result<bool, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount > other.amount)
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur(minor: i64) -> Money {
        Money::from_minor(minor, Currency::eur()).unwrap()
    }

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::new("USD").unwrap()).unwrap()
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        for minor in [-1, -100, -999_999] {
            let result = Money::from_minor(minor, Currency::eur());
            assert!(matches!(result, Err(MoneyError::InvalidAmount(_))));
        }
    }

    #[test]
    fn test_zero_is_valid() {
        let zero = Money::new(Decimal::ZERO, Currency::eur()).unwrap();
        assert!(zero.equals(&Money::zero(Currency::eur())));
    }

    #[test]
    fn test_add_and_subtract() {
        let total = eur(1050).add(&eur(250)).unwrap();
        assert_eq!(total.amount(), Decimal::new(1300, 2));

        let rest = total.subtract(&eur(300)).unwrap();
        assert_eq!(rest.amount(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_subtract_below_zero_fails() {
        let result = eur(100).subtract(&eur(200));
        assert!(matches!(result, Err(MoneyError::InvalidAmount(_))));
    }

    #[test]
    fn test_currency_mismatch() {
        assert!(matches!(eur(100).add(&usd(100)), Err(MoneyError::CurrencyMismatch { .. })));
        assert!(matches!(eur(100).subtract(&usd(50)), Err(MoneyError::CurrencyMismatch { .. })));
        assert!(matches!(eur(100).greater_than(&usd(50)), Err(MoneyError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_multiply() {
        let price = eur(1000);
        assert_eq!(price.multiply(3).unwrap().amount(), Decimal::new(3000, 2));
        assert!(matches!(price.multiply(-2), Err(MoneyError::InvalidAmount(_))));
        // operands are untouched
        assert_eq!(price.amount(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_amount_must_fit_two_decimal_places() {
        let result = Money::new(Decimal::new(9999, 3), Currency::eur());
        assert!(matches!(result, Err(MoneyError::InvalidPrecision(_))));

        // trailing zeros are not extra precision
        let padded = Money::new(Decimal::new(10_500, 3), Currency::eur()).unwrap();
        assert!(padded.equals(&eur(1050)));
    }

    #[test]
    fn test_amount_is_capped_at_column_maximum() {
        let max = Money::new(Money::max_amount(), Currency::eur()).unwrap();
        assert_eq!(max.amount(), Decimal::new(9_999_999_999, 2));

        let result = Money::new(Decimal::new(100_000_000, 0), Currency::eur());
        assert_eq!(result, Err(MoneyError::Overflow));
        assert_eq!(max.add(&eur(1)), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_multiply_overflow_is_an_error() {
        let price = Money::new(Decimal::new(50_000_000, 0), Currency::eur()).unwrap();
        assert_eq!(price.multiply(3), Err(MoneyError::Overflow));
        assert_eq!(price.multiply(i64::MAX), Err(MoneyError::Overflow));
        assert_eq!(eur(1).multiply(i64::MAX), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_equals_ignores_scale_but_not_currency() {
        let a = Money::new(Decimal::new(100, 1), Currency::eur()).unwrap();
        let b = Money::new(Decimal::new(1000, 2), Currency::eur()).unwrap();
        assert!(a.equals(&b));
        assert!(!eur(1000).equals(&usd(1000)));
    }

    #[test]
    fn test_greater_than() {
        assert!(eur(200).greater_than(&eur(100)).unwrap());
        assert!(!eur(100).greater_than(&eur(100)).unwrap());
    }

    #[test]
    fn test_currency_validation() {
        assert_eq!(Currency::new("usd").unwrap().as_str(), "USD");
        assert!(Currency::new("EURO").is_err());
        assert!(Currency::new("E1R").is_err());
        assert!(Currency::new("").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(eur(15000).to_string(), "150.00 EUR");
    }
}
