//! Money

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use thiserror::Error;

/// Monetary amount in the ledger currency.
pub type Amount = Money<'static, Currency>;

/// Every supported currency has two decimal places.
const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Errors converting between serialized decimal amounts and [`Amount`].
#[derive(Debug, Error, PartialEq)]
pub enum MoneyConversionError {
    /// Prices and discounts can never be negative.
    #[error("amount {0} is negative")]
    Negative(Decimal),

    /// The amount does not fit in minor units.
    #[error("amount {0} cannot be represented in minor units")]
    Unrepresentable(Decimal),

    /// The currency code is not one the storefront prices in.
    #[error("unsupported currency code: {0}")]
    UnknownCurrency(String),
}

/// Parse an ISO currency code into one of the supported currencies.
///
/// # Errors
///
/// Returns [`MoneyConversionError::UnknownCurrency`] for any other code.
pub fn parse_currency(code: &str) -> Result<&'static Currency, MoneyConversionError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "INR" => Ok(INR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(MoneyConversionError::UnknownCurrency(other.to_string())),
    }
}

/// Convert a major-unit decimal (e.g. `499.50`) into an [`Amount`].
///
/// Fractions of a minor unit are rounded half away from zero.
///
/// # Errors
///
/// - [`MoneyConversionError::Negative`]: the amount is below zero.
/// - [`MoneyConversionError::Unrepresentable`]: the amount overflows minor units.
pub fn money_from_decimal(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Amount, MoneyConversionError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyConversionError::Negative(amount));
    }

    let minor = amount
        .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or(MoneyConversionError::Unrepresentable(amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Convert an [`Amount`] back into a major-unit decimal with two places.
pub fn decimal_from_money(money: &Amount) -> Decimal {
    Decimal::new(money.to_minor_units(), 2)
}

/// Zero in the given currency.
pub fn zero(currency: &'static Currency) -> Amount {
    Money::from_minor(0, currency)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_currency_is_case_insensitive() -> TestResult {
        assert_eq!(parse_currency("inr")?, INR);
        assert_eq!(parse_currency(" GBP ")?, GBP);

        Ok(())
    }

    #[test]
    fn parse_currency_rejects_unknown_code() {
        let result = parse_currency("ABC");

        assert!(matches!(result, Err(MoneyConversionError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn money_from_decimal_converts_to_minor_units() -> TestResult {
        let money = money_from_decimal(Decimal::from_str("499.50")?, INR)?;

        assert_eq!(money, Money::from_minor(49_950, INR));

        Ok(())
    }

    #[test]
    fn money_from_decimal_rounds_half_away_from_zero() -> TestResult {
        let money = money_from_decimal(Decimal::from_str("0.125")?, INR)?;

        assert_eq!(money.to_minor_units(), 13);

        Ok(())
    }

    #[test]
    fn money_from_decimal_rejects_negative_amounts() -> TestResult {
        let amount = Decimal::from_str("-1.00")?;

        assert_eq!(
            money_from_decimal(amount, INR),
            Err(MoneyConversionError::Negative(amount))
        );

        Ok(())
    }

    #[test]
    fn money_from_decimal_rejects_overflow() {
        let result = money_from_decimal(Decimal::MAX, INR);

        assert!(matches!(
            result,
            Err(MoneyConversionError::Unrepresentable(_))
        ));
    }

    #[test]
    fn decimal_from_money_keeps_two_places() {
        let decimal = decimal_from_money(&Money::from_minor(30_000, INR));

        assert_eq!(decimal, Decimal::new(30_000, 2));
        assert_eq!(decimal.to_string(), "300.00");
    }
}
