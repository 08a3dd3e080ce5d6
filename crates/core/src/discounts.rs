//! Discounts
//!
//! Coupon discount arithmetic, shared by cart totals and checkout tax.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::Money;
use thiserror::Error;

use crate::{
    coupons::{Coupon, DiscountType},
    money::{Amount, MoneyConversionError, decimal_from_money, money_from_decimal, zero},
};

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// A fixed discount amount was not a valid money amount.
    #[error(transparent)]
    Amount(#[from] MoneyConversionError),
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Percent points (e.g. `20`) as a fractional [`Percentage`] (e.g. `0.2`).
pub fn percentage_from_points(points: Decimal) -> Percentage {
    Percentage::from(points / Decimal::ONE_HUNDRED)
}

/// Discount a coupon grants on the given subtotal.
///
/// Zero when the subtotal is below the coupon's minimum order value. Fixed
/// discounts are not capped at the subtotal; flooring the final price is the
/// caller's concern.
///
/// # Errors
///
/// - [`DiscountError::PercentConversion`]: the percentage overflowed.
/// - [`DiscountError::Amount`]: a fixed discount was negative or too large.
pub fn coupon_discount(coupon: &Coupon, subtotal: &Amount) -> Result<Amount, DiscountError> {
    let currency = subtotal.currency();

    if !coupon.is_eligible(decimal_from_money(subtotal)) {
        return Ok(zero(currency));
    }

    match coupon.discount_type {
        DiscountType::Percentage => {
            let percent = percentage_from_points(coupon.discount_value);
            let minor = percent_of_minor(&percent, subtotal.to_minor_units())?;

            Ok(Money::from_minor(minor, currency))
        }
        DiscountType::Fixed => Ok(money_from_decimal(coupon.discount_value, currency)?),
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));
    }

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        let percent = Percentage::from(0.25);
        let result = percent_of_minor(&percent, 200)?;

        assert_eq!(result, 50);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        let percent = percentage_from_points(Decimal::from(15));

        // 15% of 3.30 is 0.495
        assert_eq!(percent_of_minor(&percent, 330)?, 50);

        Ok(())
    }

    #[test]
    fn percentage_coupon_discounts_share_of_subtotal() -> TestResult {
        let coupon = Coupon::percentage("SAVE20", Decimal::from(20))
            .with_minimum_order_value(Decimal::from(200));

        let discount = coupon_discount(&coupon, &Money::from_minor(30_000, INR))?;

        assert_eq!(discount, Money::from_minor(6_000, INR));

        Ok(())
    }

    #[test]
    fn coupon_below_minimum_discounts_nothing() -> TestResult {
        let coupon =
            Coupon::fixed("FLAT50", Decimal::from(50)).with_minimum_order_value(Decimal::from(1000));

        let discount = coupon_discount(&coupon, &Money::from_minor(30_000, INR))?;

        assert_eq!(discount, Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn fixed_coupon_is_not_capped_at_subtotal() -> TestResult {
        let coupon = Coupon::fixed("FLAT50", Decimal::from(50));

        let discount = coupon_discount(&coupon, &Money::from_minor(2_000, INR))?;

        assert_eq!(discount, Money::from_minor(5_000, INR));

        Ok(())
    }

    #[test]
    fn percentage_coupon_on_empty_subtotal_is_zero() -> TestResult {
        let coupon = Coupon::percentage("WELCOME10", Decimal::from(10));

        let discount = coupon_discount(&coupon, &Money::from_minor(0, INR))?;

        assert_eq!(discount, Money::from_minor(0, INR));

        Ok(())
    }
}
