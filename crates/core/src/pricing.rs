//! Pricing
//!
//! Derived cart values. Nothing here is cached: every total is recomputed from
//! the line items and the applied coupon.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    coupons::Coupon,
    discounts::{DiscountError, coupon_discount},
    items::LineItem,
    money::{Amount, MoneyConversionError, zero},
};

/// Errors that can occur while calculating totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line total or sum overflowed minor units.
    #[error("cart total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Errors bubbled up from discount calculation.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// A configured amount could not be converted to money.
    #[error(transparent)]
    Amount(#[from] MoneyConversionError),
}

/// Unit price multiplied by quantity.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product overflows minor units.
pub fn line_total(item: &LineItem) -> Result<Amount, PricingError> {
    let minor = item
        .unit_price()
        .to_minor_units()
        .checked_mul(i64::from(item.quantity()))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, item.unit_price().currency()))
}

/// Calculates the total price of a list of items, zero when there are none.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: a line total overflowed.
/// - [`PricingError::Money`]: wrapped money arithmetic or currency mismatch error.
pub fn total_price(items: &[LineItem], currency: &'static Currency) -> Result<Amount, PricingError> {
    items.iter().try_fold(zero(currency), |acc, item| {
        Ok(acc.add(line_total(item)?)?)
    })
}

/// Total number of units across all lines.
pub fn total_item_count(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity())).sum()
}

/// Savings against the original price, for lines that have one.
///
/// # Errors
///
/// Returns a [`PricingError`] if any arithmetic overflows.
pub fn total_savings(items: &[LineItem], currency: &'static Currency) -> Result<Amount, PricingError> {
    items.iter().try_fold(zero(currency), |acc, item| {
        let Some(original) = item.original_unit_price() else {
            return Ok(acc);
        };

        let per_unit = original.to_minor_units() - item.unit_price().to_minor_units();

        if per_unit <= 0 {
            return Ok(acc);
        }

        let saved = per_unit
            .checked_mul(i64::from(item.quantity()))
            .ok_or(PricingError::Overflow)?;

        Ok(acc.add(Money::from_minor(saved, currency))?)
    })
}

/// Totals derived from a cart's lines and applied coupon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    /// Sum of line totals.
    pub subtotal: Amount,

    /// Coupon discount; zero without an eligible coupon.
    pub discount: Amount,

    /// `subtotal - discount`, never below zero.
    pub final_price: Amount,

    /// Savings against original prices, for display.
    pub savings: Amount,

    /// Total number of units.
    pub item_count: u64,
}

impl CartTotals {
    /// Calculate totals for the given lines and coupon.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any arithmetic overflows or a discount is invalid.
    pub fn calculate(
        items: &[LineItem],
        coupon: Option<&Coupon>,
        currency: &'static Currency,
    ) -> Result<Self, PricingError> {
        let subtotal = total_price(items, currency)?;

        let discount = match coupon {
            Some(coupon) => coupon_discount(coupon, &subtotal)?,
            None => zero(currency),
        };

        Ok(Self {
            subtotal,
            discount,
            final_price: floored_difference(subtotal, discount)?,
            savings: total_savings(items, currency)?,
            item_count: total_item_count(items),
        })
    }
}

/// `minuend - subtrahend`, or zero when the subtrahend is larger.
pub(crate) fn floored_difference(minuend: Amount, subtrahend: Amount) -> Result<Amount, PricingError> {
    if subtrahend.to_minor_units() >= minuend.to_minor_units() {
        return Ok(zero(minuend.currency()));
    }

    Ok(minuend.sub(subtrahend)?)
}
