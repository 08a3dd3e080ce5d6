//! Checkout
//!
//! Tax and shipping sit one layer above the cart: they consume the cart's
//! final price and are set by whoever runs the checkout.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::Money;

use crate::{
    discounts::{percent_of_minor, percentage_from_points},
    money::{Amount, decimal_from_money, money_from_decimal, zero},
    pricing::{CartTotals, PricingError},
};

/// Tax and shipping constants applied at checkout.
#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy {
    /// Flat tax rate on the final price.
    pub tax_rate: Percentage,

    /// Final price (major units) at or above which shipping is free.
    pub free_shipping_threshold: Decimal,

    /// Shipping fee (major units) below the threshold.
    pub shipping_fee: Decimal,
}

impl PricingPolicy {
    /// Build a policy from a tax rate in percent points.
    pub fn new(tax_percent: Decimal, free_shipping_threshold: Decimal, shipping_fee: Decimal) -> Self {
        Self {
            tax_rate: percentage_from_points(tax_percent),
            free_shipping_threshold,
            shipping_fee,
        }
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(Decimal::from(18), Decimal::from(500), Decimal::from(40))
    }
}

/// What the shopper pays, ready to hand to a payment gateway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutSummary {
    /// Sum of line totals.
    pub subtotal: Amount,

    /// Coupon discount.
    pub discount: Amount,

    /// Subtotal less discount, floored at zero.
    pub final_price: Amount,

    /// Tax on the final price.
    pub tax: Amount,

    /// Shipping charge.
    pub shipping: Amount,

    /// `final_price + tax + shipping`.
    pub grand_total: Amount,

    /// Total number of units.
    pub item_count: u64,
}

impl CheckoutSummary {
    /// Apply a pricing policy to cart totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if tax or shipping cannot be represented.
    pub fn calculate(totals: &CartTotals, policy: &PricingPolicy) -> Result<Self, PricingError> {
        let final_price = totals.final_price;
        let currency = final_price.currency();

        let tax = Money::from_minor(
            percent_of_minor(&policy.tax_rate, final_price.to_minor_units())?,
            currency,
        );

        let free_shipping = totals.item_count == 0
            || decimal_from_money(&final_price) >= policy.free_shipping_threshold;

        let shipping = if free_shipping {
            zero(currency)
        } else {
            money_from_decimal(policy.shipping_fee, currency)?
        };

        let grand_total = final_price.add(tax)?.add(shipping)?;

        Ok(Self {
            subtotal: totals.subtotal,
            discount: totals.discount,
            final_price,
            tax,
            shipping,
            grand_total,
            item_count: totals.item_count,
        })
    }
}
