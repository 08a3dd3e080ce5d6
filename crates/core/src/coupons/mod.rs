//! Coupons

use std::fmt::Debug;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub mod fixture;

pub use fixture::CouponFixtureError;

/// How a coupon's `discount_value` is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` percent off the subtotal.
    Percentage,

    /// `discount_value` off the subtotal, in major units.
    Fixed,
}

/// A discount coupon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Code the shopper types in. Matched case-insensitively.
    pub code: String,

    /// Percent points or major-unit amount, depending on `discount_type`.
    pub discount_value: Decimal,

    /// Percentage or fixed.
    pub discount_type: DiscountType,

    /// Subtotal (major units) below which the coupon does not apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_order_value: Option<Decimal>,
}

impl Coupon {
    /// A percentage coupon.
    pub fn percentage(code: impl Into<String>, percent: Decimal) -> Self {
        Self {
            code: code.into(),
            discount_value: percent,
            discount_type: DiscountType::Percentage,
            minimum_order_value: None,
        }
    }

    /// A fixed-amount coupon.
    pub fn fixed(code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            code: code.into(),
            discount_value: amount,
            discount_type: DiscountType::Fixed,
            minimum_order_value: None,
        }
    }

    /// Require a minimum subtotal.
    #[must_use]
    pub fn with_minimum_order_value(mut self, minimum: Decimal) -> Self {
        self.minimum_order_value = Some(minimum);
        self
    }

    /// Whether the discount and minimum order value are non-negative.
    pub fn is_valid(&self) -> bool {
        !self.discount_value.is_sign_negative()
            && self
                .minimum_order_value
                .is_none_or(|minimum| !minimum.is_sign_negative())
    }

    /// Whether the coupon applies to a cart with the given subtotal (major units).
    pub fn is_eligible(&self, subtotal: Decimal) -> bool {
        self.minimum_order_value
            .is_none_or(|minimum| subtotal >= minimum)
    }
}

/// Lookup of known coupons.
pub trait CouponRepository: Send + Sync + Debug {
    /// Find a coupon by code, ignoring case.
    fn find(&self, code: &str) -> Option<Coupon>;
}

/// Coupon table held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCouponRepository {
    coupons: FxHashMap<String, Coupon>,
}

impl StaticCouponRepository {
    /// Build a table from a list of coupons. Later codes replace earlier ones.
    pub fn new(coupons: impl IntoIterator<Item = Coupon>) -> Self {
        let coupons = coupons
            .into_iter()
            .map(|coupon| (coupon.code.to_uppercase(), coupon))
            .collect();

        Self { coupons }
    }

    /// Number of known coupons.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

impl CouponRepository for StaticCouponRepository {
    fn find(&self, code: &str) -> Option<Coupon> {
        self.coupons.get(&code.to_uppercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> StaticCouponRepository {
        StaticCouponRepository::new([
            Coupon::percentage("SAVE20", Decimal::from(20))
                .with_minimum_order_value(Decimal::from(200)),
            Coupon::fixed("FLAT50", Decimal::from(50)),
        ])
    }

    #[test]
    fn find_ignores_case() {
        let coupons = repository();

        let found = coupons.find("save20");

        assert_eq!(found.map(|coupon| coupon.code), Some("SAVE20".to_string()));
    }

    #[test]
    fn find_unknown_code_returns_none() {
        assert_eq!(repository().find("NOPE"), None);
    }

    #[test]
    fn negative_values_are_invalid() {
        assert!(Coupon::fixed("FLAT50", Decimal::from(50)).is_valid());
        assert!(!Coupon::percentage("EVIL", Decimal::from(-50)).is_valid());
        assert!(
            !Coupon::fixed("FLAT50", Decimal::from(50))
                .with_minimum_order_value(Decimal::from(-1))
                .is_valid()
        );
    }

    #[test]
    fn eligibility_respects_minimum_order_value() {
        let coupon =
            Coupon::percentage("SAVE20", Decimal::from(20)).with_minimum_order_value(Decimal::from(200));

        assert!(!coupon.is_eligible(Decimal::from(199)));
        assert!(coupon.is_eligible(Decimal::from(200)));
        assert!(coupon.is_eligible(Decimal::from(300)));
    }

    #[test]
    fn coupon_without_minimum_is_always_eligible() {
        let coupon = Coupon::fixed("FLAT50", Decimal::from(50));

        assert!(coupon.is_eligible(Decimal::ZERO));
    }

    #[test]
    fn coupon_serializes_with_lowercase_discount_type() -> Result<(), serde_json::Error> {
        let coupon = Coupon::fixed("FLAT50", Decimal::from(50));

        let json = serde_json::to_value(&coupon)?;

        assert_eq!(json["discountType"], "fixed");
        assert_eq!(json["code"], "FLAT50");
        assert!(json.get("minimumOrderValue").is_none());

        Ok(())
    }
}
