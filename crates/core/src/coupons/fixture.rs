//! Coupon fixtures
//!
//! Coupon tables are described in YAML, keyed by code:
//!
//! ```yaml
//! coupons:
//!   SAVE20:
//!     discount: "20%"
//!     minimum_order: "200.00"
//!   FLAT50:
//!     discount: "50.00"
//! ```
//!
//! A discount ending in `%` is a percentage, anything else a fixed amount.

use std::{fs, path::Path, str::FromStr};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use super::{Coupon, DiscountType, StaticCouponRepository};

const BUILTIN_COUPONS: &str = include_str!("../../fixtures/coupons.yml");

/// Coupon fixture errors.
#[derive(Debug, Error)]
pub enum CouponFixtureError {
    /// IO error reading the fixture file.
    #[error("failed to read coupon fixture: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse coupon YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Discount value could not be parsed.
    #[error("invalid discount for coupon {code}: {value}")]
    InvalidDiscount {
        /// Coupon code
        code: String,
        /// Raw discount value
        value: String,
    },

    /// Minimum order value could not be parsed.
    #[error("invalid minimum order for coupon {code}: {value}")]
    InvalidMinimumOrder {
        /// Coupon code
        code: String,
        /// Raw minimum order value
        value: String,
    },
}

#[derive(Debug, Deserialize)]
struct CouponsFixture {
    coupons: FxHashMap<String, CouponFixture>,
}

#[derive(Debug, Deserialize)]
struct CouponFixture {
    discount: String,

    #[serde(default)]
    minimum_order: Option<String>,
}

impl StaticCouponRepository {
    /// Parse a coupon table from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a value cannot be parsed.
    pub fn from_yaml(yaml: &str) -> Result<Self, CouponFixtureError> {
        let fixture: CouponsFixture = serde_norway::from_str(yaml)?;

        let coupons = fixture
            .coupons
            .into_iter()
            .map(|(code, coupon)| parse_coupon(code, &coupon))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(coupons))
    }

    /// Load a coupon table from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CouponFixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// The coupon table shipped with the storefront.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded fixture cannot be parsed.
    pub fn builtin() -> Result<Self, CouponFixtureError> {
        Self::from_yaml(BUILTIN_COUPONS)
    }
}

fn parse_coupon(code: String, fixture: &CouponFixture) -> Result<Coupon, CouponFixtureError> {
    let (discount_value, discount_type) =
        parse_discount(&fixture.discount).ok_or_else(|| CouponFixtureError::InvalidDiscount {
            code: code.clone(),
            value: fixture.discount.clone(),
        })?;

    let minimum_order_value = match &fixture.minimum_order {
        Some(value) => Some(parse_amount(value).ok_or_else(|| {
            CouponFixtureError::InvalidMinimumOrder {
                code: code.clone(),
                value: value.clone(),
            }
        })?),
        None => None,
    };

    Ok(Coupon {
        code,
        discount_value,
        discount_type,
        minimum_order_value,
    })
}

/// Parse `"20%"` as a percentage and `"50.00"` as a fixed amount.
fn parse_discount(value: &str) -> Option<(Decimal, DiscountType)> {
    let trimmed = value.trim();

    if let Some(percent) = trimmed.strip_suffix('%') {
        return parse_amount(percent).map(|percent| (percent, DiscountType::Percentage));
    }

    parse_amount(trimmed).map(|amount| (amount, DiscountType::Fixed))
}

fn parse_amount(value: &str) -> Option<Decimal> {
    Decimal::from_str(value.trim())
        .ok()
        .filter(|amount| !amount.is_sign_negative())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::coupons::CouponRepository;

    use super::*;

    #[test]
    fn builtin_table_contains_documented_coupons() -> TestResult {
        let coupons = StaticCouponRepository::builtin()?;

        let save20 = coupons.find("SAVE20").ok_or("SAVE20 missing")?;
        let flat50 = coupons.find("flat50").ok_or("FLAT50 missing")?;

        assert_eq!(save20.discount_type, DiscountType::Percentage);
        assert_eq!(save20.discount_value, Decimal::from(20));
        assert_eq!(save20.minimum_order_value, Some(Decimal::from(200)));

        assert_eq!(flat50.discount_type, DiscountType::Fixed);
        assert_eq!(flat50.discount_value, Decimal::from(50));
        assert_eq!(flat50.minimum_order_value, Some(Decimal::from(1000)));

        Ok(())
    }

    #[test]
    fn from_yaml_parses_coupons_without_minimum() -> TestResult {
        let coupons = StaticCouponRepository::from_yaml(
            "coupons:\n  WELCOME:\n    discount: \"10%\"\n",
        )?;

        let welcome = coupons.find("welcome").ok_or("WELCOME missing")?;

        assert_eq!(welcome.code, "WELCOME");
        assert_eq!(welcome.minimum_order_value, None);

        Ok(())
    }

    #[test]
    fn from_yaml_rejects_invalid_discount() {
        let result =
            StaticCouponRepository::from_yaml("coupons:\n  BAD:\n    discount: \"lots\"\n");

        assert!(matches!(
            result,
            Err(CouponFixtureError::InvalidDiscount { code, .. }) if code == "BAD"
        ));
    }

    #[test]
    fn from_yaml_rejects_negative_minimum_order() {
        let result = StaticCouponRepository::from_yaml(
            "coupons:\n  BAD:\n    discount: \"5%\"\n    minimum_order: \"-1\"\n",
        );

        assert!(matches!(
            result,
            Err(CouponFixtureError::InvalidMinimumOrder { .. })
        ));
    }

    #[test]
    fn from_yaml_rejects_malformed_yaml() {
        let result = StaticCouponRepository::from_yaml("coupons: [");

        assert!(matches!(result, Err(CouponFixtureError::Yaml(_))));
    }

    #[test]
    fn load_reads_fixture_from_disk() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("coupons.yml");

        fs::write(&path, "coupons:\n  FLAT10:\n    discount: \"10.00\"\n")?;

        let coupons = StaticCouponRepository::load(&path)?;

        assert_eq!(coupons.len(), 1);
        assert!(coupons.find("FLAT10").is_some());

        Ok(())
    }
}
