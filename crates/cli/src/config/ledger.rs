//! Ledger Config

use std::{path::PathBuf, sync::Arc};

use clap::Args;

use dealcart::{
    coupons::{CouponRepository, StaticCouponRepository},
    items::QuantityBounds,
    ledger::LedgerSettings,
    money::parse_currency,
};

use super::ConfigError;

/// Cart ledger settings.
#[derive(Debug, Args)]
pub(crate) struct LedgerConfig {
    /// ISO currency the storefront prices in (INR, GBP, USD, EUR)
    #[arg(long, env = "DEALCART_CURRENCY", default_value = "INR")]
    pub currency: String,

    /// Smallest quantity a cart line may hold
    #[arg(long, env = "DEALCART_MIN_QUANTITY", default_value_t = 1)]
    pub min_quantity: u32,

    /// Largest quantity a cart line may hold
    #[arg(long, env = "DEALCART_MAX_QUANTITY", default_value_t = 10)]
    pub max_quantity: u32,

    /// Purge the guest cart from local storage on logout
    #[arg(long, env = "DEALCART_CLEAR_GUEST_CART_ON_LOGOUT", default_value_t = false)]
    pub clear_guest_cart_on_logout: bool,

    /// YAML coupon table; the built-in table is used when unset
    #[arg(long, env = "DEALCART_COUPONS_FILE")]
    pub coupons_file: Option<PathBuf>,
}

impl LedgerConfig {
    /// Validated ledger settings.
    pub(crate) fn settings(&self) -> Result<LedgerSettings, ConfigError> {
        if self.min_quantity == 0 || self.min_quantity > self.max_quantity {
            return Err(ConfigError::QuantityBounds {
                min: self.min_quantity,
                max: self.max_quantity,
            });
        }

        Ok(LedgerSettings {
            currency: parse_currency(&self.currency)?,
            quantity: QuantityBounds {
                min: self.min_quantity,
                max: self.max_quantity,
            },
            clear_guest_cart_on_logout: self.clear_guest_cart_on_logout,
        })
    }

    /// Coupon table from the configured file, or the built-in one.
    pub(crate) fn coupons(&self) -> Result<Arc<dyn CouponRepository>, ConfigError> {
        let coupons = match &self.coupons_file {
            Some(path) => StaticCouponRepository::load(path)?,
            None => StaticCouponRepository::builtin()?,
        };

        Ok(Arc::new(coupons))
    }
}
