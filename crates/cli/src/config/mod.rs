//! CLI configuration module

use clap::Parser;
use thiserror::Error;

use dealcart::{coupons::CouponFixtureError, money::MoneyConversionError};

use crate::{
    commands::Command,
    config::{
        backend::BackendConfig, ledger::LedgerConfig, logging::LoggingConfig,
        pricing::PricingConfig, storage::StorageConfig,
    },
};

pub(crate) mod backend;
pub(crate) mod ledger;
pub(crate) mod logging;
pub(crate) mod pricing;
pub(crate) mod storage;

pub(crate) use logging::LogFormat;

/// Errors turning configuration values into runtime settings.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The currency code is not supported.
    #[error(transparent)]
    Currency(#[from] MoneyConversionError),

    /// Minimum quantity is zero or above the maximum.
    #[error("invalid quantity bounds: min {min}, max {max}")]
    QuantityBounds {
        /// Configured minimum
        min: u32,
        /// Configured maximum
        max: u32,
    },

    /// The coupon table could not be loaded.
    #[error(transparent)]
    Coupons(#[from] CouponFixtureError),
}

/// Dealcart CLI configuration
#[derive(Debug, Parser)]
#[command(name = "dealcart", about = "Deals storefront cart", long_about = None)]
pub(crate) struct CliConfig {
    /// Ledger settings.
    #[command(flatten)]
    pub ledger: LedgerConfig,

    /// Local storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Checkout tax and shipping settings.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Cart API settings.
    #[command(flatten)]
    pub backend: BackendConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Cart operation to run.
    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
