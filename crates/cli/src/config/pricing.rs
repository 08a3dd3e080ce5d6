//! Pricing Config

use clap::Args;
use rust_decimal::Decimal;

use dealcart::checkout::PricingPolicy;

/// Checkout tax and shipping settings.
#[derive(Debug, Args)]
pub(crate) struct PricingConfig {
    /// Tax rate in percent
    #[arg(long, env = "DEALCART_TAX_RATE", default_value = "18")]
    pub tax_rate: Decimal,

    /// Final price at or above which shipping is free
    #[arg(long, env = "DEALCART_FREE_SHIPPING_THRESHOLD", default_value = "500")]
    pub free_shipping_threshold: Decimal,

    /// Shipping fee below the free shipping threshold
    #[arg(long, env = "DEALCART_SHIPPING_FEE", default_value = "40")]
    pub shipping_fee: Decimal,
}

impl PricingConfig {
    /// Pricing policy for checkout.
    pub(crate) fn policy(&self) -> PricingPolicy {
        PricingPolicy::new(
            self.tax_rate,
            self.free_shipping_threshold,
            self.shipping_fee,
        )
    }
}
