//! Storage Config

use std::path::PathBuf;

use clap::Args;

use dealcart::storage::StorageKeys;

/// Local storage settings.
#[derive(Debug, Args)]
pub(crate) struct StorageConfig {
    /// Directory holding the guest cart
    #[arg(long, env = "DEALCART_STORAGE_DIR", default_value = ".dealcart")]
    pub storage_dir: PathBuf,

    /// Storage key of the guest cart
    #[arg(long, env = "DEALCART_CART_KEY", default_value = "cart")]
    pub cart_key: String,

    /// Storage key of the applied coupon
    #[arg(long, env = "DEALCART_COUPON_KEY", default_value = "applied_coupon")]
    pub coupon_key: String,

    /// Storage key marking a signed-in shopper
    #[arg(long, env = "DEALCART_SESSION_KEY", default_value = "session")]
    pub session_key: String,
}

impl StorageConfig {
    /// Keys the cart and coupon are stored under.
    pub(crate) fn keys(&self) -> StorageKeys {
        StorageKeys {
            cart: self.cart_key.clone(),
            coupon: self.coupon_key.clone(),
        }
    }
}
