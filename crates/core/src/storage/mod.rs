//! Local storage
//!
//! The guest cart and the applied coupon are persisted as JSON under two
//! string keys of a device-local key/value store. Storage problems never fail a
//! cart operation: they are logged and the in-memory ledger stays authoritative.

use std::{
    fmt::Debug,
    sync::{Arc, PoisonError},
};

use rusty_money::iso::Currency;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    coupons::Coupon,
    items::{LineItem, QuantityBounds, merge_line},
};

mod file;
mod memory;
mod records;

pub use file::FileStore;
pub use memory::MemoryStore;

use records::StoredLineItem;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error from the backing medium.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be stored by this backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The store's lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

/// String key/value store scoped to one device.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium fails.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Keys the cart and coupon live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Key for the ordered list of line items.
    pub cart: String,

    /// Key for the applied coupon.
    pub coupon: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            cart: "cart".to_string(),
            coupon: "applied_coupon".to_string(),
        }
    }
}

/// Cart persistence on top of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct CartStorage {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl CartStorage {
    /// Wrap a store using the given keys.
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    /// Keys in use.
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Read the persisted guest cart, priced in `currency`.
    ///
    /// Stored lines get the same treatment as a server cart: zero quantities
    /// are dropped, quantities are clamped into `bounds` and repeated offers
    /// are merged. A normalized cart is written back. A value that fails to
    /// decode or carries an invalid price is removed so the next read starts
    /// clean.
    pub fn load_items(&self, currency: &'static Currency, bounds: QuantityBounds) -> Vec<LineItem> {
        let Some(stored) = self.read::<Vec<StoredLineItem>>(&self.keys.cart) else {
            return Vec::new();
        };

        let stored_len = stored.len();

        let decoded = stored
            .into_iter()
            .filter(|item| {
                let keep = item.quantity() > 0;

                if !keep {
                    warn!(key = %self.keys.cart, offer_id = %item.offer_id(), "dropping stored cart item with zero quantity");
                }

                keep
            })
            .map(|item| item.into_line_item(currency))
            .collect::<Result<Vec<_>, _>>();

        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(error) => {
                warn!(key = %self.keys.cart, %error, "discarding stored cart with invalid prices");
                self.discard(&self.keys.cart);

                return Vec::new();
            }
        };

        let mut items = Vec::with_capacity(decoded.len());

        for line in decoded.iter().cloned() {
            merge_line(&mut items, line, bounds);
        }

        if items.len() != stored_len || items != decoded {
            debug!(key = %self.keys.cart, "rewriting normalized stored cart");
            self.save_items(&items);
        }

        items
    }

    /// Persist the guest cart.
    pub fn save_items(&self, items: &[LineItem]) {
        let stored: Vec<StoredLineItem> = items.iter().map(StoredLineItem::from).collect();

        self.write(&self.keys.cart, &stored);
    }

    /// Remove the persisted guest cart.
    pub fn clear_items(&self) {
        self.discard(&self.keys.cart);
    }

    /// Read the persisted coupon.
    pub fn load_coupon(&self) -> Option<Coupon> {
        self.read(&self.keys.coupon)
    }

    /// Persist the applied coupon.
    pub fn save_coupon(&self, coupon: &Coupon) {
        self.write(&self.keys.coupon, coupon);
    }

    /// Remove the persisted coupon.
    pub fn clear_coupon(&self) {
        self.discard(&self.keys.coupon);
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(key, %error, "failed to read from local storage");

                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key, %error, "removing corrupted local storage entry");
                self.discard(key);

                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(key, %error, "failed to encode local storage entry");

                return;
            }
        };

        if let Err(error) = self.store.set(key, &encoded) {
            warn!(key, %error, "failed to write to local storage");
        } else {
            debug!(key, bytes = encoded.len(), "wrote local storage entry");
        }
    }

    fn discard(&self, key: &str) {
        if let Err(error) = self.store.remove(key) {
            warn!(key, %error, "failed to remove local storage entry");
        }
    }
}
