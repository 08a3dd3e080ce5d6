//! Dealcart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    backend::{
        BackendError, CartBackend, HttpBackendConfig, HttpCartBackend, RemoteCart,
        RemoteCartItem,
    },
    checkout::{CheckoutSummary, PricingPolicy},
    coupons::{Coupon, CouponRepository, DiscountType, StaticCouponRepository},
    items::{ItemDetails, LineItem, OfferId, QuantityBounds},
    ledger::{CartError, CartLedger, CouponOutcome, LedgerSettings, Session},
    money::{Amount, parse_currency},
    notifications::{LogNotifier, Notification, Notifier},
    pricing::{CartTotals, PricingError},
    storage::{CartStorage, FileStore, KeyValueStore, MemoryStore, StorageKeys},
};
