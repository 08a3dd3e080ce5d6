//! Notifications
//!
//! Success messages emitted by cart operations. Delivery (toasts, push, ...)
//! belongs to the host application.

use std::fmt;

use mockall::automock;
use tracing::info;

use crate::items::OfferId;

/// Something the shopper should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Units of an offer were added.
    ItemAdded {
        /// Offer added
        offer_id: OfferId,
        /// Units requested
        quantity: u32,
    },

    /// A line's quantity was set.
    ItemUpdated {
        /// Offer updated
        offer_id: OfferId,
        /// New quantity
        quantity: u32,
    },

    /// A line was removed.
    ItemRemoved {
        /// Offer removed
        offer_id: OfferId,
    },

    /// The cart was emptied.
    CartCleared,

    /// A coupon was applied.
    CouponApplied {
        /// Coupon code as stored
        code: String,
    },

    /// The applied coupon was removed.
    CouponRemoved,

    /// An order was placed and the cart emptied.
    OrderCompleted,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ItemAdded { quantity, .. } => write!(f, "Added {quantity} to cart"),
            Self::ItemUpdated { quantity, .. } => write!(f, "Quantity updated to {quantity}"),
            Self::ItemRemoved { .. } => f.write_str("Item removed from cart"),
            Self::CartCleared => f.write_str("Cart cleared"),
            Self::CouponApplied { code } => write!(f, "Coupon {code} applied"),
            Self::CouponRemoved => f.write_str("Coupon removed"),
            Self::OrderCompleted => f.write_str("Order placed"),
        }
    }
}

/// Receives notifications from the ledger.
#[automock]
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Must not fail.
    fn notify(&self, notification: Notification);
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        info!(?notification, "{notification}");
    }
}
