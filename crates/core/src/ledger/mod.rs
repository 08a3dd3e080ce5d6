//! Cart ledger
//!
//! The shopper's cart: line items, the applied coupon and the derived totals.
//!
//! A guest ledger keeps its items in local storage. Once authenticated the
//! backend becomes the store of record: every mutation goes through it and the
//! ledger reloads the server cart afterwards. The applied coupon is always kept
//! locally.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use rusty_money::iso::{Currency, INR};
use tracing::{debug, warn};

use crate::{
    backend::{BackendError, CartBackend, ingest},
    checkout::{CheckoutSummary, PricingPolicy},
    coupons::{Coupon, CouponRepository},
    items::{ItemDetails, LineItem, OfferId, QuantityBounds},
    money::{Amount, decimal_from_money},
    notifications::{LogNotifier, Notification, Notifier},
    pricing::{CartTotals, PricingError, total_item_count, total_price},
    storage::CartStorage,
};

mod errors;

pub use errors::CartError;

/// Ledger configuration.
#[derive(Debug, Clone, Copy)]
pub struct LedgerSettings {
    /// Currency every price is held in.
    pub currency: &'static Currency,

    /// Allowed line quantities.
    pub quantity: QuantityBounds,

    /// Purge the guest cart from local storage on logout.
    pub clear_guest_cart_on_logout: bool,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            currency: INR,
            quantity: QuantityBounds::default(),
            clear_guest_cart_on_logout: false,
        }
    }
}

/// Who owns the cart.
#[derive(Clone, Default)]
pub enum Session {
    /// Local storage is the store of record.
    #[default]
    Guest,

    /// The backend is the store of record.
    Authenticated(Arc<dyn CartBackend>),
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => f.write_str("Guest"),
            Self::Authenticated(_) => f.write_str("Authenticated"),
        }
    }
}

/// Result of [`CartLedger::apply_coupon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponOutcome {
    /// The coupon is now applied.
    Applied {
        /// Code as stored in the coupon table
        code: String,
    },

    /// No coupon has that code.
    NotFound,

    /// The subtotal is below the coupon's minimum order value.
    BelowMinimum {
        /// Required subtotal, in major units
        minimum_order_value: Decimal,
    },
}

impl CouponOutcome {
    /// Whether the coupon was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// A shopper's cart.
pub struct CartLedger {
    items: Vec<LineItem>,
    applied_coupon: Option<Coupon>,
    session: Session,
    settings: LedgerSettings,
    storage: CartStorage,
    coupons: Arc<dyn CouponRepository>,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for CartLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartLedger")
            .field("items", &self.items)
            .field("applied_coupon", &self.applied_coupon)
            .field("session", &self.session)
            .field("settings", &self.settings)
            .field("storage", &self.storage)
            .field("coupons", &self.coupons)
            .finish_non_exhaustive()
    }
}

impl CartLedger {
    /// Guest ledger restored from local storage.
    pub fn load(
        settings: LedgerSettings,
        storage: CartStorage,
        coupons: Arc<dyn CouponRepository>,
    ) -> Self {
        let items = storage.load_items(settings.currency, settings.quantity);
        let applied_coupon = restore_coupon(&storage, coupons.as_ref());

        debug!(
            items = items.len(),
            coupon = applied_coupon.as_ref().map(|coupon| coupon.code.as_str()),
            "loaded cart from local storage"
        );

        Self {
            items,
            applied_coupon,
            session: Session::Guest,
            settings,
            storage,
            coupons,
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Replace the notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Line items in cart order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Line for an offer, if present.
    pub fn item(&self, offer_id: &str) -> Option<&LineItem> {
        self.items
            .iter()
            .find(|item| item.offer_id().as_str() == offer_id)
    }

    /// Applied coupon, if any.
    pub fn applied_coupon(&self) -> Option<&Coupon> {
        self.applied_coupon.as_ref()
    }

    /// Whether the backend is the store of record.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.session, Session::Authenticated(_))
    }

    /// Ledger configuration.
    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Add units of an offer.
    ///
    /// A guest cart increments an existing line or appends a new one built
    /// from `details`. Quantities are clamped to the configured maximum.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidOfferId`]: the offer id is empty.
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::InvalidPrice`]: `details` carried a negative price.
    /// - [`CartError::Backend`]: the backend call failed; the ledger is unchanged.
    pub async fn add_item(
        &mut self,
        offer_id: &str,
        quantity: u32,
        details: Option<ItemDetails>,
    ) -> Result<(), CartError> {
        let offer_id = OfferId::new(offer_id)?;

        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let bounds = self.settings.quantity;

        if let Some(backend) = self.backend() {
            backend
                .add_item(offer_id.clone(), bounds.clamp(quantity))
                .await?;

            self.reload_from(backend.as_ref()).await?;
        } else {
            if let Some(existing) = self.line_mut(&offer_id) {
                let merged = bounds.clamp(existing.quantity().saturating_add(quantity));
                existing.set_quantity(merged);
            } else {
                let line = LineItem::from_details(
                    offer_id.clone(),
                    bounds.clamp(quantity),
                    details.unwrap_or_default(),
                    self.settings.currency,
                )?;

                self.items.push(line);
            }

            self.storage.save_items(&self.items);
        }

        debug!(%offer_id, quantity, "added item to cart");

        self.notifier
            .notify(Notification::ItemAdded { offer_id, quantity });

        Ok(())
    }

    /// Set the quantity of a line.
    ///
    /// A quantity below the minimum removes the line. Updating an offer that
    /// is not in a guest cart does nothing.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidOfferId`]: the offer id is empty.
    /// - [`CartError::Backend`]: the backend call failed; the ledger is unchanged.
    pub async fn update_item(&mut self, offer_id: &str, quantity: u32) -> Result<(), CartError> {
        let offer_id = OfferId::new(offer_id)?;
        let bounds = self.settings.quantity;

        if quantity < bounds.min {
            return self.remove_offer(offer_id).await;
        }

        let quantity = bounds.clamp(quantity);

        if let Some(backend) = self.backend() {
            backend.update_item(offer_id.clone(), quantity).await?;

            self.reload_from(backend.as_ref()).await?;
        } else {
            let Some(existing) = self.line_mut(&offer_id) else {
                debug!(%offer_id, "ignoring update for offer not in cart");

                return Ok(());
            };

            existing.set_quantity(quantity);

            self.storage.save_items(&self.items);
        }

        debug!(%offer_id, quantity, "updated cart item");

        self.notifier
            .notify(Notification::ItemUpdated { offer_id, quantity });

        Ok(())
    }

    /// Remove a line. Removing an offer that is not in a guest cart does
    /// nothing.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidOfferId`]: the offer id is empty.
    /// - [`CartError::Backend`]: the backend call failed; the ledger is unchanged.
    pub async fn remove_item(&mut self, offer_id: &str) -> Result<(), CartError> {
        let offer_id = OfferId::new(offer_id)?;

        self.remove_offer(offer_id).await
    }

    async fn remove_offer(&mut self, offer_id: OfferId) -> Result<(), CartError> {
        if let Some(backend) = self.backend() {
            backend.remove_item(offer_id.clone()).await?;

            self.reload_from(backend.as_ref()).await?;
        } else {
            let before = self.items.len();

            self.items.retain(|item| item.offer_id() != &offer_id);

            if self.items.len() == before {
                debug!(%offer_id, "ignoring removal of offer not in cart");

                return Ok(());
            }

            self.storage.save_items(&self.items);
        }

        debug!(%offer_id, "removed cart item");

        self.notifier
            .notify(Notification::ItemRemoved { offer_id });

        Ok(())
    }

    /// Empty the cart and forget the coupon, locally and on the backend.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Backend`] if the backend clear fails; the ledger is
    /// unchanged.
    pub async fn clear_cart(&mut self) -> Result<(), CartError> {
        self.empty().await?;

        self.notifier.notify(Notification::CartCleared);

        Ok(())
    }

    /// Empty the cart after an order has been placed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Backend`] if the backend clear fails; the ledger is
    /// unchanged.
    pub async fn complete_order(&mut self) -> Result<(), CartError> {
        self.empty().await?;

        self.notifier.notify(Notification::OrderCompleted);

        Ok(())
    }

    async fn empty(&mut self) -> Result<(), CartError> {
        if let Some(backend) = self.backend() {
            backend.clear_cart().await?;
        }

        self.items.clear();
        self.applied_coupon = None;

        self.storage.clear_items();
        self.storage.clear_coupon();

        debug!("emptied cart");

        Ok(())
    }

    /// Apply a coupon by code, replacing any applied one.
    ///
    /// Unknown codes and subtotals below the coupon's minimum leave the ledger
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] if the subtotal cannot be calculated.
    pub fn apply_coupon(&mut self, code: &str) -> Result<CouponOutcome, CartError> {
        let Some(coupon) = self.coupons.find(code.trim()) else {
            debug!(code, "coupon not found");

            return Ok(CouponOutcome::NotFound);
        };

        let subtotal = decimal_from_money(&self.subtotal()?);

        if !coupon.is_eligible(subtotal) {
            debug!(code = %coupon.code, %subtotal, "subtotal below coupon minimum");

            return Ok(CouponOutcome::BelowMinimum {
                minimum_order_value: coupon.minimum_order_value.unwrap_or_default(),
            });
        }

        self.storage.save_coupon(&coupon);

        let code = coupon.code.clone();
        self.applied_coupon = Some(coupon);

        self.notifier
            .notify(Notification::CouponApplied { code: code.clone() });

        Ok(CouponOutcome::Applied { code })
    }

    /// Forget the applied coupon.
    pub fn remove_coupon(&mut self) {
        let removed = self.applied_coupon.take();

        self.storage.clear_coupon();

        if removed.is_some() {
            self.notifier.notify(Notification::CouponRemoved);
        }
    }

    /// Switch to the backend as store of record and merge the guest cart into it.
    pub async fn authenticate(&mut self, backend: Arc<dyn CartBackend>) {
        self.session = Session::Authenticated(backend);

        self.sync_with_backend().await;
    }

    /// Attach a backend session established earlier and mirror its cart.
    ///
    /// Unlike [`Self::authenticate`] the guest cart is not pushed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Backend`] if the server cart cannot be fetched; the
    /// ledger stays a guest ledger.
    pub async fn resume(&mut self, backend: Arc<dyn CartBackend>) -> Result<(), CartError> {
        self.reload_from(backend.as_ref()).await?;

        self.session = Session::Authenticated(backend);

        debug!(items = self.items.len(), "resumed backend session");

        Ok(())
    }

    /// Push every guest line to the backend, then mirror the server cart.
    ///
    /// The guest cart is only dropped from local storage once the server cart
    /// has been reloaded. Failures are logged and leave the ledger as it was.
    pub async fn sync_with_backend(&mut self) {
        let Some(backend) = self.backend() else {
            debug!("not authenticated; skipping cart sync");

            return;
        };

        match self.push_guest_items(backend.as_ref()).await {
            Ok(items) => {
                debug!(items = items.len(), "synced guest cart with backend");

                self.storage.clear_items();
                self.items = items;
            }
            Err(error) => {
                warn!(%error, "failed to sync guest cart with backend; keeping local cart");
            }
        }
    }

    async fn push_guest_items(&self, backend: &dyn CartBackend) -> Result<Vec<LineItem>, BackendError> {
        let server = backend.get_cart().await?;

        debug!(
            server_items = server.items.len(),
            guest_items = self.items.len(),
            "merging guest cart into server cart"
        );

        for item in &self.items {
            backend
                .add_item(item.offer_id().clone(), item.quantity())
                .await?;
        }

        let merged = backend.get_cart().await?;

        Ok(ingest(merged, self.settings.currency, self.settings.quantity))
    }

    /// Drop the backend session and fall back to the guest cart.
    pub fn logout(&mut self) {
        self.session = Session::Guest;

        if self.settings.clear_guest_cart_on_logout {
            self.storage.clear_items();
            self.storage.clear_coupon();
        }

        self.items = self
            .storage
            .load_items(self.settings.currency, self.settings.quantity);
        self.applied_coupon = restore_coupon(&self.storage, self.coupons.as_ref());

        debug!(items = self.items.len(), "logged out; restored guest cart");
    }

    /// Re-read items from the store of record.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Backend`] if the server cart cannot be fetched.
    pub async fn reload(&mut self) -> Result<(), CartError> {
        if let Some(backend) = self.backend() {
            self.reload_from(backend.as_ref()).await?;
        } else {
            self.items = self
                .storage
                .load_items(self.settings.currency, self.settings.quantity);
        }

        Ok(())
    }

    async fn reload_from(&mut self, backend: &dyn CartBackend) -> Result<(), BackendError> {
        let cart = backend.get_cart().await?;

        self.items = ingest(cart, self.settings.currency, self.settings.quantity);

        Ok(())
    }

    fn backend(&self) -> Option<Arc<dyn CartBackend>> {
        match &self.session {
            Session::Authenticated(backend) => Some(Arc::clone(backend)),
            Session::Guest => None,
        }
    }

    fn line_mut(&mut self, offer_id: &OfferId) -> Option<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|item| item.offer_id() == offer_id)
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the sum overflows.
    pub fn subtotal(&self) -> Result<Amount, PricingError> {
        total_price(&self.items, self.settings.currency)
    }

    /// Discount granted by the applied coupon on the current subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the totals cannot be calculated.
    pub fn discount_amount(&self) -> Result<Amount, PricingError> {
        Ok(self.totals()?.discount)
    }

    /// Subtotal less discount, never below zero.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the totals cannot be calculated.
    pub fn final_price(&self) -> Result<Amount, PricingError> {
        Ok(self.totals()?.final_price)
    }

    /// Total number of units.
    pub fn total_item_count(&self) -> u64 {
        total_item_count(&self.items)
    }

    /// All derived values at once.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the totals cannot be calculated.
    pub fn totals(&self) -> Result<CartTotals, PricingError> {
        CartTotals::calculate(
            &self.items,
            self.applied_coupon.as_ref(),
            self.settings.currency,
        )
    }

    /// Tax, shipping and grand total under a pricing policy.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the totals cannot be calculated.
    pub fn checkout_summary(&self, policy: &PricingPolicy) -> Result<CheckoutSummary, PricingError> {
        CheckoutSummary::calculate(&self.totals()?, policy)
    }
}

/// The stored coupon, re-resolved against the coupon table.
///
/// Codes the table no longer knows and coupons with negative values are
/// forgotten.
fn restore_coupon(storage: &CartStorage, coupons: &dyn CouponRepository) -> Option<Coupon> {
    let stored = storage.load_coupon()?;

    match coupons.find(&stored.code) {
        Some(current) if current.is_valid() => {
            if current != stored {
                debug!(code = %current.code, "refreshing stored coupon from coupon table");
                storage.save_coupon(&current);
            }

            Some(current)
        }
        _ => {
            warn!(code = %stored.code, "forgetting stored coupon that is unknown or invalid");
            storage.clear_coupon();

            None
        }
    }
}
