//! Cart commands.

use std::{io, sync::Arc};

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use dealcart::{
    backend::{BackendError, CartBackend, HttpCartBackend},
    items::ItemDetails,
    ledger::{CartError, CartLedger, CouponOutcome},
    pricing::PricingError,
    storage::{CartStorage, FileStore, KeyValueStore, StorageError},
};

use crate::{
    config::{CliConfig, ConfigError},
    render::{self, RenderError},
};

/// Errors surfaced to the shopper.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Configuration values were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The storage directory could not be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The cart API client could not be built.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Totals could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Output could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// `login` needs an API URL.
    #[error("no cart API configured; set DEALCART_API_URL")]
    BackendNotConfigured,

    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,
}

/// Cart operations.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Show the cart and its totals
    Show,

    /// Add units of an offer
    Add(AddArgs),

    /// Set the quantity of an offer; below the minimum removes it
    Update {
        /// Offer identifier
        offer_id: String,

        /// New quantity
        quantity: u32,
    },

    /// Remove an offer
    Remove {
        /// Offer identifier
        offer_id: String,
    },

    /// Empty the cart and forget the coupon
    Clear,

    /// Apply a coupon code
    ApplyCoupon {
        /// Coupon code, case-insensitive
        code: String,
    },

    /// Forget the applied coupon
    RemoveCoupon,

    /// Merge the guest cart into the server cart and stay signed in
    Login,

    /// Sign out and fall back to the guest cart
    Logout,

    /// Show the checkout summary and place the order
    Checkout,
}

/// Arguments of `add`.
#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Offer identifier
    offer_id: String,

    /// Units to add
    #[arg(default_value_t = 1)]
    quantity: u32,

    /// Discounted unit price
    #[arg(long)]
    price: Option<Decimal>,

    /// Original unit price
    #[arg(long)]
    original_price: Option<Decimal>,

    /// Offer title
    #[arg(long)]
    title: Option<String>,

    /// Store selling the offer
    #[arg(long)]
    store: Option<String>,

    /// Offer image reference
    #[arg(long)]
    image: Option<String>,
}

impl AddArgs {
    fn details(&self) -> ItemDetails {
        ItemDetails {
            unit_price: self.price,
            original_unit_price: self.original_price,
            title: self.title.clone(),
            image_ref: self.image.clone(),
            store_name: self.store.clone(),
        }
    }
}

/// Open the ledger described by `config` and run its command.
pub(crate) async fn run(config: &CliConfig, out: &mut impl io::Write) -> Result<(), CliError> {
    let backend = match config.backend.http_config() {
        Some(http) => Some(Arc::new(HttpCartBackend::new(http)?) as Arc<dyn CartBackend>),
        None => None,
    };

    let mut shopper = Shopper::open(config, backend).await?;

    shopper.execute(config, out).await
}

/// The ledger plus the sign-in marker kept next to it.
struct Shopper {
    ledger: CartLedger,
    store: Arc<FileStore>,
    session_key: String,
    backend: Option<Arc<dyn CartBackend>>,
}

impl Shopper {
    /// Load the guest cart and resume the backend session if one is marked.
    async fn open(config: &CliConfig, backend: Option<Arc<dyn CartBackend>>) -> Result<Self, CliError> {
        let store = Arc::new(FileStore::open(&config.storage.storage_dir)?);
        let storage = CartStorage::new(store.clone(), config.storage.keys());

        let mut ledger = CartLedger::load(
            config.ledger.settings()?,
            storage,
            config.ledger.coupons()?,
        );

        let session_key = config.storage.session_key.clone();
        let signed_in = store.get(&session_key)?.is_some();

        match &backend {
            Some(backend) if signed_in => ledger.resume(Arc::clone(backend)).await?,
            None if signed_in => debug!("signed in but no cart API configured; using guest cart"),
            _ => {}
        }

        Ok(Self {
            ledger,
            store,
            session_key,
            backend,
        })
    }

    async fn execute(&mut self, config: &CliConfig, out: &mut impl io::Write) -> Result<(), CliError> {
        let ledger = &mut self.ledger;

        match &config.command {
            Command::Show => {}
            Command::Add(args) => {
                ledger
                    .add_item(&args.offer_id, args.quantity, Some(args.details()))
                    .await?;
            }
            Command::Update { offer_id, quantity } => {
                ledger.update_item(offer_id, *quantity).await?;
            }
            Command::Remove { offer_id } => {
                ledger.remove_item(offer_id).await?;
            }
            Command::Clear => {
                ledger.clear_cart().await?;
            }
            Command::ApplyCoupon { code } => {
                let message = match ledger.apply_coupon(code)? {
                    CouponOutcome::Applied { code } => format!("Coupon {code} applied"),
                    CouponOutcome::NotFound => format!("Coupon {code} not found"),
                    CouponOutcome::BelowMinimum {
                        minimum_order_value,
                    } => format!("Coupon {code} needs a subtotal of at least {minimum_order_value}"),
                };

                writeln!(out, "{message}").map_err(RenderError::from)?;
            }
            Command::RemoveCoupon => ledger.remove_coupon(),
            Command::Login => {
                let Some(backend) = &self.backend else {
                    return Err(CliError::BackendNotConfigured);
                };

                if ledger.is_authenticated() {
                    writeln!(out, "Already signed in").map_err(RenderError::from)?;
                } else {
                    ledger.authenticate(Arc::clone(backend)).await;
                    self.store.set(&self.session_key, "authenticated")?;

                    info!(items = ledger.items().len(), "signed in");
                    writeln!(out, "Signed in").map_err(RenderError::from)?;
                }
            }
            Command::Logout => {
                if ledger.is_authenticated() {
                    ledger.logout();
                    self.store.remove(&self.session_key)?;

                    info!(items = ledger.items().len(), "signed out");
                    writeln!(out, "Signed out").map_err(RenderError::from)?;
                } else {
                    writeln!(out, "Not signed in").map_err(RenderError::from)?;
                }
            }
            Command::Checkout => {
                if ledger.items().is_empty() {
                    return Err(CliError::EmptyCart);
                }

                let summary = ledger.checkout_summary(&config.pricing.policy())?;

                render::write_checkout(out, &summary)?;

                ledger.complete_order().await?;

                writeln!(out, "Order placed").map_err(RenderError::from)?;

                return Ok(());
            }
        }

        render::write_cart(out, ledger)?;

        Ok(())
    }
}
