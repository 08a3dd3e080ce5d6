//! Cart ledger errors.

use thiserror::Error;

use crate::{
    backend::BackendError, items::EmptyOfferId, money::MoneyConversionError,
    pricing::PricingError,
};

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The offer id was empty.
    #[error(transparent)]
    InvalidOfferId(#[from] EmptyOfferId),

    /// The requested quantity was not positive.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// Supplied item details carried an invalid price.
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] MoneyConversionError),

    /// Totals could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The cart backend rejected or failed the call.
    #[error("cart backend error: {0}")]
    Backend(#[from] BackendError),
}
