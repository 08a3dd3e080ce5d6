//! Cart backend
//!
//! The server-side cart of an authenticated shopper. The ledger only ever
//! talks to it through [`CartBackend`].

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::items::OfferId;

mod http;
mod models;

pub use http::{HttpBackendConfig, HttpCartBackend};
pub use models::{RemoteCart, RemoteCartItem, RemoteOffer, ingest};

/// Errors that can occur when talking to the cart backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-2xx response.
    #[error("unexpected response from cart backend: {0}")]
    UnexpectedResponse(String),

    /// The configured base URL cannot be used to build endpoints.
    #[error("invalid cart backend URL: {0}")]
    InvalidBaseUrl(String),
}

/// Server-side cart of the authenticated shopper.
#[automock]
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Fetch the current server cart.
    async fn get_cart(&self) -> Result<RemoteCart, BackendError>;

    /// Add `quantity` units of an offer.
    async fn add_item(&self, offer_id: OfferId, quantity: u32) -> Result<(), BackendError>;

    /// Set the quantity of an offer already in the cart.
    async fn update_item(&self, offer_id: OfferId, quantity: u32) -> Result<(), BackendError>;

    /// Remove an offer from the cart.
    async fn remove_item(&self, offer_id: OfferId) -> Result<(), BackendError>;

    /// Empty the cart.
    async fn clear_cart(&self) -> Result<(), BackendError>;
}
