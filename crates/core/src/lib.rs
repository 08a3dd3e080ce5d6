//! Dealcart
//!
//! Cart ledger for a deals storefront: line items, coupons, derived totals and
//! the reconciliation of a locally persisted guest cart with the server cart.

pub mod backend;
pub mod checkout;
pub mod coupons;
pub mod discounts;
pub mod items;
pub mod ledger;
pub mod money;
pub mod notifications;
pub mod prelude;
pub mod pricing;
pub mod storage;
