//! Backend cart models

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::items::{ItemDetails, LineItem, OfferId, QuantityBounds, merge_line};

/// Cart as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteCart {
    /// Server line items, in server order.
    #[serde(default)]
    pub items: Vec<RemoteCartItem>,
}

/// A server line item. Prices are major-unit decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartItem {
    /// Offer identifier.
    #[serde(default)]
    pub offer_id: String,

    /// Number of units. Signed so malformed rows can be dropped instead of
    /// failing the whole cart.
    #[serde(default)]
    pub quantity: i64,

    /// Discounted per-unit price.
    #[serde(default)]
    pub price: Option<Decimal>,

    /// Pre-discount per-unit price.
    #[serde(default)]
    pub original_price: Option<Decimal>,

    /// Offer title.
    #[serde(default)]
    pub title: Option<String>,

    /// Image reference.
    #[serde(default)]
    pub image: Option<String>,

    /// Name of the store selling the offer.
    #[serde(default)]
    pub store_name: Option<String>,

    /// Nested offer, when the backend embeds it.
    #[serde(default)]
    pub offer: Option<RemoteOffer>,
}

/// Offer embedded in a server line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOffer {
    /// Discounted per-unit price.
    #[serde(default)]
    pub price: Option<Decimal>,

    /// Pre-discount per-unit price.
    #[serde(default)]
    pub original_price: Option<Decimal>,

    /// Offer title.
    #[serde(default)]
    pub title: Option<String>,

    /// Image reference.
    #[serde(default)]
    pub image: Option<String>,

    /// Name of the store selling the offer.
    #[serde(default)]
    pub store_name: Option<String>,
}

impl RemoteCartItem {
    /// Item details, preferring top-level fields over the nested offer.
    fn details(&self) -> ItemDetails {
        let offer = self.offer.as_ref();

        ItemDetails {
            unit_price: Some(
                self.price
                    .or_else(|| offer.and_then(|offer| offer.price))
                    .unwrap_or(Decimal::ZERO),
            ),
            original_unit_price: self
                .original_price
                .or_else(|| offer.and_then(|offer| offer.original_price)),
            title: self
                .title
                .clone()
                .or_else(|| offer.and_then(|offer| offer.title.clone())),
            image_ref: self
                .image
                .clone()
                .or_else(|| offer.and_then(|offer| offer.image.clone())),
            store_name: self
                .store_name
                .clone()
                .or_else(|| offer.and_then(|offer| offer.store_name.clone())),
        }
    }
}

/// Map a server cart into ledger line items.
///
/// Rows without an offer id, with a non-positive quantity or with a negative
/// price are dropped. Quantities are clamped into `bounds` and repeated offers
/// are merged into the first occurrence.
pub fn ingest(cart: RemoteCart, currency: &'static Currency, bounds: QuantityBounds) -> Vec<LineItem> {
    let mut items: Vec<LineItem> = Vec::with_capacity(cart.items.len());

    for remote in cart.items {
        let Ok(offer_id) = OfferId::new(remote.offer_id.clone()) else {
            warn!("dropping server cart item without an offer id");

            continue;
        };

        let Some(quantity) = u32::try_from(remote.quantity).ok().filter(|q| *q > 0) else {
            warn!(%offer_id, quantity = remote.quantity, "dropping server cart item with invalid quantity");

            continue;
        };

        match LineItem::from_details(offer_id.clone(), quantity, remote.details(), currency) {
            Ok(line) => merge_line(&mut items, line, bounds),
            Err(error) => {
                warn!(%offer_id, %error, "dropping server cart item with invalid price");
            }
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use super::*;

    fn parse(json: &str) -> Result<RemoteCart, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn top_level_price_wins_over_nested_offer() -> TestResult {
        let cart = parse(
            r#"{"items":[{"offerId":"A","quantity":2,"price":"100.00","offer":{"price":"80.00"}}]}"#,
        )?;

        let items = ingest(cart, INR, QuantityBounds::default());

        assert_eq!(items.len(), 1);
        assert_eq!(
            items.first().map(LineItem::unit_price),
            Some(&Money::from_minor(10_000, INR))
        );

        Ok(())
    }

    #[test]
    fn nested_offer_supplies_missing_fields() -> TestResult {
        let cart = parse(
            r#"{"items":[{"offerId":"A","quantity":1,"offer":{"price":80,"originalPrice":120,"title":"Thali","storeName":"Spice Route","image":"thali.png"}}]}"#,
        )?;

        let items = ingest(cart, INR, QuantityBounds::default());
        let item = items.first().ok_or("item missing")?;

        assert_eq!(item.unit_price(), &Money::from_minor(8_000, INR));
        assert_eq!(
            item.original_unit_price(),
            Some(&Money::from_minor(12_000, INR))
        );
        assert_eq!(item.title(), "Thali");
        assert_eq!(item.store_name(), "Spice Route");
        assert_eq!(item.image_ref(), "thali.png");

        Ok(())
    }

    #[test]
    fn missing_price_defaults_to_zero() -> TestResult {
        let cart = parse(r#"{"items":[{"offerId":"A","quantity":1}]}"#)?;

        let items = ingest(cart, INR, QuantityBounds::default());

        assert_eq!(
            items.first().map(LineItem::unit_price),
            Some(&Money::from_minor(0, INR))
        );

        Ok(())
    }

    #[test]
    fn invalid_rows_are_dropped() -> TestResult {
        let cart = parse(
            r#"{"items":[
                {"offerId":"","quantity":1,"price":10},
                {"offerId":"B","quantity":0,"price":10},
                {"offerId":"C","quantity":-2,"price":10},
                {"offerId":"D","quantity":1,"price":-10},
                {"offerId":"E","quantity":1,"price":10}
            ]}"#,
        )?;

        let items = ingest(cart, INR, QuantityBounds::default());
        let ids: Vec<&str> = items.iter().map(|item| item.offer_id().as_str()).collect();

        assert_eq!(ids, vec!["E"]);

        Ok(())
    }

    #[test]
    fn quantities_are_clamped_and_duplicates_merged() -> TestResult {
        let cart = parse(
            r#"{"items":[
                {"offerId":"A","quantity":25,"price":10},
                {"offerId":"B","quantity":4,"price":10},
                {"offerId":"B","quantity":3,"price":99}
            ]}"#,
        )?;

        let items = ingest(cart, INR, QuantityBounds::default());

        let quantities: Vec<(&str, u32)> = items
            .iter()
            .map(|item| (item.offer_id().as_str(), item.quantity()))
            .collect();

        assert_eq!(quantities, vec![("A", 10), ("B", 7)]);
        assert_eq!(
            items.get(1).map(LineItem::unit_price),
            Some(&Money::from_minor(1_000, INR))
        );

        Ok(())
    }

    #[test]
    fn missing_items_field_is_an_empty_cart() -> TestResult {
        let cart = parse("{}")?;

        assert!(ingest(cart, INR, QuantityBounds::default()).is_empty());

        Ok(())
    }
}
