//! Items

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{Amount, MoneyConversionError, money_from_decimal, zero};

/// Raised when an offer id is empty or whitespace.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("offer id must not be empty")]
pub struct EmptyOfferId;

/// Identifier of a purchasable offer. Unique within a cart.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OfferId(String);

impl OfferId {
    /// Create an offer id, rejecting blank values.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyOfferId`] when `value` is empty or only whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyOfferId> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(EmptyOfferId);
        }

        Ok(Self(value))
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OfferId {
    type Error = EmptyOfferId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OfferId> for String {
    fn from(value: OfferId) -> Self {
        value.0
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional details supplied when an offer is added to the cart.
///
/// Only used when the offer is not in the cart yet. Missing prices default to
/// zero and missing text to the empty string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    /// Discounted per-unit price.
    pub unit_price: Option<Decimal>,

    /// Pre-discount per-unit price.
    pub original_unit_price: Option<Decimal>,

    /// Offer title.
    pub title: Option<String>,

    /// Image reference.
    pub image_ref: Option<String>,

    /// Name of the store selling the offer.
    pub store_name: Option<String>,
}

impl ItemDetails {
    /// Details with just a unit price.
    #[must_use]
    pub fn priced(unit_price: Decimal) -> Self {
        Self {
            unit_price: Some(unit_price),
            ..Self::default()
        }
    }

    /// Set the original (pre-discount) unit price.
    #[must_use]
    pub fn with_original_unit_price(mut self, price: Decimal) -> Self {
        self.original_unit_price = Some(price);
        self
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the store name.
    #[must_use]
    pub fn with_store_name(mut self, store_name: impl Into<String>) -> Self {
        self.store_name = Some(store_name.into());
        self
    }

    /// Set the image reference.
    #[must_use]
    pub fn with_image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

/// A single cart line: one offer and how many of it.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    offer_id: OfferId,
    quantity: u32,
    unit_price: Amount,
    original_unit_price: Option<Amount>,
    title: String,
    image_ref: String,
    store_name: String,
}

impl LineItem {
    /// Creates a line with the given price and no display metadata.
    #[must_use]
    pub fn new(offer_id: OfferId, quantity: u32, unit_price: Amount) -> Self {
        Self {
            offer_id,
            quantity,
            unit_price,
            original_unit_price: None,
            title: String::new(),
            image_ref: String::new(),
            store_name: String::new(),
        }
    }

    /// Build a line from [`ItemDetails`], defaulting whatever is missing.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyConversionError`] if a supplied price is negative or
    /// cannot be represented.
    pub fn from_details(
        offer_id: OfferId,
        quantity: u32,
        details: ItemDetails,
        currency: &'static Currency,
    ) -> Result<Self, MoneyConversionError> {
        let unit_price = match details.unit_price {
            Some(price) => money_from_decimal(price, currency)?,
            None => zero(currency),
        };

        let original_unit_price = details
            .original_unit_price
            .map(|price| money_from_decimal(price, currency))
            .transpose()?;

        Ok(Self {
            offer_id,
            quantity,
            unit_price,
            original_unit_price,
            title: details.title.unwrap_or_default(),
            image_ref: details.image_ref.unwrap_or_default(),
            store_name: details.store_name.unwrap_or_default(),
        })
    }

    /// Set the original unit price.
    #[must_use]
    pub fn with_original_unit_price(mut self, price: Option<Amount>) -> Self {
        self.original_unit_price = price;
        self
    }

    /// Set the display metadata.
    #[must_use]
    pub fn with_display(
        mut self,
        title: impl Into<String>,
        image_ref: impl Into<String>,
        store_name: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.image_ref = image_ref.into();
        self.store_name = store_name.into();
        self
    }

    /// The offer this line is for.
    pub fn offer_id(&self) -> &OfferId {
        &self.offer_id
    }

    /// Number of units.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Discounted per-unit price.
    pub fn unit_price(&self) -> &Amount {
        &self.unit_price
    }

    /// Pre-discount per-unit price, if known.
    pub fn original_unit_price(&self) -> Option<&Amount> {
        self.original_unit_price.as_ref()
    }

    /// Offer title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Image reference.
    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    /// Store name.
    pub fn store_name(&self) -> &str {
        &self.store_name
    }
}

/// Inclusive bounds on a line quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantityBounds {
    /// Smallest quantity a line may hold.
    pub min: u32,

    /// Largest quantity a line may hold.
    pub max: u32,
}

impl QuantityBounds {
    /// Clamp a requested quantity into the bounds.
    #[must_use]
    pub fn clamp(self, quantity: u32) -> u32 {
        quantity.clamp(self.min, self.max.max(self.min))
    }
}

impl Default for QuantityBounds {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

/// Append `line`, or fold its quantity into the line already holding the same
/// offer. The resulting quantity is clamped into `bounds`.
pub(crate) fn merge_line(items: &mut Vec<LineItem>, mut line: LineItem, bounds: QuantityBounds) {
    if let Some(existing) = items
        .iter_mut()
        .find(|item| item.offer_id == line.offer_id)
    {
        existing.quantity = bounds.clamp(existing.quantity.saturating_add(line.quantity));

        return;
    }

    line.quantity = bounds.clamp(line.quantity);
    items.push(line);
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn offer_id_rejects_blank_values() {
        assert_eq!(OfferId::new(""), Err(EmptyOfferId));
        assert_eq!(OfferId::new("   "), Err(EmptyOfferId));
    }

    #[test]
    fn offer_id_deserialization_rejects_empty_string() {
        let result = serde_json::from_str::<OfferId>("\"\"");

        assert!(result.is_err(), "empty offer id should not deserialize");
    }

    #[test]
    fn from_details_defaults_missing_fields() -> TestResult {
        let item = LineItem::from_details(OfferId::new("A")?, 2, ItemDetails::default(), INR)?;

        assert_eq!(item.unit_price(), &Money::from_minor(0, INR));
        assert_eq!(item.original_unit_price(), None);
        assert_eq!(item.title(), "");
        assert_eq!(item.image_ref(), "");
        assert_eq!(item.store_name(), "");

        Ok(())
    }

    #[test]
    fn from_details_converts_prices() -> TestResult {
        let details = ItemDetails::priced(Decimal::from(100))
            .with_original_unit_price(Decimal::from_str("149.99")?)
            .with_title("Pizza for two")
            .with_store_name("Slice House");

        let item = LineItem::from_details(OfferId::new("A")?, 1, details, INR)?;

        assert_eq!(item.unit_price(), &Money::from_minor(10_000, INR));
        assert_eq!(
            item.original_unit_price(),
            Some(&Money::from_minor(14_999, INR))
        );
        assert_eq!(item.title(), "Pizza for two");
        assert_eq!(item.store_name(), "Slice House");

        Ok(())
    }

    #[test]
    fn from_details_rejects_negative_price() -> TestResult {
        let details = ItemDetails::priced(Decimal::from(-5));

        let result = LineItem::from_details(OfferId::new("A")?, 1, details, INR);

        assert!(matches!(result, Err(MoneyConversionError::Negative(_))));

        Ok(())
    }

    #[test]
    fn quantity_bounds_clamp_both_ends() {
        let bounds = QuantityBounds::default();

        assert_eq!(bounds.clamp(0), 1);
        assert_eq!(bounds.clamp(4), 4);
        assert_eq!(bounds.clamp(11), 10);
    }

    #[test]
    fn merge_line_folds_repeated_offers_and_clamps() -> TestResult {
        let bounds = QuantityBounds::default();
        let mut items = Vec::new();

        merge_line(&mut items, LineItem::new(OfferId::new("A")?, 4, Money::from_minor(100, INR)), bounds);
        merge_line(&mut items, LineItem::new(OfferId::new("B")?, 40, Money::from_minor(100, INR)), bounds);
        merge_line(&mut items, LineItem::new(OfferId::new("A")?, 9, Money::from_minor(500, INR)), bounds);

        let lines: Vec<_> = items
            .iter()
            .map(|item| (item.offer_id().as_str(), item.quantity(), item.unit_price().clone()))
            .collect();

        assert_eq!(
            lines,
            [
                ("A", 10, Money::from_minor(100, INR)),
                ("B", 10, Money::from_minor(100, INR)),
            ]
        );

        Ok(())
    }
}
