//! Serialized forms of cart data.

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{
    items::{LineItem, OfferId},
    money::{MoneyConversionError, decimal_from_money, money_from_decimal},
};

/// A line item as persisted in local storage, prices in major units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredLineItem {
    offer_id: OfferId,
    quantity: u32,
    unit_price: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_unit_price: Option<Decimal>,

    #[serde(default)]
    title: String,

    #[serde(default)]
    image_ref: String,

    #[serde(default)]
    store_name: String,
}

impl StoredLineItem {
    pub(crate) fn offer_id(&self) -> &OfferId {
        &self.offer_id
    }

    pub(crate) fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn into_line_item(
        self,
        currency: &'static Currency,
    ) -> Result<LineItem, MoneyConversionError> {
        let original_unit_price = self
            .original_unit_price
            .map(|price| money_from_decimal(price, currency))
            .transpose()?;

        Ok(LineItem::new(
            self.offer_id,
            self.quantity,
            money_from_decimal(self.unit_price, currency)?,
        )
        .with_original_unit_price(original_unit_price)
        .with_display(self.title, self.image_ref, self.store_name))
    }
}

impl From<&LineItem> for StoredLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            offer_id: item.offer_id().clone(),
            quantity: item.quantity(),
            unit_price: decimal_from_money(item.unit_price()),
            original_unit_price: item.original_unit_price().map(decimal_from_money),
            title: item.title().to_string(),
            image_ref: item.image_ref().to_string(),
            store_name: item.store_name().to_string(),
        }
    }
}
