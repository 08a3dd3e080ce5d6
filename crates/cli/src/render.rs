//! Cart and checkout rendering.

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use dealcart::{
    checkout::CheckoutSummary,
    ledger::CartLedger,
    pricing::{PricingError, line_total},
};

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub(crate) enum RenderError {
    /// Totals could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Write the cart as a table followed by its totals.
pub(crate) fn write_cart(out: &mut impl io::Write, ledger: &CartLedger) -> Result<(), RenderError> {
    if ledger.items().is_empty() {
        writeln!(out, "Cart is empty")?;
    } else {
        let mut builder = Builder::default();

        builder.push_record(["", "Offer", "Item", "Store", "Qty", "Unit Price", "Total"]);

        for (idx, item) in ledger.items().iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                item.offer_id().to_string(),
                item.title().to_string(),
                item.store_name().to_string(),
                item.quantity().to_string(),
                format!("{}", item.unit_price()),
                format!("{}", line_total(item)?),
            ]);
        }

        let mut table = builder.build();

        table.with(Theme::from(Style::modern_rounded()));
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(4..7), Alignment::right());

        writeln!(out, "\n{table}")?;
    }

    let totals = ledger.totals()?;

    let discount_label = match ledger.applied_coupon() {
        Some(coupon) => format!("Discount ({}):", coupon.code),
        None => "Discount:".to_string(),
    };

    let lines = [
        ("Subtotal:".to_string(), totals.subtotal.to_string()),
        (discount_label, format!("-{}", totals.discount)),
        ("Total:".to_string(), totals.final_price.to_string()),
        ("Savings:".to_string(), totals.savings.to_string()),
        ("Items:".to_string(), totals.item_count.to_string()),
    ];

    write_summary(out, &lines)
}

/// Write a checkout summary.
pub(crate) fn write_checkout(
    out: &mut impl io::Write,
    summary: &CheckoutSummary,
) -> Result<(), RenderError> {
    let lines = [
        ("Subtotal:".to_string(), summary.subtotal.to_string()),
        ("Discount:".to_string(), format!("-{}", summary.discount)),
        ("Total:".to_string(), summary.final_price.to_string()),
        ("Tax:".to_string(), summary.tax.to_string()),
        ("Shipping:".to_string(), summary.shipping.to_string()),
        ("Grand Total:".to_string(), summary.grand_total.to_string()),
    ];

    write_summary(out, &lines)
}

fn write_summary(out: &mut impl io::Write, lines: &[(String, String)]) -> Result<(), RenderError> {
    let label_width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = lines.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in lines {
        writeln!(out, " {label:<label_width$}  {value:>value_width$}")?;
    }

    writeln!(out)?;

    Ok(())
}
