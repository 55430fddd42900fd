//! Receipt

use std::{fmt::Write, io};

use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::pricing::{OrderSummary, SellerBreakdown};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable breakdown of an order summary.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'a, 'b> {
    summary: &'a OrderSummary<'b>,
    promo_code: Option<&'a str>,
}

impl<'a, 'b> Receipt<'a, 'b> {
    /// Create a receipt for `summary`, labelling the discount with `promo_code`.
    #[must_use]
    pub fn new(summary: &'a OrderSummary<'b>, promo_code: Option<&'a str>) -> Self {
        Self {
            summary,
            promo_code,
        }
    }

    /// Writes the receipt: a table of items grouped by seller, then the totals.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.summary.sellers.is_empty() {
            writeln!(out, "\nNo items selected.\n").map_err(|_err| ReceiptError::IO)?;

            return Ok(());
        }

        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Price", "Total"]);

        let mut row_writer = RowWriter::new(&mut builder);

        for seller in &self.summary.sellers {
            row_writer.append_seller(seller);
        }

        let RowWriter {
            seller_rows,
            color_ops,
            ..
        } = row_writer;

        write_receipt_table(&mut out, builder, &seller_rows, color_ops)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let totals = &self.summary.totals;

        let discount_label = match self.promo_code {
            Some(code) => format!(" Discount ({code}):"),
            None => " Discount:".to_string(),
        };

        let mut lines: SmallVec<[(String, String); 5]> = smallvec![
            (" Items:".to_string(), format!("{}  ", totals.items_subtotal)),
            (" Shipping:".to_string(), format!("{}  ", totals.shipping_total)),
        ];

        if !totals.insurance_total.is_zero() {
            lines.push((
                " Insurance:".to_string(),
                format!("{}  ", totals.insurance_total),
            ));
        }

        if !totals.discount_amount.is_zero() {
            lines.push((discount_label, format!("-{}  ", totals.discount_amount)));
        }

        lines.push((
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", totals.grand_total),
        ));

        let label_width = lines
            .iter()
            .map(|(label, _)| visible_width(label))
            .max()
            .unwrap_or_default();

        let value_width = lines
            .iter()
            .map(|(_, value)| visible_width(value))
            .max()
            .unwrap_or_default();

        for (label, value) in &lines {
            write_summary_line(out, label, value, label_width, value_width)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

struct RowWriter<'a> {
    builder: &'a mut Builder,
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
    seller_rows: SmallVec<[usize; 8]>,
    current_row: usize,
    item_number: usize,
}

impl RowWriter<'_> {
    fn new(builder: &mut Builder) -> RowWriter<'_> {
        RowWriter {
            builder,
            color_ops: smallvec![],
            seller_rows: smallvec![],
            current_row: 1, // header is row 0
            item_number: 0,
        }
    }

    fn append_seller(&mut self, seller: &SellerBreakdown<'_>) {
        self.seller_rows.push(self.current_row);

        self.push_row([
            String::new(),
            seller.group.seller().name.clone(),
            String::new(),
            String::new(),
            format!("{}", seller.subtotal),
        ]);

        self.color_ops
            .push((self.current_row - 1, 1, Color::BOLD));

        for item in seller.group.iter() {
            self.item_number += 1;

            let name = match item.variant() {
                Some(variant) => format!("{}\n{variant}", item.name()),
                None => item.name().to_string(),
            };

            self.push_row([
                format!("#{:<3}", self.item_number),
                name,
                item.quantity().to_string(),
                format!("{}", item.unit_price()),
                format!("{}", item.line_total()),
            ]);

            self.color_ops
                .push((self.current_row - 1, 3, color_dark_grey()));
        }

        self.push_row([
            String::new(),
            format!(
                "Shipping: {} ({})",
                seller.shipping.name, seller.shipping.eta_label
            ),
            String::new(),
            String::new(),
            format!("{}", seller.shipping.price),
        ]);

        if seller.insured {
            self.push_row([
                String::new(),
                "Insurance".to_string(),
                String::new(),
                String::new(),
                format!("{}", seller.insurance),
            ]);
        }
    }

    fn push_row(&mut self, row: [String; 5]) {
        self.builder.push_record(row);
        self.current_row += 1;
    }
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    seller_rows: &[usize],
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    for &row in seller_rows {
        if row > 1 {
            theme.insert_horizontal_line(row, separator);
        }
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        ids::{ProductId, SellerId},
        items::LineItem,
        money::Rupiah,
        pricing::OrderSelections,
        promotions::PromoCode,
        sellers::Seller,
        shipping::ShippingCatalog,
    };

    use super::*;

    fn render(summary: &OrderSummary<'_>, promo: Option<&str>) -> Result<String, ReceiptError> {
        let mut out = Vec::new();

        Receipt::new(summary, promo).write_to(&mut out)?;

        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn receipt_lists_sellers_items_and_totals() -> TestResult {
        let catalog = ShippingCatalog::standard();
        let items = [
            LineItem::new(
                ProductId::new("p-1"),
                "Kemeja Batik",
                Rupiah::new(100_000),
                1,
                Seller::new("a", "Toko Batik"),
            )
            .with_variant(Some("XL".to_string())),
            LineItem::new(
                ProductId::new("p-2"),
                "Sepatu Lari",
                Rupiah::new(250_000),
                1,
                Seller::new("b", "Toko Sepatu"),
            ),
        ];

        let mut selections = OrderSelections::new();
        selections.set_insurance(SellerId::new("a"), true);

        let promo = PromoCode::fixed("HEMAT50K", Rupiah::new(50_000));
        let summary = selections.summarize(&items, Some(&promo), &catalog);
        let output = render(&summary, Some(promo.code()))?;

        for expected in [
            "Toko Batik",
            "Toko Sepatu",
            "Kemeja Batik",
            "XL",
            "Shipping: Reguler (2-4 hari)",
            "Insurance",
            "Discount (HEMAT50K):",
        ] {
            assert!(output.contains(expected), "missing {expected:?}");
        }

        assert!(output.contains(&summary.totals.grand_total.to_string()));

        Ok(())
    }

    #[test]
    fn empty_summary_prints_placeholder() -> TestResult {
        let catalog = ShippingCatalog::standard();
        let items: [LineItem; 0] = [];
        let summary = OrderSelections::new().summarize(&items, None, &catalog);

        let output = render(&summary, None)?;

        assert!(output.contains("No items selected."));

        Ok(())
    }

    #[test]
    fn visible_width_ignores_ansi_codes() {
        assert_eq!(visible_width("\x1b[1mTotal:\x1b[0m"), 6);
    }
}
