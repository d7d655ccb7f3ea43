use crate::{
    currency::{CurrencyFormat, format_basis_points},
    svg_table::{Alignment, SvgTableBuilder},
};
use billbear_application::{
    DiscrepancyKind, ParticipantDirectory, ReceiptDiscrepancy, ReceiptMetadata, SplitResult,
};
use billbear_domain::{Money, ParticipantId, ParticipantShare, SelectionMap};
use billbear_i18n as i18n;
use std::{borrow::Cow, fmt::Write};

const SHARE_ALIGNMENTS: [Alignment; 7] = [
    Alignment::Left,
    Alignment::Right,
    Alignment::Right,
    Alignment::Right,
    Alignment::Right,
    Alignment::Right,
    Alignment::Right,
];
const ITEM_ALIGNMENTS: [Alignment; 5] = [
    Alignment::Left,
    Alignment::Right,
    Alignment::Right,
    Alignment::Right,
    Alignment::Left,
];

#[derive(Debug)]
pub struct BreakdownView {
    pub summary_text: String,
    pub share_table_svg: String,
    pub item_table_svg: String,
}

pub struct BreakdownPresenter {
    currency: CurrencyFormat,
}

impl BreakdownPresenter {
    pub fn new(currency: CurrencyFormat) -> Self {
        Self { currency }
    }

    pub fn render(&self, result: &SplitResult) -> BreakdownView {
        BreakdownView {
            summary_text: self.render_text(result),
            share_table_svg: self.render_svg(result),
            item_table_svg: self.render_item_svg(result),
        }
    }

    /// Plain-text report: receipt lines, receipt totals, then one row per
    /// participant followed by any stated-total warnings.
    ///
    /// A participant total marked `*` differs from the sum of its own columns
    /// because each column is rounded on its own.
    pub fn render_text(&self, result: &SplitResult) -> String {
        let mut out = String::new();
        if let Some(caption) = caption(&result.document.metadata) {
            let _ = writeln!(out, "{caption}\n");
        }

        let mut items = TextTable::new(&ITEM_ALIGNMENTS).row(item_headers());
        for row in self.item_rows(result) {
            items = items.row(row);
        }
        out.push_str(&items.render());
        out.push('\n');

        let receipt = &result.document.receipt;
        let mut totals = TextTable::new(&[Alignment::Left, Alignment::Right]);
        for (label, amount) in [
            (i18n::SUBTOTAL, receipt.subtotal()),
            (i18n::TAX, receipt.tax()),
            (i18n::SERVICE_CHARGE, receipt.service_charge()),
            (i18n::DISCOUNT, -receipt.discount()),
            (i18n::GRAND_TOTAL, receipt.grand_total()),
        ] {
            totals = totals.row([Cow::Borrowed(label), Cow::Owned(self.currency.format(amount))]);
        }
        out.push_str(&totals.render());
        out.push('\n');

        let mut shares = TextTable::new(&SHARE_ALIGNMENTS).row(share_headers());
        for row in self.share_rows(result) {
            shares = shares.row(row);
        }
        shares = shares.row(self.share_footer(result));
        out.push_str(&shares.render());
        if has_rounding_gap(result) {
            let _ = writeln!(out, "{}", i18n::ROUNDING_NOTE);
        }

        for discrepancy in &result.discrepancies {
            let _ = writeln!(out, "\n! {}", self.format_discrepancy(discrepancy));
        }

        out
    }

    /// Per-participant table with a totals row.
    pub fn render_svg(&self, result: &SplitResult) -> String {
        let mut builder = SvgTableBuilder::new()
            .alignments(&SHARE_ALIGNMENTS)
            .headers(share_headers());
        if let Some(caption) = caption(&result.document.metadata) {
            builder = builder.caption(caption);
        }
        for row in self.share_rows(result) {
            builder = builder.row(row);
        }
        builder = builder.footer(self.share_footer(result));
        if has_rounding_gap(result) {
            builder = builder.note(i18n::ROUNDING_NOTE);
        }
        builder.build()
    }

    pub fn render_item_svg(&self, result: &SplitResult) -> String {
        let subtotal = self.currency.format(result.document.receipt.subtotal());
        let mut builder = SvgTableBuilder::new()
            .alignments(&ITEM_ALIGNMENTS)
            .headers(item_headers());
        for row in self.item_rows(result) {
            builder = builder.row(row);
        }
        builder
            .footer([i18n::SUBTOTAL, "", "", subtotal.as_str(), ""])
            .build()
    }

    pub fn format_discrepancy(&self, discrepancy: &ReceiptDiscrepancy) -> String {
        let label = match discrepancy.kind {
            DiscrepancyKind::Subtotal => i18n::SUBTOTAL,
            DiscrepancyKind::GrandTotal => i18n::GRAND_TOTAL,
        };
        i18n::total_mismatch(
            label,
            self.currency.format(discrepancy.stated),
            self.currency.format(discrepancy.computed),
        )
    }

    fn share_rows<'r>(&self, result: &'r SplitResult) -> Vec<[Cow<'r, str>; 7]> {
        result
            .allocation
            .iter()
            .map(|(id, share)| {
                [
                    participant_label(id, &result.selections),
                    Cow::Owned(self.currency.format(share.items)),
                    Cow::Owned(self.currency.format(share.tax)),
                    Cow::Owned(self.currency.format(share.service_charge)),
                    Cow::Owned(self.currency.format(-share.discount)),
                    Cow::Owned(format_basis_points(share.subtotal_ratio_bps)),
                    Cow::Owned(self.format_share_total(share)),
                ]
            })
            .collect()
    }

    fn format_share_total(&self, share: &ParticipantShare) -> String {
        let total = self.currency.format(share.total);
        if columns_disagree(share) {
            format!("{total}*")
        } else {
            total
        }
    }

    fn share_footer(&self, result: &SplitResult) -> [Cow<'static, str>; 7] {
        let column = |pick: fn(&ParticipantShare) -> Money| -> Money {
            result.allocation.iter().map(|(_, share)| pick(share)).sum()
        };
        let bps: u32 = result
            .allocation
            .iter()
            .map(|(_, share)| share.subtotal_ratio_bps)
            .sum();
        [
            Cow::Borrowed(i18n::TOTAL),
            Cow::Owned(self.currency.format(column(|s| s.items))),
            Cow::Owned(self.currency.format(column(|s| s.tax))),
            Cow::Owned(self.currency.format(column(|s| s.service_charge))),
            Cow::Owned(self.currency.format(-column(|s| s.discount))),
            Cow::Owned(format_basis_points(bps)),
            Cow::Owned(self.currency.format(result.allocation.total())),
        ]
    }

    fn item_rows<'r>(&self, result: &'r SplitResult) -> Vec<[Cow<'r, str>; 5]> {
        let receipt = &result.document.receipt;
        receipt
            .items()
            .iter()
            .zip(receipt.line_totals())
            .enumerate()
            .map(|(index, (item, line_total))| {
                [
                    Cow::Borrowed(item.name.as_str()),
                    Cow::Owned(item.quantity.to_string()),
                    Cow::Owned(self.currency.format(item.unit_price)),
                    Cow::Owned(self.currency.format(*line_total)),
                    Cow::Owned(shared_by(&result.selections, index)),
                ]
            })
            .collect()
    }
}

fn columns_disagree(share: &ParticipantShare) -> bool {
    share.items + share.tax + share.service_charge - share.discount != share.total
}

fn has_rounding_gap(result: &SplitResult) -> bool {
    result
        .allocation
        .iter()
        .any(|(_, share)| columns_disagree(share))
}

fn share_headers() -> [&'static str; 7] {
    [
        i18n::PARTICIPANT,
        i18n::ITEMS,
        i18n::TAX,
        i18n::SERVICE_CHARGE,
        i18n::DISCOUNT,
        i18n::SHARE,
        i18n::TOTAL,
    ]
}

fn item_headers() -> [&'static str; 5] {
    [
        i18n::ITEM,
        i18n::QUANTITY,
        i18n::UNIT_PRICE,
        i18n::LINE_TOTAL,
        i18n::SHARED_BY,
    ]
}

fn caption(metadata: &ReceiptMetadata) -> Option<String> {
    let parts: Vec<&str> = [&metadata.restaurant, &metadata.date, &metadata.time]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();
    (!parts.is_empty()).then(|| parts.join("  "))
}

fn participant_label(id: ParticipantId, directory: &dyn ParticipantDirectory) -> Cow<'_, str> {
    match directory.display_name(id) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(id.to_string()),
    }
}

fn shared_by(selections: &SelectionMap, index: usize) -> String {
    let selectors = selections.selectors(index);
    if selectors.is_empty() {
        return i18n::UNASSIGNED.to_owned();
    }
    selectors
        .iter()
        .map(|selector| {
            let name = participant_label(selector.participant, selections);
            if selector.weight == 1 {
                name.into_owned()
            } else {
                format!("{name}×{}", selector.weight)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Column-aligned plain text, padded by character count.
struct TextTable<'a> {
    alignments: &'a [Alignment],
    rows: Vec<Vec<String>>,
}

impl<'a> TextTable<'a> {
    fn new(alignments: &'a [Alignment]) -> Self {
        Self {
            alignments,
            rows: Vec::new(),
        }
    }

    fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rows
            .push(cells.into_iter().map(|c| c.as_ref().to_owned()).collect());
        self
    }

    fn render(&self) -> String {
        let col_count = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; col_count];
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for row in &self.rows {
            let mut line = String::new();
            for (idx, (cell, width)) in row.iter().zip(&widths).enumerate() {
                if idx > 0 {
                    line.push_str("  ");
                }
                let width = *width;
                match self.alignments.get(idx).copied().unwrap_or_default() {
                    Alignment::Right => {
                        let _ = write!(line, "{cell:>width$}");
                    }
                    Alignment::Center => {
                        let _ = write!(line, "{cell:^width$}");
                    }
                    Alignment::Left => {
                        let _ = write!(line, "{cell:<width$}");
                    }
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
