use billbear_domain::{Money, Receipt};

/// Descriptive fields printed on the receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptMetadata {
    pub restaurant: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// A normalized receipt together with what the paper receipt claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptDocument {
    pub receipt: Receipt,
    pub metadata: ReceiptMetadata,
    pub stated_subtotal: Option<Money>,
    pub stated_total: Option<Money>,
}

impl ReceiptDocument {
    pub fn new(receipt: Receipt) -> Self {
        Self {
            receipt,
            metadata: ReceiptMetadata::default(),
            stated_subtotal: None,
            stated_total: None,
        }
    }

    /// Printed totals that disagree with the totals derived from the lines.
    pub fn discrepancies(&self) -> Vec<ReceiptDiscrepancy> {
        [
            (
                DiscrepancyKind::Subtotal,
                self.stated_subtotal,
                self.receipt.subtotal(),
            ),
            (
                DiscrepancyKind::GrandTotal,
                self.stated_total,
                self.receipt.grand_total(),
            ),
        ]
        .into_iter()
        .filter_map(|(kind, stated, computed)| {
            let stated = stated?;
            (stated != computed).then_some(ReceiptDiscrepancy {
                kind,
                stated,
                computed,
            })
        })
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscrepancyKind {
    Subtotal,
    GrandTotal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptDiscrepancy {
    pub kind: DiscrepancyKind,
    pub stated: Money,
    pub computed: Money,
}
