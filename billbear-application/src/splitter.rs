use crate::{
    error::SplitError,
    model::{ReceiptDiscrepancy, ReceiptDocument},
    ports::{ParticipantDirectory, ReceiptReader, ReceiptSource},
    selection::SelectionSheet,
};
use billbear_domain::{Allocation, AllocationError, Allocator, SelectionIssue, SelectionMap};

/// Everything needed to present a finished split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    pub document: ReceiptDocument,
    pub selections: SelectionMap,
    pub allocation: Allocation,
    pub discrepancies: Vec<ReceiptDiscrepancy>,
}

pub struct BillSplitter<'a> {
    reader: &'a dyn ReceiptReader,
    allocator: Allocator,
}

impl<'a> BillSplitter<'a> {
    pub fn new(reader: &'a dyn ReceiptReader) -> Self {
        Self {
            reader,
            allocator: Allocator,
        }
    }

    pub fn split(
        &self,
        source: &ReceiptSource<'_>,
        sheet: &SelectionSheet,
    ) -> Result<SplitResult, SplitError> {
        let document = self.reader.read(source).inspect_err(|err| {
            tracing::warn!(
                reject_reason = "receipt_unreadable",
                filename = source.filename.unwrap_or("-"),
                error = %err,
                "Split rejected"
            );
        })?;
        self.split_document(document, sheet)
    }

    /// Splits an already-read receipt.
    pub fn split_document(
        &self,
        document: ReceiptDocument,
        sheet: &SelectionSheet,
    ) -> Result<SplitResult, SplitError> {
        let discrepancies = document.discrepancies();
        for discrepancy in &discrepancies {
            tracing::warn!(
                kind = ?discrepancy.kind,
                stated = %discrepancy.stated,
                computed = %discrepancy.computed,
                "Receipt total does not match its lines"
            );
        }

        let selections = sheet.build(&document.receipt).inspect_err(|err| {
            tracing::warn!(reject_reason = "invalid_sheet", error = %err, "Split rejected");
        })?;

        let allocation = self
            .allocator
            .allocate(&document.receipt, &selections)
            .map_err(|source| describe(source, &document, &selections))?;

        tracing::info!(
            participant_count = allocation.len(),
            grand_total = %allocation.grand_total(),
            discrepancy_count = discrepancies.len(),
            "Split completed"
        );

        Ok(SplitResult {
            document,
            selections,
            allocation,
            discrepancies,
        })
    }
}

fn describe(
    source: AllocationError,
    document: &ReceiptDocument,
    directory: &dyn ParticipantDirectory,
) -> SplitError {
    let (item, participant) = match &source {
        AllocationError::InvalidSelection(issue) => {
            let item = issue
                .item_index()
                .and_then(|index| document.receipt.items().get(index))
                .map(|item| item.name.clone());
            let participant = match issue {
                SelectionIssue::ZeroWeight { participant, .. }
                | SelectionIssue::UnknownParticipant { participant, .. }
                | SelectionIssue::DuplicateSelector { participant, .. }
                | SelectionIssue::DuplicateParticipant(participant) => Some(
                    directory
                        .display_name(*participant)
                        .map_or_else(|| participant.to_string(), str::to_owned),
                ),
                SelectionIssue::NoSelectors { .. } | SelectionIssue::UnknownItem { .. } => None,
            };
            (item, participant)
        }
        AllocationError::EmptyReceipt | AllocationError::Overflow => (None, None),
    };
    SplitError::Allocation {
        source,
        item,
        participant,
    }
}
