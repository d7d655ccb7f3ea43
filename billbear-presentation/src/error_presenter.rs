use billbear_application::{ReceiptReadError, SelectionSheetError, SplitError};
use billbear_domain::{AllocationError, ParticipantId, SelectionIssue};
use billbear_i18n as i18n;

/// Localized, user-facing description of a failed split.
pub fn format_split_error(error: &SplitError) -> String {
    match error {
        SplitError::Read(err) => format_read_error(err),
        SplitError::Selection(err) => format_sheet_error(err),
        SplitError::Allocation {
            source,
            item,
            participant,
        } => format_allocation_error(source, item.as_deref(), participant.as_deref()),
    }
}

fn format_read_error(error: &ReceiptReadError) -> String {
    match error {
        ReceiptReadError::Upstream { message } => i18n::receipt_unreadable(message),
        ReceiptReadError::Malformed { detail } => i18n::receipt_unreadable(detail),
        ReceiptReadError::InvalidAmount { field, value } => i18n::invalid_amount(field, value),
        ReceiptReadError::InvalidQuantity { .. } | ReceiptReadError::Receipt(_) => {
            i18n::invalid_receipt(error)
        }
    }
}

fn format_sheet_error(error: &SelectionSheetError) -> String {
    match error {
        SelectionSheetError::DuplicateParticipant { name } => i18n::duplicate_participant(name),
        SelectionSheetError::UnknownParticipant { name } => i18n::unknown_participant(name),
        SelectionSheetError::UnknownItem { item, .. } => i18n::unknown_item(item),
    }
}

fn format_allocation_error(
    error: &AllocationError,
    item: Option<&str>,
    participant: Option<&str>,
) -> String {
    let issue = match error {
        AllocationError::InvalidSelection(issue) => issue,
        AllocationError::EmptyReceipt => return i18n::EMPTY_RECEIPT.to_owned(),
        AllocationError::Overflow => return i18n::ALLOCATION_OVERFLOW.to_owned(),
    };

    let item_label = |index: usize| item.map_or_else(|| format!("#{index}"), str::to_owned);
    let participant_label =
        |id: ParticipantId| participant.map_or_else(|| id.to_string(), str::to_owned);

    match issue {
        SelectionIssue::NoSelectors { index } => i18n::item_without_selectors(item_label(*index)),
        SelectionIssue::ZeroWeight {
            index,
            participant: id,
        } => i18n::zero_weight(item_label(*index), participant_label(*id)),
        SelectionIssue::UnknownParticipant { participant: id, .. } => {
            i18n::unknown_participant(participant_label(*id))
        }
        SelectionIssue::DuplicateSelector {
            index,
            participant: id,
        } => i18n::duplicate_selector(item_label(*index), participant_label(*id)),
        SelectionIssue::DuplicateParticipant(id) => {
            i18n::duplicate_participant(participant_label(*id))
        }
        SelectionIssue::UnknownItem { index, .. } => i18n::unknown_item(item_label(*index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billbear_domain::ReceiptError;
    use rstest::rstest;

    #[rstest]
    #[case::upstream(
        SplitError::Read(ReceiptReadError::Upstream { message: "timeout".into() }),
        "timeout"
    )]
    #[case::invalid_amount(
        SplitError::Read(ReceiptReadError::InvalidAmount { field: "cgst".into(), value: "₹x".into() }),
        "₹x"
    )]
    #[case::receipt_overflow(
        SplitError::Read(ReceiptReadError::Receipt(ReceiptError::Overflow)),
        "overflow"
    )]
    #[case::unknown_item(
        SplitError::Selection(SelectionSheetError::UnknownItem {
            participant: "Asha".into(),
            item: "Gulab Jamun".into(),
        }),
        "Gulab Jamun"
    )]
    #[case::named_item(
        SplitError::Allocation {
            source: AllocationError::InvalidSelection(SelectionIssue::NoSelectors { index: 3 }),
            item: Some("Garlic Nan".into()),
            participant: None,
        },
        "Garlic Nan"
    )]
    #[case::unnamed_item(
        SplitError::Allocation {
            source: AllocationError::InvalidSelection(SelectionIssue::NoSelectors { index: 3 }),
            item: None,
            participant: None,
        },
        "#3"
    )]
    #[case::zero_weight(
        SplitError::Allocation {
            source: AllocationError::InvalidSelection(SelectionIssue::ZeroWeight {
                index: 0,
                participant: ParticipantId(2),
            }),
            item: Some("Lassi".into()),
            participant: Some("Ravi".into()),
        },
        "Ravi"
    )]
    fn message_names_the_culprit(#[case] error: SplitError, #[case] expected: &str) {
        let message = format_split_error(&error);
        assert!(message.contains(expected), "{message}");
    }

    #[rstest]
    #[case(AllocationError::EmptyReceipt, i18n::EMPTY_RECEIPT)]
    #[case(AllocationError::Overflow, i18n::ALLOCATION_OVERFLOW)]
    fn terminal_errors_use_fixed_messages(#[case] error: AllocationError, #[case] expected: &str) {
        assert_eq!(format_split_error(&SplitError::from(error)), expected);
    }
}
