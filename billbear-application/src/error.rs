use billbear_domain::{AllocationError, ReceiptError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptReadError {
    /// The OCR service answered with its own failure document.
    #[error("receipt service reported an error: {message}")]
    Upstream { message: String },
    #[error("receipt document is malformed: {detail}")]
    Malformed { detail: String },
    #[error("invalid amount for {field}: '{value}'")]
    InvalidAmount { field: String, value: String },
    #[error("item {index} has an invalid quantity")]
    InvalidQuantity { index: usize },
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionSheetError {
    #[error("participant '{name}' is listed more than once")]
    DuplicateParticipant { name: String },
    #[error("'{name}' picked items but is not on the roster")]
    UnknownParticipant { name: String },
    #[error("'{participant}' picked '{item}', which is not on the receipt")]
    UnknownItem { participant: String, item: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error(transparent)]
    Read(#[from] ReceiptReadError),
    #[error(transparent)]
    Selection(#[from] SelectionSheetError),
    /// Allocation failure, with the receipt item and participant names it
    /// refers to resolved for display.
    #[error("{source}")]
    Allocation {
        #[source]
        source: AllocationError,
        item: Option<String>,
        participant: Option<String>,
    },
}

impl From<AllocationError> for SplitError {
    fn from(source: AllocationError) -> Self {
        SplitError::Allocation {
            source,
            item: None,
            participant: None,
        }
    }
}
