#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    AdjustmentKind, Allocation, Item, Money, Participant, ParticipantId, ParticipantShare,
    Receipt, ReceiptError, SelectionMap, Selector,
};
pub use services::{AllocationError, Allocator, SelectionIssue, allocate, apportion};
