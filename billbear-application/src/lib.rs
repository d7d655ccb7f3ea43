#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod selection;
pub mod splitter;

pub use error::{ReceiptReadError, SelectionSheetError, SplitError};
pub use model::{DiscrepancyKind, ReceiptDiscrepancy, ReceiptDocument, ReceiptMetadata};
pub use ports::{ParticipantDirectory, ReceiptReader, ReceiptSource};
pub use selection::{Pick, SelectionSheet};
pub use splitter::{BillSplitter, SplitResult};
