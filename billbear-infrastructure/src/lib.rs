#![warn(clippy::uninlined_format_args)]

pub mod amount;
pub mod json_receipt;

pub use amount::{AmountError, is_missing_marker, parse_amount};
pub use json_receipt::{DEFAULT_CURRENCY_SCALE, JsonReceiptReader};
