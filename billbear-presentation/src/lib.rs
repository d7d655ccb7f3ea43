#![warn(clippy::uninlined_format_args)]

pub mod breakdown_presenter;
pub mod currency;
pub mod error_presenter;
pub mod svg_table;

pub use breakdown_presenter::{BreakdownPresenter, BreakdownView};
pub use currency::CurrencyFormat;
pub use error_presenter::format_split_error;
pub use svg_table::{Alignment, SvgTableBuilder, combine_svgs_vertically};
