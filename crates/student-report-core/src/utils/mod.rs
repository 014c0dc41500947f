//! Formatting helpers shared by the report renderer and error messages.

pub mod format;

pub use format::{format_date, int_or_na, truncate_body, value_or_na, NOT_AVAILABLE};
