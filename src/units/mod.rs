//! Magnitude parsing and byte/bit formatting

pub mod format;
pub mod parse;
pub mod scale;

pub use format::{format_value, render_number, truncate_to_buffer, FormatResult, FormatSpec};
pub use parse::{
    parse_magnitude, parse_magnitude_int, parse_magnitude_rate, scan_magnitude, Magnitude,
};
pub use scale::{Base, Quantity, ScaleLevel, ScaleTable, BIT_TABLE, BYTE_TABLE};
