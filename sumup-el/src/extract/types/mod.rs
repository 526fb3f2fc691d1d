//! Data types for extracted rows

pub mod record;
pub mod value;

pub use record::Record;
pub use value::{Value, excel_serial_to_timestamp, parse_timestamp};
