//! Excel workbook reading

pub mod reader;

pub use reader::{Sheet, read_records, read_sheet};
