//! Extraction of source workbooks into typed records

pub mod excel;
pub mod types;

pub use excel::{Sheet, read_records, read_sheet};
pub use types::{Record, Value};
