//! Source datasets: which workbook feeds which table, and with which column types

use std::path::{Path, PathBuf};

use crate::load::{ColumnHint, DataType};

/// A source workbook and the table it replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetDescriptor {
    /// Destination table
    pub table: &'static str,
    /// Workbook file name, relative to the raw data directory
    pub file_name: &'static str,
    /// Declared column types
    pub columns: &'static [ColumnHint],
}

impl DatasetDescriptor {
    /// Full path of the source workbook
    pub fn source_path(&self, raw_data_path: &Path) -> PathBuf {
        raw_data_path.join(self.file_name)
    }
}

pub static STORES: DatasetDescriptor = DatasetDescriptor {
    table: "stores",
    file_name: "stores.xlsx",
    columns: &[ColumnHint::new("id", DataType::Bigint)],
};

pub static DEVICES: DatasetDescriptor = DatasetDescriptor {
    table: "devices",
    file_name: "devices.xlsx",
    columns: &[
        ColumnHint::new("id", DataType::Bigint),
        ColumnHint::new("store_id", DataType::Bigint),
        ColumnHint::new("created_at", DataType::Timestamp),
        ColumnHint::new("type", DataType::Bigint),
    ],
};

pub static TRANSACTIONS: DatasetDescriptor = DatasetDescriptor {
    table: "transactions",
    file_name: "transactions.xlsx",
    columns: &[
        ColumnHint::new("id", DataType::Bigint),
        ColumnHint::new("device_id", DataType::Bigint),
        ColumnHint::new("product_sku", DataType::Text),
        ColumnHint::new("card_number", DataType::Text),
        ColumnHint::new("happened_at", DataType::Timestamp),
        ColumnHint::new("created_at", DataType::Timestamp),
    ],
};

/// All datasets, in load order
pub static ALL: [&DatasetDescriptor; 3] = [&STORES, &DEVICES, &TRANSACTIONS];
