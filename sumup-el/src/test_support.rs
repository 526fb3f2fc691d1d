//! Workbook fixtures for tests

use std::path::Path;

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

/// A cell to write into a fixture workbook
#[derive(Debug, Clone, Copy)]
pub enum Cell {
    Number(f64),
    Text(&'static str),
    /// `YYYY-MM-DD HH:MM:SS`, written as a real Excel date-time
    DateTime(&'static str),
    Blank,
}

/// Write a single-sheet workbook with a header row followed by `rows`
pub fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<Cell>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Number(n) => {
                    worksheet.write_number(row_num, col, *n).unwrap();
                }
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, *s).unwrap();
                }
                Cell::DateTime(s) => {
                    let dt = ExcelDateTime::parse_from_str(s).unwrap();
                    worksheet
                        .write_datetime_with_format(row_num, col, &dt, &date_format)
                        .unwrap();
                }
                Cell::Blank => {}
            }
        }
    }

    workbook.save(path).unwrap();
}

pub fn write_stores(dir: &Path) {
    write_workbook(
        &dir.join("stores.xlsx"),
        &["id", "name", "address", "city", "country", "created_at", "typology", "customer_id"],
        &[
            vec![
                Cell::Number(1.0),
                Cell::Text("Corner Shop"),
                Cell::Text("Main St 1"),
                Cell::Text("Berlin"),
                Cell::Text("Germany"),
                Cell::DateTime("2023-05-01 12:00:00"),
                Cell::Text("Retail"),
                Cell::Number(100.0),
            ],
            vec![
                Cell::Number(2.0),
                Cell::Text("Harbour Cafe"),
                Cell::Text("Quay 7"),
                Cell::Text("Lisbon"),
                Cell::Text("Portugal"),
                Cell::DateTime("2023-06-15 06:00:00"),
                Cell::Text("Food"),
                Cell::Number(101.0),
            ],
        ],
    );
}

pub fn write_devices(dir: &Path) {
    write_workbook(
        &dir.join("devices.xlsx"),
        &["id", "type", "store_id"],
        &[
            vec![Cell::Number(10.0), Cell::Number(1.0), Cell::Number(1.0)],
            vec![Cell::Number(11.0), Cell::Number(3.0), Cell::Number(2.0)],
            vec![Cell::Number(12.0), Cell::Number(5.0), Cell::Number(2.0)],
        ],
    );
}

pub const TRANSACTION_HEADERS: [&str; 6] = [
    "id",
    "device_id",
    "product_sku",
    "card_number",
    "happened_at",
    "created_at",
];

pub fn write_transactions(dir: &Path) {
    write_workbook(
        &dir.join("transactions.xlsx"),
        &TRANSACTION_HEADERS,
        &[
            vec![
                Cell::Number(1000.0),
                Cell::Number(10.0),
                Cell::Text("SKU-001"),
                Cell::Number(4111111111111111.0),
                Cell::DateTime("2024-01-05 10:30:00"),
                Cell::DateTime("2024-01-05 12:00:00"),
            ],
            vec![
                Cell::Number(1001.0),
                Cell::Number(11.0),
                Cell::Text("SKU-002"),
                Cell::Text("5500 0000 0000 0004"),
                Cell::DateTime("2024-01-06 06:00:00"),
                Cell::DateTime("2024-01-06 18:00:00"),
            ],
        ],
    );
}
