//! Destination table schemas: column hints, type inference and value coercion

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

use crate::extract::{Record, Value};
use crate::extract::types::{excel_serial_to_timestamp, parse_timestamp};

/// Storage type of a destination column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bigint,
    Double,
    Bool,
    Text,
    Timestamp,
    Date,
}

impl DataType {
    /// Column type used in `CREATE TABLE`
    pub fn sql_type(self) -> &'static str {
        match self {
            DataType::Bigint => "BIGINT",
            DataType::Double => "DOUBLE",
            DataType::Bool => "BOOLEAN",
            DataType::Text => "TEXT",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Date => "DATE",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Bigint => write!(f, "bigint"),
            DataType::Double => write!(f, "double"),
            DataType::Bool => write!(f, "bool"),
            DataType::Text => write!(f, "text"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::Date => write!(f, "date"),
        }
    }
}

/// Declared type for a column, matched against normalised header names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHint {
    pub name: &'static str,
    pub data_type: DataType,
}

impl ColumnHint {
    pub const fn new(name: &'static str, data_type: DataType) -> Self {
        Self { name, data_type }
    }
}

/// A resolved destination column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Normalised column name
    pub name: String,
    /// Header the values come from; `None` for hinted columns missing from the sheet
    pub source: Option<String>,
    pub data_type: DataType,
}

/// A resolved destination table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

/// A value ready to be bound into an `INSERT`
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Double(f64),
    Bool(bool),
    Text(String),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
}

/// Normalise a header into a snake_case SQL identifier.
///
/// `Card Number` → `card_number`, `deviceId` → `device_id`, `2nd col` →
/// `_2nd_col`.
pub fn normalize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;
    let mut prev: Option<char> = None;

    for ch in name.trim().chars() {
        if ch.is_alphanumeric() || ch == '_' {
            let camel_boundary = ch.is_uppercase()
                && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
            if (pending_separator || camel_boundary) && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            pending_separator = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
        prev = Some(ch);
    }

    if out.is_empty() {
        return "_".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Resolve the destination schema for a table.
///
/// Columns follow header order; hinted columns absent from the headers are
/// appended. Unhinted columns get a type inferred from their values.
pub fn resolve_table_schema(
    table: &str,
    headers: &[String],
    records: &[Record],
    hints: &[ColumnHint],
) -> TableSchema {
    let mut columns = Vec::with_capacity(headers.len() + hints.len());
    let mut seen = HashSet::new();

    for header in headers.iter().filter(|h| !h.is_empty()) {
        let name = normalize_identifier(header);
        if !seen.insert(name.clone()) {
            log::warn!(
                "Table {}: header '{}' collides with an earlier column '{}', ignoring it",
                table,
                header,
                name
            );
            continue;
        }

        let data_type = match hints.iter().find(|h| normalize_identifier(h.name) == name) {
            Some(hint) => hint.data_type,
            None => infer_type(records.iter().filter_map(|r| r.get(header))),
        };

        columns.push(ColumnSchema {
            name,
            source: Some(header.clone()),
            data_type,
        });
    }

    for hint in hints {
        let name = normalize_identifier(hint.name);
        if seen.insert(name.clone()) {
            log::debug!("Table {}: hinted column '{}' not in sheet", table, name);
            columns.push(ColumnSchema {
                name,
                source: None,
                data_type: hint.data_type,
            });
        }
    }

    TableSchema {
        name: normalize_identifier(table),
        columns,
    }
}

/// Infer a column type from its values
pub fn infer_type<'a>(values: impl Iterator<Item = &'a Value>) -> DataType {
    let (mut ints, mut floats, mut timestamps, mut texts) = (false, false, false, false);

    for value in values {
        match value {
            Value::Empty => {}
            Value::Int(_) => ints = true,
            Value::Float(_) => floats = true,
            Value::Timestamp(_) => timestamps = true,
            Value::Text(_) => texts = true,
        }
    }

    if texts || (timestamps && (ints || floats)) {
        DataType::Text
    } else if timestamps {
        DataType::Timestamp
    } else if floats {
        DataType::Double
    } else if ints {
        DataType::Bigint
    } else {
        DataType::Text
    }
}

/// Coerce a value into a column type, or `None` if it cannot be represented
pub fn coerce(value: &Value, data_type: DataType) -> Option<SqlValue> {
    if value.is_empty() {
        return Some(SqlValue::Null);
    }

    match data_type {
        DataType::Bigint => match value {
            Value::Int(i) => Some(SqlValue::Int(*i)),
            Value::Float(f) => match Value::from_number(*f) {
                Value::Int(i) => Some(SqlValue::Int(i)),
                _ => None,
            },
            Value::Text(s) => s.trim().parse().ok().map(SqlValue::Int),
            _ => None,
        },
        DataType::Double => match value {
            Value::Int(_) | Value::Float(_) => value.as_float().map(SqlValue::Double),
            Value::Text(s) => s.trim().parse().ok().map(SqlValue::Double),
            _ => None,
        },
        DataType::Bool => match value {
            Value::Int(0) => Some(SqlValue::Bool(false)),
            Value::Int(1) => Some(SqlValue::Bool(true)),
            Value::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(SqlValue::Bool(true)),
                "false" | "no" | "0" => Some(SqlValue::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        DataType::Text => Some(SqlValue::Text(value.to_string())),
        DataType::Timestamp => to_timestamp(value).map(SqlValue::Timestamp),
        DataType::Date => to_timestamp(value).map(|ts| SqlValue::Date(ts.date())),
    }
}

fn to_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Timestamp(ts) => Some(*ts),
        Value::Int(_) | Value::Float(_) => value.as_float().and_then(excel_serial_to_timestamp),
        Value::Text(s) => parse_timestamp(s),
        Value::Empty => None,
    }
}

impl TableSchema {
    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Coerce records into bindable rows, one value per column
    pub fn coerce_rows(&self, records: &[Record]) -> Result<Vec<Vec<SqlValue>>> {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                self.columns
                    .iter()
                    .map(|column| {
                        let value = column
                            .source
                            .as_deref()
                            .and_then(|header| record.get(header))
                            .unwrap_or(&Value::Empty);
                        coerce(value, column.data_type).with_context(|| {
                            format!(
                                "Cannot load {} value '{}' into {}.{} ({}) at record {}",
                                value.type_name(),
                                value,
                                self.name,
                                column.name,
                                column.data_type,
                                idx + 1
                            )
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn record(fields: &[(&str, Value)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("id"), "id");
        assert_eq!(normalize_identifier("Card Number"), "card_number");
        assert_eq!(normalize_identifier("deviceId"), "device_id");
        assert_eq!(normalize_identifier("StoreID"), "store_id");
        assert_eq!(normalize_identifier("  happened at (UTC) "), "happened_at_utc");
        assert_eq!(normalize_identifier("product-sku"), "product_sku");
        assert_eq!(normalize_identifier("2nd col"), "_2nd_col");
        assert_eq!(normalize_identifier("_dlt_id"), "_dlt_id");
        assert_eq!(normalize_identifier("%%"), "_");
    }

    #[test]
    fn test_infer_type() {
        let infer = |values: Vec<Value>| infer_type(values.iter());

        assert_eq!(infer(vec![Value::Int(1), Value::Empty]), DataType::Bigint);
        assert_eq!(infer(vec![Value::Int(1), Value::Float(1.5)]), DataType::Double);
        assert_eq!(
            infer(vec![Value::Timestamp(ts("2024-01-01 00:00:00"))]),
            DataType::Timestamp
        );
        assert_eq!(
            infer(vec![Value::Int(1), Value::Text("x".into())]),
            DataType::Text
        );
        assert_eq!(
            infer(vec![Value::Int(1), Value::Timestamp(ts("2024-01-01 00:00:00"))]),
            DataType::Text
        );
        assert_eq!(infer(vec![Value::Empty]), DataType::Text);
    }

    #[test]
    fn test_resolve_uses_hints_and_header_order() {
        let headers = vec![
            "id".to_string(),
            "Type".to_string(),
            "store_id".to_string(),
            "label".to_string(),
        ];
        let records = vec![record(&[
            ("id", Value::Int(1)),
            ("Type", Value::Int(2)),
            ("store_id", Value::Int(3)),
            ("label", Value::Float(0.5)),
        ])];
        let hints = [
            ColumnHint::new("id", DataType::Bigint),
            ColumnHint::new("store_id", DataType::Bigint),
            ColumnHint::new("created_at", DataType::Timestamp),
            ColumnHint::new("type", DataType::Text),
        ];

        let schema = resolve_table_schema("devices", &headers, &records, &hints);

        assert_eq!(schema.name, "devices");
        assert_eq!(
            schema.column_names(),
            vec!["id", "type", "store_id", "label", "created_at"]
        );
        let types: Vec<DataType> = schema.columns.iter().map(|c| c.data_type).collect();
        assert_eq!(
            types,
            vec![
                DataType::Bigint,
                DataType::Text,
                DataType::Bigint,
                DataType::Double,
                DataType::Timestamp
            ]
        );
        assert_eq!(schema.columns[1].source.as_deref(), Some("Type"));
        assert_eq!(schema.columns[4].source, None);
    }

    #[test]
    fn test_resolve_skips_colliding_headers() {
        let headers = vec!["Card Number".to_string(), "card_number".to_string()];
        let schema = resolve_table_schema("transactions", &headers, &[], &[]);

        assert_eq!(schema.column_names(), vec!["card_number"]);
        assert_eq!(schema.columns[0].source.as_deref(), Some("Card Number"));
    }

    #[test]
    fn test_coerce_bigint() {
        assert_eq!(coerce(&Value::Int(5), DataType::Bigint), Some(SqlValue::Int(5)));
        assert_eq!(coerce(&Value::Float(5.0), DataType::Bigint), Some(SqlValue::Int(5)));
        assert_eq!(coerce(&Value::Text(" 42 ".into()), DataType::Bigint), Some(SqlValue::Int(42)));
        assert_eq!(coerce(&Value::Float(5.5), DataType::Bigint), None);
        assert_eq!(coerce(&Value::Text("abc".into()), DataType::Bigint), None);
        assert_eq!(coerce(&Value::Empty, DataType::Bigint), Some(SqlValue::Null));
    }

    #[test]
    fn test_coerce_text_renders_numbers() {
        assert_eq!(
            coerce(&Value::Int(4111111111111111), DataType::Text),
            Some(SqlValue::Text("4111111111111111".into()))
        );
        assert_eq!(
            coerce(&Value::Text("SKU-1".into()), DataType::Text),
            Some(SqlValue::Text("SKU-1".into()))
        );
    }

    #[test]
    fn test_coerce_timestamp_and_date() {
        let expected = ts("2024-01-05 10:30:00");
        assert_eq!(
            coerce(&Value::Timestamp(expected), DataType::Timestamp),
            Some(SqlValue::Timestamp(expected))
        );
        assert_eq!(
            coerce(&Value::Float(45296.4375), DataType::Timestamp),
            Some(SqlValue::Timestamp(expected))
        );
        assert_eq!(
            coerce(&Value::Text("2024-01-05 10:30:00".into()), DataType::Timestamp),
            Some(SqlValue::Timestamp(expected))
        );
        assert_eq!(
            coerce(&Value::Timestamp(expected), DataType::Date),
            Some(SqlValue::Date(expected.date()))
        );
        assert_eq!(coerce(&Value::Text("soon".into()), DataType::Timestamp), None);
    }

    #[test]
    fn test_coerce_bool_and_double() {
        assert_eq!(coerce(&Value::Int(1), DataType::Bool), Some(SqlValue::Bool(true)));
        assert_eq!(coerce(&Value::Text("No".into()), DataType::Bool), Some(SqlValue::Bool(false)));
        assert_eq!(coerce(&Value::Int(7), DataType::Bool), None);
        assert_eq!(coerce(&Value::Int(2), DataType::Double), Some(SqlValue::Double(2.0)));
        assert_eq!(coerce(&Value::Text("2.5".into()), DataType::Double), Some(SqlValue::Double(2.5)));
    }

    #[test]
    fn test_coerce_rows_reports_bad_value() {
        let schema = resolve_table_schema(
            "stores",
            &["id".to_string()],
            &[],
            &[ColumnHint::new("id", DataType::Bigint)],
        );
        let records = vec![
            record(&[("id", Value::Int(1))]),
            record(&[("id", Value::Text("seven".into()))]),
        ];

        let err = schema.coerce_rows(&records).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("stores.id"));
        assert!(message.contains("record 2"));
    }

    #[test]
    fn test_coerce_rows_fills_missing_columns() {
        let schema = resolve_table_schema(
            "devices",
            &["id".to_string()],
            &[],
            &[
                ColumnHint::new("id", DataType::Bigint),
                ColumnHint::new("created_at", DataType::Timestamp),
            ],
        );
        let rows = schema
            .coerce_rows(&[record(&[("id", Value::Int(9))])])
            .unwrap();

        assert_eq!(rows, vec![vec![SqlValue::Int(9), SqlValue::Null]]);
    }
}
