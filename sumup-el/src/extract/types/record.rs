//! Ordered header → value mapping for one spreadsheet row

use super::Value;

/// A single row of a sheet, keyed by the sheet's header row.
///
/// Field order follows the header order. Headers are expected to be unique;
/// lookups return the first match if they are not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Append a field
    pub fn push(&mut self, header: impl Into<String>, value: Value) {
        self.fields.push((header.into(), value));
    }

    /// Get the value stored under a header
    pub fn get(&self, header: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, value)| value)
    }

    /// Headers in field order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every field holds an empty value
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_empty())
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_keep_insertion_order() {
        let mut record = Record::new();
        record.push("id", Value::Int(1));
        record.push("name", Value::Text("Berlin".into()));
        record.push("city", Value::Empty);

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["id", "name", "city"]);
        assert_eq!(record.get("name"), Some(&Value::Text("Berlin".into())));
        assert_eq!(record.get("missing"), None);
        assert!(!record.is_blank());
    }

    #[test]
    fn test_blank_record() {
        let record: Record = vec![
            ("a".to_string(), Value::Empty),
            ("b".to_string(), Value::Empty),
        ]
        .into_iter()
        .collect();

        assert_eq!(record.len(), 2);
        assert!(record.is_blank());
    }
}
