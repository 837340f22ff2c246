//! Source table rows

use serde::{Deserialize, Serialize};

/// One source row: ordered column → value pairs, verbatim from the upload.
///
/// Immutable once loaded. Columns the review workflow cares about
/// (`brand`, `UPC`, `description`, `category`, `IS_DELETED`,
/// `Is Brand ID Null?`) are optional; a missing column reads as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Value of a column, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Column names in upload order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Column → value pairs in upload order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new(vec![
            ("brand".to_string(), "Acme".to_string()),
            ("UPC".to_string(), "012345".to_string()),
        ])
    }

    #[test]
    fn get_returns_value_for_present_column() {
        assert_eq!(sample().get("brand"), "Acme");
    }

    #[test]
    fn get_returns_empty_for_missing_column() {
        assert_eq!(sample().get("category"), "");
    }

    #[test]
    fn serializes_as_ordered_pairs() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"[["brand","Acme"],["UPC","012345"]]"#);
        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}
