//! CSV ingest and export
//!
//! Import reads every cell as a string and preserves header order; short
//! records are padded with empty strings rather than rejected. Export
//! writes one record per committed decision, in commit order, with the
//! review columns appended after the original columns.

use csv::{ReaderBuilder, Trim, WriterBuilder};
use fidorev_common::{Error, Result};

use crate::models::{ReviewDecision, Row};

/// Review columns appended to the original table on export
pub const DECISION_COLUMNS: [&str; 7] = [
    "Action",
    "Updated Brand",
    "Updated Category",
    "Updated Description",
    "Reason",
    "Reviewed By",
    "Review Time (sec)",
];

/// An uploaded table: header order plus the parsed rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Parse uploaded CSV text.
///
/// Flexible on record length: a short record reads missing cells as `""`,
/// extra cells beyond the header are dropped.
pub fn parse_table(csv_text: &str) -> Result<ParsedTable> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| Error::InvalidInput(format!("Failed to read CSV headers: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            Error::InvalidInput(format!("Failed to parse CSV row {}: {}", index + 1, e))
        })?;

        let fields = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let value = record.get(i).unwrap_or("").to_string();
                (column.clone(), value)
            })
            .collect();
        rows.push(Row::new(fields));
    }

    Ok(ParsedTable { columns, rows })
}

/// Render committed decisions as the cleaned CSV download.
pub fn export_decisions(columns: &[String], decisions: &[ReviewDecision]) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    let header: Vec<&str> = columns
        .iter()
        .map(|c| c.as_str())
        .chain(DECISION_COLUMNS)
        .collect();
    writer
        .write_record(&header)
        .map_err(|e| Error::Internal(format!("Failed to write CSV header: {}", e)))?;

    for decision in decisions {
        let mut record: Vec<String> = columns
            .iter()
            .map(|column| decision.row.get(column).to_string())
            .collect();
        record.push(decision.action.as_str().to_string());
        record.push(decision.updated_brand.clone());
        record.push(decision.updated_category.clone());
        record.push(decision.updated_description.clone());
        record.push(decision.reason.clone());
        record.push(decision.reviewer_id.clone());
        record.push(format!("{:.2}", decision.review_duration_seconds));

        writer
            .write_record(&record)
            .map_err(|e| Error::Internal(format!("Failed to write CSV record: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("Failed to flush CSV writer: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Internal(format!("Invalid UTF-8 in CSV: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewAction;
    use chrono::Utc;

    #[test]
    fn parse_preserves_header_order_and_values() {
        let table = parse_table("brand,UPC,category\nAcme,0123,Snacks\nZyx,0456,Drinks\n").unwrap();
        assert_eq!(table.columns, vec!["brand", "UPC", "category"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("brand"), "Acme");
        assert_eq!(table.rows[1].get("category"), "Drinks");
    }

    #[test]
    fn short_records_pad_with_empty_strings() {
        let table = parse_table("brand,UPC,category\nAcme,0123\n").unwrap();
        assert_eq!(table.rows[0].get("UPC"), "0123");
        assert_eq!(table.rows[0].get("category"), "");
    }

    #[test]
    fn missing_workflow_columns_are_not_fatal() {
        // The review workflow tolerates tables without brand/category etc.
        let table = parse_table("FIDO,whatever\n1,x\n").unwrap();
        assert_eq!(table.rows[0].get("brand"), "");
    }

    #[test]
    fn export_appends_review_columns_in_commit_order() {
        let columns = vec!["brand".to_string(), "UPC".to_string()];
        let decisions = vec![ReviewDecision {
            row: Row::new(vec![
                ("brand".to_string(), "Acme".to_string()),
                ("UPC".to_string(), "0123".to_string()),
            ]),
            action: ReviewAction::Edit,
            updated_brand: "Acme Corp".to_string(),
            updated_category: String::new(),
            updated_description: String::new(),
            reason: "brand truncated".to_string(),
            reviewer_id: "reviewer1".to_string(),
            review_duration_seconds: 12.5,
            committed_at: Utc::now(),
        }];

        let csv = export_decisions(&columns, &decisions).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "brand,UPC,Action,Updated Brand,Updated Category,Updated Description,Reason,Reviewed By,Review Time (sec)"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Acme,0123,Edit,Acme Corp,,,brand truncated,reviewer1,12.50"
        );
    }

    #[test]
    fn export_with_no_decisions_is_header_only() {
        let csv = export_decisions(&["brand".to_string()], &[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
