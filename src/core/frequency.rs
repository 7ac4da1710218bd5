// wspscan - core/frequency.rs
//
// Frequency aggregation over a merged error listing. Core layer: pure
// logic, no I/O.
//
// Rows are grouped by their normalised description; the output ordering
// (longest description first, ties case-insensitive ascending) is a
// contract that downstream group and summary views rely on.

use crate::core::model::{CanonicalTable, ErrorFrequencyEntry};
use crate::util::constants;
use crate::util::error::ColumnError;
use std::collections::HashMap;

/// Canonical form of an error description: trimmed and upper-cased.
/// All description matching in the pipeline goes through this.
pub fn normalize_description(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Aggregate a listing into per-description occurrence counts.
///
/// Each entry carries the last-seen value of the table's code column for
/// that description; when the table has no column whose name contains
/// "code", the fixed placeholder is used instead. An empty table yields an
/// empty list. A table lacking `description_column` is an error the caller
/// downgrades to a warning.
pub fn summarize(
    table: &CanonicalTable,
    description_column: &str,
) -> Result<Vec<ErrorFrequencyEntry>, ColumnError> {
    let desc_col = table
        .column_index(description_column)
        .ok_or_else(|| ColumnError::Missing {
            column: description_column.to_string(),
            context: "frequency summary",
        })?;

    let code_col = table.column_index_containing(constants::CODE_COLUMN_MARKER);
    if code_col.is_none() {
        tracing::debug!(
            placeholder = constants::FALLBACK_ERROR_CODE,
            "Listing has no code column"
        );
    }

    let mut counts: HashMap<String, (u64, String)> = HashMap::new();
    for row in &table.rows {
        let description = normalize_description(&row[desc_col]);
        let code = match code_col {
            Some(c) => row[c].trim().to_string(),
            None => constants::FALLBACK_ERROR_CODE.to_string(),
        };

        let slot = counts.entry(description).or_insert((0, code.clone()));
        slot.0 += 1;
        slot.1 = code;
    }

    let mut entries: Vec<ErrorFrequencyEntry> = counts
        .into_iter()
        .map(|(description, (frequency, code))| ErrorFrequencyEntry {
            code,
            description,
            frequency,
        })
        .collect();

    // Longest description first; ties break case-insensitively ascending.
    entries.sort_by(|a, b| {
        b.description
            .chars()
            .count()
            .cmp(&a.description.chars().count())
            .then_with(|| a.description.to_lowercase().cmp(&b.description.to_lowercase()))
    });

    tracing::debug!(
        rows = table.row_count(),
        distinct = entries.len(),
        "Frequency summary built"
    );

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(rows: &[(&str, &str)]) -> CanonicalTable {
        CanonicalTable::new(
            vec!["Code(hex)".to_string(), "Description".to_string()],
            rows.iter()
                .map(|(code, desc)| vec![code.to_string(), desc.to_string()])
                .collect(),
        )
    }

    #[test]
    fn test_counts_sum_to_row_count() {
        let t = listing(&[
            ("1A", "E_SENS_FR1"),
            ("1A", "E_SENS_FR1"),
            ("2B", "AXLE1_LOCK"),
        ]);
        let entries = summarize(&t, "Description").unwrap();
        let total: u64 = entries.iter().map(|e| e.frequency).sum();
        assert_eq!(total, 3);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_descriptions_are_normalized_before_grouping() {
        let t = listing(&[("1A", "  e_sens_fr1 "), ("1A", "E_SENS_FR1")]);
        let entries = summarize(&t, "Description").unwrap();
        assert_eq!(entries.len(), 1, "case and padding variants merge");
        assert_eq!(entries[0].description, "E_SENS_FR1");
        assert_eq!(entries[0].frequency, 2);
    }

    #[test]
    fn test_ordering_longest_first_then_lexicographic() {
        let t = listing(&[
            ("1", "B_ERR"),
            ("2", "A_ERR"),
            ("3", "MUCH_LONGER_ERROR"),
        ]);
        let entries = summarize(&t, "Description").unwrap();
        let descriptions: Vec<&str> =
            entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["MUCH_LONGER_ERROR", "A_ERR", "B_ERR"]);
    }

    #[test]
    fn test_code_is_last_seen_per_description() {
        let t = listing(&[("01", "E_SENS_FR1"), ("02", "E_SENS_FR1")]);
        let entries = summarize(&t, "Description").unwrap();
        assert_eq!(entries[0].code, "02");
    }

    #[test]
    fn test_missing_code_column_uses_placeholder() {
        let t = CanonicalTable::new(
            vec!["No".to_string(), "Description".to_string()],
            vec![vec!["1".to_string(), "E_SENS_FR1".to_string()]],
        );
        let entries = summarize(&t, "Description").unwrap();
        assert_eq!(entries[0].code, constants::FALLBACK_ERROR_CODE);
    }

    #[test]
    fn test_missing_description_column_is_an_error() {
        let t = listing(&[("1A", "E_SENS_FR1")]);
        assert!(matches!(
            summarize(&t, "Desc"),
            Err(ColumnError::Missing { .. })
        ));
    }

    #[test]
    fn test_empty_table_yields_empty_list() {
        let t = listing(&[]);
        let entries = summarize(&t, "Description").unwrap();
        assert!(entries.is_empty());
    }
}
