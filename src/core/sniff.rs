// wspscan - core/sniff.rs
//
// Heuristic location and extraction of the main tabular section inside a
// raw export file. Core layer: operates on cleaned lines, never touches
// the filesystem directly.
//
// Export files mix free-text preamble/postamble with one delimited table.
// The sniffer finds the table's header row and delimiter; the extractor
// lifts the contiguous run of rows sharing the header's column count.

use crate::core::model::{CanonicalTable, SniffResult};
use crate::util::constants;
use crate::util::error::ExtractError;
use std::collections::HashMap;

// =============================================================================
// Line cleanup
// =============================================================================

/// Split raw file content into cleaned lines.
///
/// Each line is trimmed of surrounding whitespace and of the padding
/// separators export tools append to rows; blank lines are dropped. All
/// later indices (header, section bounds) refer to this cleaned list.
pub fn clean_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|l| l.trim().trim_matches(constants::LINE_TRIM_SET))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Sniffing
// =============================================================================

/// Locate the header row and delimiter of a file's main tabular section.
///
/// Delimiter candidates are tried in priority order; for each, the header
/// is the first line whose delimiter count exceeds the fixed threshold.
/// The first candidate with any qualifying line wins, so a semicolon
/// header beats a comma-heavy description line further down.
///
/// Errors with `NoStructuredSection` when no line qualifies for either
/// delimiter.
pub fn sniff(lines: &[String]) -> Result<SniffResult, ExtractError> {
    for &delimiter in constants::DELIMITER_CANDIDATES {
        let qualifying = lines
            .iter()
            .position(|l| l.matches(delimiter).count() > constants::HEADER_MIN_DELIMITERS);

        if let Some(header_index) = qualifying {
            let preview: String = lines[header_index]
                .chars()
                .take(constants::DEBUG_MAX_LINE_PREVIEW)
                .collect();
            tracing::debug!(
                header_index,
                delimiter = %delimiter,
                header = %preview,
                "Header sniffed"
            );
            return Ok(SniffResult {
                header_index,
                delimiter,
            });
        }
    }

    Err(ExtractError::NoStructuredSection {
        lines_scanned: lines.len(),
    })
}

// =============================================================================
// Section extraction
// =============================================================================

/// Extract the contiguous tabular section starting at the sniffed header.
///
/// The header row fixes the column count; the section ends at the first
/// subsequent line whose column count differs, or at end of input. Columns
/// that are empty in every data row are dropped. Duplicate header names
/// are disambiguated positionally so cell lookup by name stays well
/// defined.
pub fn extract_section(lines: &[String], sniff: &SniffResult) -> CanonicalTable {
    let header = &lines[sniff.header_index];
    let columns = disambiguate_columns(
        header
            .split(sniff.delimiter)
            .map(|name| name.trim().to_string())
            .collect(),
    );
    let column_count = columns.len();

    let data_start = sniff.header_index + 1;
    let mut data_end = lines.len();
    for (offset, line) in lines[data_start..].iter().enumerate() {
        if line.matches(sniff.delimiter).count() + 1 != column_count {
            data_end = data_start + offset;
            break;
        }
    }

    let rows: Vec<Vec<String>> = lines[data_start..data_end]
        .iter()
        .map(|line| {
            line.split(sniff.delimiter)
                .map(str::to_string)
                .collect()
        })
        .collect();

    let mut table = CanonicalTable::new(columns, rows);
    table.drop_empty_columns();

    tracing::debug!(
        columns = table.column_count(),
        rows = table.row_count(),
        "Section extracted"
    );

    table
}

/// Rename duplicate column names positionally: NAME, NAME.1, NAME.2, ...
fn disambiguate_columns(names: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            let count = seen.entry(name.clone()).or_insert(0);
            let out = if *count == 0 {
                name.clone()
            } else {
                format!("{name}.{count}")
            };
            *count += 1;
            out
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &str) -> Vec<String> {
        clean_lines(raw)
    }

    #[test]
    fn test_clean_lines_trims_padding_and_drops_blanks() {
        let cleaned = lines("  TROUBLESHOOTING DATA ;;; \n\n  \na;b;c;d ; \n");
        assert_eq!(cleaned, vec!["TROUBLESHOOTING DATA", "a;b;c;d"]);
    }

    #[test]
    fn test_sniff_finds_first_qualifying_line() {
        let cleaned = lines(
            "preamble text\n\
             one;semi\n\
             No;Time;Code;Description\n\
             1;t1;0A;E_SENS_FR1\n",
        );
        let result = sniff(&cleaned).unwrap();
        assert_eq!(result.header_index, 2, "two semicolons do not qualify");
        assert_eq!(result.delimiter, ';');
    }

    #[test]
    fn test_sniff_prefers_semicolon_over_comma() {
        // The comma line qualifies earlier, but semicolon is checked first
        // across the whole file.
        let cleaned = lines(
            "a,b,c,d\n\
             w;x;y;z\n",
        );
        let result = sniff(&cleaned).unwrap();
        assert_eq!(result.delimiter, ';');
        assert_eq!(result.header_index, 1);
    }

    #[test]
    fn test_sniff_falls_back_to_comma() {
        let cleaned = lines("plain text\na,b,c,d\n1,2,3,4\n");
        let result = sniff(&cleaned).unwrap();
        assert_eq!(result.delimiter, ',');
        assert_eq!(result.header_index, 1);
    }

    #[test]
    fn test_sniff_no_section_errors() {
        let cleaned = lines("no table here\njust prose; with one semi\n");
        let err = sniff(&cleaned).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::NoStructuredSection { lines_scanned: 2 }
        ));
    }

    #[test]
    fn test_extract_stops_at_column_count_mismatch() {
        let cleaned = lines(
            "No;Time;Code;Description\n\
             1;t1;0A;E_SENS_FR1\n\
             2;t2;0B;AXLE1_LOCK\n\
             End of listing\n\
             stray;line;x;y\n",
        );
        let s = sniff(&cleaned).unwrap();
        let table = extract_section(&cleaned, &s);

        assert_eq!(table.columns, vec!["No", "Time", "Code", "Description"]);
        assert_eq!(table.row_count(), 2, "section ends at the prose line");
    }

    #[test]
    fn test_extract_runs_to_end_of_input() {
        let cleaned = lines(
            "No;Time;Code;Description\n\
             1;t1;0A;E_SENS_FR1\n\
             2;t2;0B;AXLE1_LOCK\n",
        );
        let s = sniff(&cleaned).unwrap();
        let table = extract_section(&cleaned, &s);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_extract_drops_all_empty_columns() {
        let cleaned = lines(
            "A;B;C;D\n\
             1;;x;2\n\
             3;;y;4\n",
        );
        let s = sniff(&cleaned).unwrap();
        let table = extract_section(&cleaned, &s);
        assert_eq!(table.columns, vec!["A", "C", "D"]);
    }

    #[test]
    fn test_extract_disambiguates_duplicate_headers() {
        let cleaned = lines(
            "Code;Value;Code;Value\n\
             1;2;3;4\n",
        );
        let s = sniff(&cleaned).unwrap();
        let table = extract_section(&cleaned, &s);
        assert_eq!(table.columns, vec!["Code", "Value", "Code.1", "Value.1"]);
        assert_eq!(table.cell(0, 2), "3");
    }

    #[test]
    fn test_extract_header_names_are_trimmed() {
        let cleaned = lines("No ; Time ;Code; Description\n1;t;c;d\n");
        let s = sniff(&cleaned).unwrap();
        let table = extract_section(&cleaned, &s);
        assert_eq!(table.columns, vec!["No", "Time", "Code", "Description"]);
    }
}
