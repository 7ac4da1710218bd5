// wspscan - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::error::ColumnError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

// =============================================================================
// Canonical table
// =============================================================================

/// A delimited section lifted out of a raw export file: ordered named
/// columns and ordered rows of string cells.
///
/// Cells stay as strings; numeric interpretation happens on demand via
/// [`CanonicalTable::numeric_column`]. Every row holds exactly one cell per
/// column.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CanonicalTable {
    /// Column names in source order. Duplicate source names are
    /// disambiguated positionally at extraction time (NAME, NAME.1, ...).
    pub columns: Vec<String>,

    /// Row-major cell data. Invariant: `rows[i].len() == columns.len()`.
    pub rows: Vec<Vec<String>>,
}

impl CanonicalTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// True when the table holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Index of the column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of the first column whose name contains `marker`
    /// case-insensitively. Used to locate loosely-named columns such as
    /// "Code(hex)".
    pub fn column_index_containing(&self, marker: &str) -> Option<usize> {
        let marker = marker.to_lowercase();
        self.columns
            .iter()
            .position(|c| c.to_lowercase().contains(&marker))
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        &self.rows[row][col]
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |r| r[col].as_str())
    }

    /// Parse an entire column as `f64` samples.
    ///
    /// `context` names the operation for the error message. Any cell that
    /// fails to parse fails the whole column, so callers can skip the
    /// affected channel rather than work with partial data.
    pub fn numeric_column(&self, name: &str, context: &'static str) -> Result<Vec<f64>, ColumnError> {
        let col = self
            .column_index(name)
            .ok_or_else(|| ColumnError::Missing {
                column: name.to_string(),
                context,
            })?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells[col]
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ColumnError::NumericParse {
                        column: name.to_string(),
                        row,
                        value: cells[col].clone(),
                    })
            })
            .collect()
    }

    /// Project the table onto the named columns, in the given order.
    /// Returns `None` if any requested column is absent.
    pub fn select_columns(&self, names: &[String]) -> Option<CanonicalTable> {
        let indices: Option<Vec<usize>> =
            names.iter().map(|n| self.column_index(n)).collect();
        let indices = indices?;

        let rows = self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect();

        Some(CanonicalTable::new(names.to_vec(), rows))
    }

    /// Drop columns whose cells are empty in every row.
    ///
    /// A table with zero rows is left untouched: with no data every column
    /// would be vacuously empty and the header would be lost.
    pub fn drop_empty_columns(&mut self) {
        if self.rows.is_empty() {
            return;
        }

        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| self.rows.iter().any(|r| !r[i].trim().is_empty()))
            .collect();

        if keep.len() == self.columns.len() {
            return;
        }

        self.columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            *row = keep.iter().map(|&i| row[i].clone()).collect();
        }
    }

    /// Append another table's rows, aligning columns by name (outer join).
    ///
    /// Columns present only in `other` are appended in first-seen order and
    /// backfilled with empty cells for existing rows; columns absent from
    /// `other` are filled with empty cells for its rows.
    pub fn append(&mut self, other: &CanonicalTable) {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other.clone();
            return;
        }

        for col in &other.columns {
            if self.column_index(col).is_none() {
                self.columns.push(col.clone());
                for row in &mut self.rows {
                    row.push(String::new());
                }
            }
        }

        // Map each incoming row into this table's column order.
        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| other.column_index(c))
            .collect();

        for other_row in &other.rows {
            let row = mapping
                .iter()
                .map(|m| match m {
                    Some(i) => other_row[*i].clone(),
                    None => String::new(),
                })
                .collect();
            self.rows.push(row);
        }
    }
}

// =============================================================================
// Sniff result
// =============================================================================

/// Location of a file's main tabular section, produced by the sniffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SniffResult {
    /// Index into the cleaned line list of the header row.
    pub header_index: usize,

    /// Winning delimiter, one of the fixed candidates.
    pub delimiter: char,
}

// =============================================================================
// Content class
// =============================================================================

/// What kind of data an extracted table holds.
///
/// Derived from the table's first data row, never stored persistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContentClass {
    /// Discrete error events: code, description, timestamp fields.
    ErrorListing,

    /// Fixed-interval numeric samples, including FILL/VENT channels.
    TimeSeries,

    /// Empty or unrecognisable content.
    Unknown,
}

impl ContentClass {
    pub fn label(&self) -> &'static str {
        match self {
            ContentClass::ErrorListing => "ECL",
            ContentClass::TimeSeries => "DMP",
            ContentClass::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ContentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Frequency summary
// =============================================================================

/// One aggregated error: how many times a description occurred across the
/// merged listing, plus the last-seen code for that description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorFrequencyEntry {
    /// Error code from the listing's code column, or the fixed placeholder
    /// when no code column exists.
    pub code: String,

    /// Normalised description (trimmed, upper-cased). Unique per entry.
    pub description: String,

    /// Occurrence count. Always at least 1.
    pub frequency: u64,
}

// =============================================================================
// Summary tables
// =============================================================================

/// One row of a configuration-defined pivot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: String,

    /// One value per table column; absent descriptions resolve to 0.
    pub values: Vec<u64>,
}

/// A dense, display-ready pivot built from a configuration template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

// =============================================================================
// FILL/VENT activity
// =============================================================================

/// One reconstructed pneumatic activity interval on a single channel.
/// Created once per detected FILL interval; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillVentEvent {
    /// Channel number, 1-based.
    pub channel: u8,

    /// Wall-clock time at the interval's first sample.
    pub start_time: f64,

    /// Wall-clock time at the interval's last sample.
    pub end_time: f64,

    /// Tick counter at the interval's first sample.
    pub mod_tick_start: i64,

    /// Tick counter at the interval's last sample.
    pub mod_tick_end: i64,

    /// Number of times the paired VENT channel switched on during the
    /// interval (including a switch-on at the interval's first sample).
    pub vent_transitions: u64,
}

/// Per-column activity total over the filtered time-series table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelActivity {
    /// Source column name (a FILL or VENT channel).
    pub column: String,

    /// Sum of the column's binary samples.
    pub total: f64,
}

// =============================================================================
// Discovered file / per-file outcome
// =============================================================================

/// Metadata about a file found during folder discovery, before reading.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file.
    pub path: PathBuf,

    /// File size in bytes.
    pub size: u64,

    /// Last modification timestamp.
    pub modified: Option<DateTime<Utc>>,

    /// Whether this file exceeds the large-file threshold (read via mmap).
    pub is_large: bool,
}

/// What happened to one discovered file during a run.
#[derive(Debug, Clone, Serialize)]
pub enum FileStatus {
    /// The file's table was extracted, classified, and merged.
    Merged { class: ContentClass, rows: usize },

    /// The file was skipped; the reason is carried for the run report.
    Skipped { reason: String },
}

/// Per-file record in the run report.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
}

// =============================================================================
// Folder analysis (pipeline output)
// =============================================================================

/// Complete result of analysing one folder of exports.
///
/// This is the only contract presentation layers may rely on. All recovered
/// failures are carried as `warnings` and per-file outcomes; a value of this
/// type means the run itself completed.
#[derive(Debug, Clone, Serialize)]
pub struct FolderAnalysis {
    /// The analysed folder.
    pub root: PathBuf,

    /// When the analysis was produced.
    pub generated_at: DateTime<Utc>,

    /// Merged error-listing rows from all ECL-classified files, in
    /// discovery order.
    pub ecl: CanonicalTable,

    /// Merged time-series rows from all DMP-classified files, in
    /// discovery order.
    pub dmp: CanonicalTable,

    /// The DMP table projected onto configured FILL/VENT columns with
    /// all-zero columns removed.
    pub dmp_filtered: CanonicalTable,

    /// Per-column sums over `dmp_filtered`.
    pub channel_activity: Vec<ChannelActivity>,

    /// Frequency summary, sorted longest description first, ties broken
    /// case-insensitively ascending.
    pub frequencies: Vec<ErrorFrequencyEntry>,

    /// Group name to member entries. Disjoint partitions; descriptions
    /// without a catalogue mapping land under the unclassified group.
    pub groups: BTreeMap<String, Vec<ErrorFrequencyEntry>>,

    /// Group name to the raw listing rows behind that group.
    pub group_details: BTreeMap<String, CanonicalTable>,

    /// Configuration-defined pivot tables, in template document order.
    pub summaries: Vec<SummaryTable>,

    /// Channel key ("FILL_1_VENT_1", ...) to ordered activity events.
    pub events: BTreeMap<String, Vec<FillVentEvent>>,

    /// Per-file outcomes in discovery order.
    pub outcomes: Vec<FileOutcome>,

    /// Non-fatal warnings accumulated during the run.
    pub warnings: Vec<String>,
}

impl FolderAnalysis {
    /// True when at least one file contributed error-listing rows.
    pub fn has_ecl_data(&self) -> bool {
        !self.ecl.is_empty()
    }

    /// True when at least one file contributed time-series rows.
    pub fn has_dmp_data(&self) -> bool {
        !self.dmp.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
