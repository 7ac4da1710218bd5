// wspscan - core/classify.rs
//
// Content classification of extracted tables. Core layer: pure logic.
//
// Units export two table shapes: error code listings (ECL) whose rows
// carry free-text status and description fields, and time-series dumps
// (DMP) whose rows are numeric samples only. The first data row is enough
// to tell them apart.

use crate::core::model::{CanonicalTable, ContentClass};

/// Classify an extracted table by inspecting its first data row.
///
/// Every cell numeric means a time-series dump; any non-numeric cell means
/// an error listing. An empty table classifies as `Unknown`.
///
/// Known failure mode, accepted: a listing whose first row happens to be
/// fully numeric is misclassified as time-series data.
pub fn classify(table: &CanonicalTable) -> ContentClass {
    if table.is_empty() || table.column_count() == 0 {
        return ContentClass::Unknown;
    }

    let first_row_numeric = table.rows[0]
        .iter()
        .all(|cell| cell.trim().parse::<f64>().is_ok());

    let class = if first_row_numeric {
        ContentClass::TimeSeries
    } else {
        ContentClass::ErrorListing
    };

    tracing::debug!(class = %class, columns = table.column_count(), "Table classified");
    class
}
