// wspscan - core/summary.rs
//
// Configurable summary tables: cross-tabulations of error frequencies laid
// out by templates from the configuration file.

use crate::core::config::SummaryTemplate;
use crate::core::frequency::normalize_description;
use crate::core::model::{ErrorFrequencyEntry, SummaryRow, SummaryTable};
use std::collections::HashMap;

/// Build one summary table per template.
///
/// Each template cell names an error description; the cell value is that
/// description's frequency, or zero when it never occurred. Rows shorter
/// than the column set are padded with zeros, longer ones truncated.
pub fn build_tables(
    frequencies: &[ErrorFrequencyEntry],
    templates: &[SummaryTemplate],
) -> Vec<SummaryTable> {
    let lookup: HashMap<String, u64> = frequencies
        .iter()
        .map(|e| (normalize_description(&e.description), e.frequency))
        .collect();

    templates
        .iter()
        .map(|template| {
            let width = template.columns.len();
            let rows = template
                .rows
                .iter()
                .map(|(label, descriptions)| {
                    if descriptions.len() > width {
                        tracing::warn!(
                            table = %template.name,
                            row = %label,
                            cells = descriptions.len(),
                            columns = width,
                            "Summary row wider than column set, truncating"
                        );
                    }

                    let mut values: Vec<u64> = descriptions
                        .iter()
                        .take(width)
                        .map(|d| {
                            lookup
                                .get(&normalize_description(d))
                                .copied()
                                .unwrap_or(0)
                        })
                        .collect();
                    values.resize(width, 0);

                    SummaryRow {
                        label: label.clone(),
                        values,
                    }
                })
                .collect();

            SummaryTable {
                name: template.name.clone(),
                columns: template.columns.clone(),
                rows,
            }
        })
        .collect()
}
