// wspscan - core/export.rs
//
// CSV and JSON export of analysis results.
// Core layer: writes to any Write trait object; file creation is the
// binary's job.

use crate::core::model::{CanonicalTable, ErrorFrequencyEntry, FillVentEvent, FolderAnalysis, SummaryTable};
use crate::util::error::ExportError;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Export a canonical table (merged ECL, merged DMP, filtered DMP, group
/// detail) to CSV. Returns the number of data rows written.
pub fn export_table_csv<W: Write>(
    table: &CanonicalTable,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(&table.columns)
        .map_err(|e| csv_error(export_path, e))?;

    for row in &table.rows {
        csv_writer
            .write_record(row)
            .map_err(|e| csv_error(export_path, e))?;
    }

    flush(csv_writer, export_path)?;
    Ok(table.rows.len())
}

/// Export the frequency summary to CSV, preserving its sort order.
pub fn export_frequency_csv<W: Write>(
    entries: &[ErrorFrequencyEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["code", "description", "frequency"])
        .map_err(|e| csv_error(export_path, e))?;

    for entry in entries {
        csv_writer
            .write_record([
                entry.code.as_str(),
                entry.description.as_str(),
                &entry.frequency.to_string(),
            ])
            .map_err(|e| csv_error(export_path, e))?;
    }

    flush(csv_writer, export_path)?;
    Ok(entries.len())
}

/// Export fill/vent events to CSV, one row per event, flattened across all
/// channel pairs in key order.
pub fn export_events_csv<W: Write>(
    events: &BTreeMap<String, Vec<FillVentEvent>>,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "channel_pair",
            "channel",
            "start_time",
            "end_time",
            "mod_tick_start",
            "mod_tick_end",
            "vent_transitions",
        ])
        .map_err(|e| csv_error(export_path, e))?;

    let mut count = 0;
    for (key, channel_events) in events {
        for event in channel_events {
            csv_writer
                .write_record([
                    key.as_str(),
                    &event.channel.to_string(),
                    &event.start_time.to_string(),
                    &event.end_time.to_string(),
                    &event.mod_tick_start.to_string(),
                    &event.mod_tick_end.to_string(),
                    &event.vent_transitions.to_string(),
                ])
                .map_err(|e| csv_error(export_path, e))?;
            count += 1;
        }
    }

    flush(csv_writer, export_path)?;
    Ok(count)
}

/// Export one summary table to CSV. The first column holds row labels
/// under an empty corner cell, pivot style.
pub fn export_summary_csv<W: Write>(
    table: &SummaryTable,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![String::new()];
    header.extend(table.columns.iter().cloned());
    csv_writer
        .write_record(&header)
        .map_err(|e| csv_error(export_path, e))?;

    for row in &table.rows {
        let mut record = vec![row.label.clone()];
        record.extend(row.values.iter().map(u64::to_string));
        csv_writer
            .write_record(&record)
            .map_err(|e| csv_error(export_path, e))?;
    }

    flush(csv_writer, export_path)?;
    Ok(table.rows.len())
}

/// Export the full analysis as pretty-printed JSON.
pub fn export_analysis_json<W: Write>(
    analysis: &FolderAnalysis,
    writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, analysis).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })
}

fn csv_error(path: &Path, source: csv::Error) -> ExportError {
    ExportError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn flush<W: Write>(mut writer: csv::Writer<W>, path: &Path) -> Result<(), ExportError> {
    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
