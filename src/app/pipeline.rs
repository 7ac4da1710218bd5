// wspscan - app/pipeline.rs
//
// The folder analysis pipeline: discover export files, extract and
// classify each one, merge per content class, then aggregate. App layer:
// owns all file-content I/O; the core modules stay pure.

use crate::core::classify;
use crate::core::config::AnalysisConfig;
use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::events;
use crate::core::frequency;
use crate::core::grouping::{self, GroupCatalog};
use crate::core::model::{
    CanonicalTable, ContentClass, DiscoveredFile, FileOutcome, FileStatus, FolderAnalysis,
};
use crate::core::sniff;
use crate::core::summary;
use crate::util::constants;
use crate::util::error::{FileError, Result, WspScanError};
use chrono::Utc;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::time::Duration;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

/// Options controlling one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Extract files in parallel. The merge stays sequential in discovery
    /// order, so output is identical to the sequential path.
    pub parallel: bool,

    /// Discovery limits and glob patterns.
    pub discovery: DiscoveryConfig,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Analyse one folder of WSP exports.
///
/// Fatal errors are limited to folder access; everything after discovery
/// is recovered at the smallest scope (per file, per channel, per
/// aggregation) and carried in the result's warnings and outcomes.
pub fn run(
    root: &Path,
    config: &AnalysisConfig,
    options: &PipelineOptions,
) -> Result<FolderAnalysis> {
    let run_start = std::time::Instant::now();

    let (files, mut warnings) = discovery::discover_files(root, &options.discovery)?;

    tracing::info!(
        root = %root.display(),
        files = files.len(),
        parallel = options.parallel,
        "Analysis starting"
    );

    // Per-file extraction, optionally in parallel. Collection preserves
    // input order either way, so the merge below sees discovery order.
    let extractions: Vec<Result<(ContentClass, CanonicalTable)>> = if options.parallel {
        files.par_iter().map(extract_file).collect()
    } else {
        files.iter().map(extract_file).collect()
    };

    // Sequential merge per content class.
    let mut ecl = CanonicalTable::default();
    let mut dmp = CanonicalTable::default();
    let mut outcomes = Vec::with_capacity(files.len());

    for (file, extraction) in files.iter().zip(extractions) {
        match extraction {
            Ok((class @ ContentClass::ErrorListing, table))
            | Ok((class @ ContentClass::TimeSeries, table)) => {
                let rows = table.row_count();
                let target = match class {
                    ContentClass::ErrorListing => &mut ecl,
                    _ => &mut dmp,
                };
                target.append(&table);

                tracing::debug!(
                    file = %file.path.display(),
                    class = %class,
                    rows,
                    "File merged"
                );
                outcomes.push(FileOutcome {
                    path: file.path.clone(),
                    status: FileStatus::Merged { class, rows },
                });
            }
            Ok((ContentClass::Unknown, _)) => {
                skip_file(
                    file,
                    "table header found but no data rows".to_string(),
                    &mut outcomes,
                    &mut warnings,
                );
            }
            Err(e) => {
                skip_file(file, skip_reason(&e), &mut outcomes, &mut warnings);
            }
        }
    }

    // Aggregates over the merged error listing.
    let mut frequencies = Vec::new();
    let mut groups = BTreeMap::new();
    let mut group_details = BTreeMap::new();
    let mut summaries = Vec::new();

    if !ecl.is_empty() {
        let catalog = if config.error_log_tab.is_empty() {
            GroupCatalog::builtin()
        } else {
            GroupCatalog::from_config(&config.error_log_tab)
        };

        match frequency::summarize(&ecl, &config.error_description) {
            Ok(entries) => {
                frequencies = entries;
                groups = grouping::group(&frequencies, &catalog);
                match grouping::detail_tables(&ecl, &config.error_description, &catalog) {
                    Ok(details) => group_details = details,
                    Err(e) => warnings.push(format!("Group detail tables unavailable: {e}")),
                }
                summaries = summary::build_tables(&frequencies, &config.summary_tab);
            }
            Err(e) => {
                let msg = format!("Frequency summary unavailable: {e}");
                tracing::warn!("{}", msg);
                warnings.push(msg);
            }
        }
    }

    // Aggregates over the merged dump log.
    let mut events_by_channel = BTreeMap::new();
    let mut dmp_filtered = CanonicalTable::default();
    let mut channel_activity = Vec::new();

    if !dmp.is_empty() {
        let (specs, spec_warnings) = config.channel_specs();
        warnings.extend(spec_warnings);

        for spec in &specs {
            match events::extract_events(&dmp, spec) {
                Ok(channel_events) => {
                    events_by_channel.insert(spec.event_key(), channel_events);
                }
                Err(e) => {
                    let msg = format!("Channel {}: {e}, channel skipped", spec.channel);
                    tracing::warn!("{}", msg);
                    warnings.push(msg);
                }
            }
        }

        let (filtered, filter_warnings) = events::filter_channels(&dmp, &specs);
        warnings.extend(filter_warnings);
        channel_activity = events::channel_activity(&filtered);
        dmp_filtered = filtered;
    }

    if warnings.len() > constants::MAX_WARNINGS {
        let dropped = warnings.len() - constants::MAX_WARNINGS;
        warnings.truncate(constants::MAX_WARNINGS);
        warnings.push(format!("{dropped} further warnings were dropped"));
        tracing::warn!(dropped, "Warning list truncated");
    }

    let analysis = FolderAnalysis {
        root: root.to_path_buf(),
        generated_at: Utc::now(),
        ecl,
        dmp,
        dmp_filtered,
        channel_activity,
        frequencies,
        groups,
        group_details,
        summaries,
        events: events_by_channel,
        outcomes,
        warnings,
    };

    tracing::info!(
        ecl_rows = analysis.ecl.row_count(),
        dmp_rows = analysis.dmp.row_count(),
        event_channels = analysis.events.len(),
        warnings = analysis.warnings.len(),
        elapsed_ms = run_start.elapsed().as_millis() as u64,
        "Analysis complete"
    );

    Ok(analysis)
}

/// Read, clean, sniff, extract, and classify one export file.
fn extract_file(file: &DiscoveredFile) -> Result<(ContentClass, CanonicalTable)> {
    let content = read_file_content(&file.path, file.is_large)?;
    let lines = sniff::clean_lines(&content);
    let sniffed = sniff::sniff(&lines)?;
    let table = sniff::extract_section(&lines, &sniffed);
    Ok((classify::classify(&table), table))
}

fn skip_file(
    file: &DiscoveredFile,
    reason: String,
    outcomes: &mut Vec<FileOutcome>,
    warnings: &mut Vec<String>,
) {
    let msg = format!("'{}': {reason}, file skipped", file.path.display());
    tracing::warn!("{}", msg);
    warnings.push(msg);
    outcomes.push(FileOutcome {
        path: file.path.clone(),
        status: FileStatus::Skipped { reason },
    });
}

/// Short, path-free reason for the per-file outcome record. The path is
/// carried separately by `FileOutcome`.
fn skip_reason(e: &WspScanError) -> String {
    match e {
        WspScanError::File(FileError::Io { source, .. }) => format!("cannot read file: {source}"),
        WspScanError::File(FileError::InvalidEncoding { source, .. }) => {
            format!("invalid UTF-8 encoding: {source}")
        }
        WspScanError::Extract(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// File reading helpers
// =============================================================================

/// Read the full content of an export file as a UTF-8 string.
///
/// Large files are memory-mapped via `memmap2` to avoid copying the whole
/// file into a heap buffer. Small files use `fs::read_to_string` with
/// retries for transient I/O errors; permanent errors are returned
/// immediately.
fn read_file_content(path: &Path, is_large: bool) -> std::result::Result<String, FileError> {
    if is_large {
        read_large_file(path)
    } else {
        read_small_file_with_retry(path)
    }
}

fn read_large_file(path: &Path) -> std::result::Result<String, FileError> {
    let file = std::fs::File::open(path).map_err(|source| FileError::Io {
        file: path.to_path_buf(),
        source,
    })?;

    // SAFETY: the file is mapped read-only and we do not mutate the map.
    // We accept the documented risk that external modification of the file
    // during the map's lifetime could produce undefined behaviour, which is
    // acceptable for a batch tool reading already-written exports.
    let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|source| FileError::Io {
        file: path.to_path_buf(),
        source,
    })?;

    std::str::from_utf8(&mmap)
        .map(|s| s.to_string())
        .map_err(|source| FileError::InvalidEncoding {
            file: path.to_path_buf(),
            source,
        })
}

fn read_small_file_with_retry(path: &Path) -> std::result::Result<String, FileError> {
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..MAX_RETRIES {
        match std::fs::read_to_string(path) {
            Ok(content) => return Ok(content),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(RETRY_DELAYS_MS[attempt as usize]));
                last_err = Some(e);
            }
            Err(e) => {
                return Err(FileError::Io {
                    file: path.to_path_buf(),
                    source: e,
                })
            }
        }
    }

    Err(FileError::Io {
        file: path.to_path_buf(),
        source: last_err.unwrap_or_else(|| io::Error::other("Unknown read error")),
    })
}

/// Returns true for transient I/O errors that are worth retrying.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

// =============================================================================
// Tests
// =============================================================================
