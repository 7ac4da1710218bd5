// wspscan - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Logging initialisation (debug mode support)
// 3. Configuration resolution (explicit path > platform config > built-ins)
// 4. Pipeline run, report printing, optional exports

use clap::Parser;
use std::path::{Path, PathBuf};
use wspscan::app::{pipeline, report};
use wspscan::core::config::AnalysisConfig;
use wspscan::core::export;
use wspscan::core::model::FolderAnalysis;
use wspscan::util;
use wspscan::util::error::{ExportError, Result, WspScanError};

/// wspscan - WSP export folder analyser.
///
/// Point wspscan at a folder of unit exports to merge error listings and
/// dump logs, summarise error frequencies, and extract fill/vent activity.
#[derive(Parser, Debug)]
#[command(name = "wspscan", version, about)]
struct Cli {
    /// Folder containing the exported CSV files.
    path: PathBuf,

    /// Analysis configuration file (JSON). Overrides the platform config.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Write CSV/JSON exports into this directory.
    #[arg(long = "export-dir")]
    export_dir: Option<PathBuf>,

    /// Extract files in parallel.
    #[arg(long = "parallel")]
    parallel: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    util::logging::init(cli.debug);

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "wspscan starting"
    );

    // An explicit config path is authoritative, so a broken one is fatal.
    // The platform config falls back to built-ins with a warning instead.
    let config = match &cli.config {
        Some(path) => match AnalysisConfig::from_path(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => {
            let (config, warnings) = AnalysisConfig::load_default();
            for warning in &warnings {
                eprintln!("Warning: {warning}");
            }
            config
        }
    };

    let options = pipeline::PipelineOptions {
        parallel: cli.parallel,
        ..Default::default()
    };

    let analysis = match pipeline::run(&cli.path, &config, &options) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, "Analysis failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("{}", report::render(&analysis));

    if let Some(dir) = &cli.export_dir {
        match write_exports(&analysis, dir) {
            Ok(count) => {
                tracing::info!(dir = %dir.display(), files = count, "Exports written");
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}

/// Write the export set into `dir`, creating it if needed. Returns the
/// number of files written. Empty datasets are left out; the JSON export
/// always carries the complete analysis.
fn write_exports(analysis: &FolderAnalysis, dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(dir).map_err(|source| WspScanError::Io {
        path: dir.to_path_buf(),
        operation: "create export directory",
        source,
    })?;

    let mut count = 0;

    if analysis.has_ecl_data() {
        let path = dir.join("merged_ecl.csv");
        export::export_table_csv(&analysis.ecl, create_file(&path)?, &path)?;
        count += 1;
    }

    if analysis.has_dmp_data() {
        let path = dir.join("merged_dmp.csv");
        export::export_table_csv(&analysis.dmp, create_file(&path)?, &path)?;
        count += 1;
    }

    if !analysis.dmp_filtered.columns.is_empty() {
        let path = dir.join("dmp_filtered.csv");
        export::export_table_csv(&analysis.dmp_filtered, create_file(&path)?, &path)?;
        count += 1;
    }

    if !analysis.frequencies.is_empty() {
        let path = dir.join("error_frequency.csv");
        export::export_frequency_csv(&analysis.frequencies, create_file(&path)?, &path)?;
        count += 1;
    }

    if !analysis.events.is_empty() {
        let path = dir.join("fill_vent_events.csv");
        export::export_events_csv(&analysis.events, create_file(&path)?, &path)?;
        count += 1;
    }

    for table in &analysis.summaries {
        let path = dir.join(format!("summary_{}.csv", sanitize_name(&table.name)));
        export::export_summary_csv(table, create_file(&path)?, &path)?;
        count += 1;
    }

    let path = dir.join("analysis.json");
    export::export_analysis_json(analysis, create_file(&path)?, &path)?;
    count += 1;

    Ok(count)
}

fn create_file(path: &Path) -> Result<std::fs::File> {
    std::fs::File::create(path).map_err(|source| {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// Turn a summary-table name into a safe file-name fragment.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
