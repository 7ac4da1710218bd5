// wspscan - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all wspscan operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum WspScanError {
    /// Folder validation or traversal failed.
    Folder(FolderError),

    /// A single export file could not be read.
    File(FileError),

    /// No delimited section could be located in a file.
    Extract(ExtractError),

    /// A required column was missing or unparseable.
    Column(ColumnError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Export operation failed.
    Export(ExportError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for WspScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder(e) => write!(f, "Folder error: {e}"),
            Self::File(e) => write!(f, "File error: {e}"),
            Self::Extract(e) => write!(f, "Extraction error: {e}"),
            Self::Column(e) => write!(f, "Column error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for WspScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Folder(e) => Some(e),
            Self::File(e) => Some(e),
            Self::Extract(e) => Some(e),
            Self::Column(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Folder errors
// ---------------------------------------------------------------------------

/// Errors related to validating and walking the input folder.
/// These are the only errors that abort a whole run.
#[derive(Debug)]
pub enum FolderError {
    /// The root path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the root path.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// Walkdir traversal error (wraps individual file/dir access failures).
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl fmt::Display for FolderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Input folder '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Input path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FolderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FolderError> for WspScanError {
    fn from(e: FolderError) -> Self {
        Self::Folder(e)
    }
}

// ---------------------------------------------------------------------------
// File errors
// ---------------------------------------------------------------------------

/// Per-file read failures. Non-fatal: the file is skipped and the run
/// continues with the remaining files.
#[derive(Debug)]
pub enum FileError {
    /// I/O error while reading an export file.
    Io { file: PathBuf, source: io::Error },

    /// File content is not valid UTF-8.
    InvalidEncoding {
        file: PathBuf,
        source: std::str::Utf8Error,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { file, source } => {
                write!(f, "'{}': I/O error: {source}", file.display())
            }
            Self::InvalidEncoding { file, source } => {
                write!(f, "'{}': invalid UTF-8 encoding: {source}", file.display())
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidEncoding { source, .. } => Some(source),
        }
    }
}

impl From<FileError> for WspScanError {
    fn from(e: FileError) -> Self {
        Self::File(e)
    }
}

// ---------------------------------------------------------------------------
// Extraction errors
// ---------------------------------------------------------------------------

/// Errors from the section sniffer. Non-fatal: the file contributes no
/// table and the run continues.
#[derive(Debug)]
pub enum ExtractError {
    /// No line qualified as a table header for any delimiter candidate.
    NoStructuredSection { lines_scanned: usize },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStructuredSection { lines_scanned } => write!(
                f,
                "no delimited section found in {lines_scanned} lines"
            ),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<ExtractError> for WspScanError {
    fn from(e: ExtractError) -> Self {
        Self::Extract(e)
    }
}

// ---------------------------------------------------------------------------
// Column errors
// ---------------------------------------------------------------------------

/// A required column is absent or holds unparseable values. Recovered at
/// the smallest scope: the affected channel or aggregation is skipped,
/// never the whole file.
#[derive(Debug)]
pub enum ColumnError {
    /// A named column is not present in the table.
    Missing {
        column: String,
        context: &'static str,
    },

    /// A cell expected to be numeric could not be parsed.
    NumericParse {
        column: String,
        row: usize,
        value: String,
    },
}

impl fmt::Display for ColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { column, context } => {
                write!(f, "column '{column}' required for {context} is missing")
            }
            Self::NumericParse { column, row, value } => {
                write!(
                    f,
                    "column '{column}' row {row}: cannot parse '{value}' as a number"
                )
            }
        }
    }
}

impl std::error::Error for ColumnError {}

impl From<ColumnError> for WspScanError {
    fn from(e: ColumnError) -> Self {
        Self::Column(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// JSON parsing failed.
    JsonParse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },

    /// A config section has the wrong shape.
    InvalidSection {
        section: &'static str,
        reason: String,
    },

    /// I/O error reading a config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonParse { path, source } => match path {
                Some(p) => write!(f, "Config parse error '{}': {source}", p.display()),
                None => write!(f, "Config parse error: {source}"),
            },
            Self::InvalidSection { section, reason } => {
                write!(f, "Config section '{section}': {reason}")
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::JsonParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for WspScanError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for WspScanError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for wspscan results.
pub type Result<T> = std::result::Result<T, WspScanError>;
