// wspscan - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "wspscan";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "wspscan";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Section sniffing
// =============================================================================

/// Delimiter candidates in priority order. Semicolon wins over comma when
/// both produce a qualifying header line, because the exports this tool
/// targets are semicolon-delimited and frequently contain commas inside
/// free-text description cells.
pub const DELIMITER_CANDIDATES: &[char] = &[';', ','];

/// A line qualifies as a table header only when its delimiter count exceeds
/// this value. Preamble prose rarely contains more than two stray delimiters,
/// while a real header row always does.
pub const HEADER_MIN_DELIMITERS: usize = 2;

/// Characters stripped from both ends of every raw line before sniffing.
/// Export tools pad rows with trailing separators; those must not count as
/// extra columns.
pub const LINE_TRIM_SET: &[char] = &[' ', ';', ','];

// =============================================================================
// Column-name conventions
// =============================================================================

/// Wall-clock time column in time-series dumps.
pub const TIME_COLUMN: &str = "MONTIME";

/// Monotonic sample-counter column in time-series dumps.
pub const TICK_COLUMN: &str = "MOD_TICK";

/// Case-insensitive substring identifying the error-code column of a listing.
pub const CODE_COLUMN_MARKER: &str = "code";

/// Placeholder code used when a listing has no recognisable code column.
pub const FALLBACK_ERROR_CODE: &str = "XXXX";

/// Column holding error descriptions when the configuration does not name one.
pub const DEFAULT_DESCRIPTION_COLUMN: &str = "Description";

// =============================================================================
// Grouping
// =============================================================================

/// Catch-all group for descriptions with no catalogue mapping.
pub const UNCLASSIFIED_GROUP: &str = "Unclassified";

/// Descriptions containing this substring (case-insensitive) are transient
/// "condition cleared" records and are excluded from grouping.
pub const EXCLUDED_DESCRIPTION_MARKER: &str = "GONE";

// =============================================================================
// Channels
// =============================================================================

/// Number of FILL/VENT channel pairs a unit exports.
pub const CHANNEL_COUNT: u8 = 4;

/// Key prefix for fill columns in the FILL_VENT_PAIRS config section.
pub const FILL_KEY_PREFIX: &str = "FILL_";

/// Key prefix for vent columns in the FILL_VENT_PAIRS config section.
pub const VENT_KEY_PREFIX: &str = "VENT_";

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth during discovery. Exports are written
/// flat into one folder, so subdirectories are not descended by default.
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// Maximum number of files to analyse in a single run.
pub const DEFAULT_MAX_FILES: usize = 500;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 10_000;

/// Hard upper bound on max depth (prevents infinite traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Default include glob patterns for export discovery.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.csv"];

/// Default exclude glob patterns for export discovery.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.bak", "*.tmp"];

/// File size threshold in bytes above which files are memory-mapped
/// instead of read into a heap buffer.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100 MB

// =============================================================================
// Pipeline limits
// =============================================================================

/// Maximum number of non-fatal warnings accumulated across a single run.
/// Prevents the warnings Vec from growing without bound when a folder
/// contains many unreadable or structureless files.
pub const MAX_WARNINGS: usize = 1_000;

// =============================================================================
// Reporting
// =============================================================================

/// Width of banner and rule lines in the plain-text run report.
pub const REPORT_WIDTH: usize = 64;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a raw line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Analysis configuration file name, looked up in the platform config
/// directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Config section naming the error-description column.
pub const ERROR_DESCRIPTION_KEY: &str = "ERROR_DESCRIPTION";

/// Config section mapping logical channel keys to dump-log column names.
pub const FILL_VENT_PAIRS_KEY: &str = "FILL_VENT_PAIRS";

/// Config section defining the error-group catalogue.
pub const ERROR_LOG_TAB_KEY: &str = "ERROR_LOG_TAB";

/// Config section defining summary-table templates.
pub const SUMMARY_TAB_KEY: &str = "SUMMARY_TAB";

/// Key naming the column list inside a summary-table template.
pub const SUMMARY_COLUMNS_KEY: &str = "COLUMNS";
