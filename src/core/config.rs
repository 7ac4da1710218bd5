// wspscan - core/config.rs
//
// Analysis configuration: the JSON document that names the description
// column, maps channel keys to dump-log columns, and defines the error
// catalogue and summary-table templates.
//
// The document can arrive as a file path, a JSON string, or an in-memory
// value. Missing sections fall back to built-in defaults; a present
// section with the wrong shape is an error. Section order inside the
// document is preserved (serde_json's `preserve_order` feature), so group
// and template order follow the document.

use crate::core::events::ChannelSpec;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Layout of one configurable summary table.
#[derive(Debug, Clone)]
pub struct SummaryTemplate {
    pub name: String,
    pub columns: Vec<String>,

    /// Row label and the per-column error descriptions, in document order.
    pub rows: Vec<(String, Vec<String>)>,
}

/// Validated analysis configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Name of the description column in error listings.
    pub error_description: String,

    /// Logical channel key (`FILL_n` / `VENT_n`) to dump-log column name.
    pub fill_vent_pairs: BTreeMap<String, String>,

    /// Error-group catalogue entries (group name, member descriptions),
    /// in document order. Empty means: use the built-in catalogue.
    pub error_log_tab: Vec<(String, Vec<String>)>,

    /// Summary-table templates in document order.
    pub summary_tab: Vec<SummaryTemplate>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let mut fill_vent_pairs = BTreeMap::new();
        for channel in 1..=constants::CHANNEL_COUNT {
            let fill = format!("{}{channel}", constants::FILL_KEY_PREFIX);
            let vent = format!("{}{channel}", constants::VENT_KEY_PREFIX);
            fill_vent_pairs.insert(fill.clone(), fill);
            fill_vent_pairs.insert(vent.clone(), vent);
        }

        Self {
            error_description: constants::DEFAULT_DESCRIPTION_COLUMN.to_string(),
            fill_vent_pairs,
            error_log_tab: Vec::new(),
            summary_tab: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    /// Build a configuration from an already-parsed JSON document.
    ///
    /// Absent sections keep their defaults; present sections replace the
    /// default wholesale, and a malformed section is an error rather than
    /// a silent fallback.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let root = value.as_object().ok_or_else(|| ConfigError::InvalidSection {
            section: "document",
            reason: "expected a JSON object at the top level".to_string(),
        })?;

        let mut config = Self::default();

        if let Some(v) = root.get(constants::ERROR_DESCRIPTION_KEY) {
            config.error_description = v
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(constants::ERROR_DESCRIPTION_KEY, "expected a string"))?;
        }

        if let Some(v) = root.get(constants::FILL_VENT_PAIRS_KEY) {
            config.fill_vent_pairs = parse_string_map(constants::FILL_VENT_PAIRS_KEY, v)?;
        }

        if let Some(v) = root.get(constants::ERROR_LOG_TAB_KEY) {
            config.error_log_tab = parse_group_map(constants::ERROR_LOG_TAB_KEY, v)?;
        }

        if let Some(v) = root.get(constants::SUMMARY_TAB_KEY) {
            config.summary_tab = parse_summary_tab(v)?;
        }

        Ok(config)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|source| ConfigError::JsonParse { path: None, source })?;
        Self::from_value(&value)
    }

    /// Load a configuration from an explicit file path.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|source| ConfigError::JsonParse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        Self::from_value(&value)
    }

    /// Load `config.json` from the platform config directory.
    ///
    /// A missing file is the normal first-run case and yields defaults
    /// silently; an unreadable or unparseable file yields defaults plus a
    /// warning. Only an explicit `--config` path is allowed to be fatal,
    /// and that decision belongs to the caller via [`Self::from_path`].
    pub fn load_default() -> (Self, Vec<String>) {
        let mut warnings = Vec::new();

        let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) else {
            tracing::warn!("Could not determine platform directories, using built-in configuration");
            return (Self::default(), warnings);
        };

        let config_path = proj_dirs.config_dir().join(constants::CONFIG_FILE_NAME);
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config.json found; using built-in configuration");
            return (Self::default(), warnings);
        }

        match Self::from_path(&config_path) {
            Ok(config) => {
                tracing::info!(path = %config_path.display(), "Loaded config.json");
                (config, warnings)
            }
            Err(e) => {
                let msg = format!(
                    "Could not load config file '{}': {e}. Using built-in configuration.",
                    config_path.display()
                );
                tracing::warn!("{}", msg);
                warnings.push(msg);
                (Self::default(), warnings)
            }
        }
    }

    /// Derive per-channel column bindings from the FILL_VENT_PAIRS section.
    ///
    /// Every `FILL_<n>` key with a matching `VENT_<n>` key yields one
    /// channel spec; a fill key without its vent partner is skipped with a
    /// warning. Specs come back ordered by channel number.
    pub fn channel_specs(&self) -> (Vec<ChannelSpec>, Vec<String>) {
        let mut warnings = Vec::new();

        let mut fills: Vec<(u8, &str)> = self
            .fill_vent_pairs
            .iter()
            .filter_map(|(key, column)| {
                fill_channel_number(key).map(|ch| (ch, column.as_str()))
            })
            .collect();
        fills.sort_by_key(|(channel, _)| *channel);

        let mut specs = Vec::new();
        for (channel, fill_column) in fills {
            let vent_key = format!("{}{channel}", constants::VENT_KEY_PREFIX);
            match self.fill_vent_pairs.get(&vent_key) {
                Some(vent_column) => {
                    specs.push(ChannelSpec::new(channel, fill_column, vent_column));
                }
                None => {
                    let msg = format!(
                        "Channel {channel}: no '{vent_key}' entry paired with \
                         '{}{channel}', channel skipped",
                        constants::FILL_KEY_PREFIX
                    );
                    tracing::warn!("{}", msg);
                    warnings.push(msg);
                }
            }
        }

        (specs, warnings)
    }
}

/// Channel number of a `FILL_<n>` key, if the key has exactly that shape.
fn fill_channel_number(key: &str) -> Option<u8> {
    key.strip_prefix(constants::FILL_KEY_PREFIX)?.parse().ok()
}

fn invalid(section: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidSection {
        section,
        reason: reason.into(),
    }
}

fn parse_string_map(
    section: &'static str,
    value: &Value,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid(section, "expected an object"))?;

    let mut map = BTreeMap::new();
    for (key, v) in obj {
        let s = v
            .as_str()
            .ok_or_else(|| invalid(section, format!("key '{key}': expected a string value")))?;
        map.insert(key.clone(), s.to_string());
    }
    Ok(map)
}

fn string_list(section: &'static str, key: &str, value: &Value) -> Result<Vec<String>, ConfigError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid(section, format!("key '{key}': expected a list")))?;

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                invalid(section, format!("key '{key}': expected a list of strings"))
            })
        })
        .collect()
}

fn parse_group_map(
    section: &'static str,
    value: &Value,
) -> Result<Vec<(String, Vec<String>)>, ConfigError> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid(section, "expected an object"))?;

    obj.iter()
        .map(|(name, members)| Ok((name.clone(), string_list(section, name, members)?)))
        .collect()
}

fn parse_summary_tab(value: &Value) -> Result<Vec<SummaryTemplate>, ConfigError> {
    const SECTION: &str = constants::SUMMARY_TAB_KEY;

    let obj = value
        .as_object()
        .ok_or_else(|| invalid(SECTION, "expected an object"))?;

    let mut templates = Vec::new();
    for (name, body) in obj {
        let table = body
            .as_object()
            .ok_or_else(|| invalid(SECTION, format!("table '{name}': expected an object")))?;

        let columns = match table.get(constants::SUMMARY_COLUMNS_KEY) {
            Some(v) => string_list(SECTION, name, v)?,
            None => {
                return Err(invalid(
                    SECTION,
                    format!(
                        "table '{name}': missing '{}' list",
                        constants::SUMMARY_COLUMNS_KEY
                    ),
                ))
            }
        };

        let rows = table
            .iter()
            .filter(|(key, _)| key.as_str() != constants::SUMMARY_COLUMNS_KEY)
            .map(|(label, cells)| Ok((label.clone(), string_list(SECTION, label, cells)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        templates.push(SummaryTemplate {
            name: name.clone(),
            columns,
            rows,
        });
    }

    Ok(templates)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"{
        "ERROR_DESCRIPTION": "Fault text",
        "FILL_VENT_PAIRS": {
            "FILL_1": "CH1_FILL",
            "VENT_1": "CH1_VENT",
            "FILL_2": "CH2_FILL",
            "VENT_2": "CH2_VENT"
        },
        "ERROR_LOG_TAB": {
            "Zebra Faults": ["Z_ERR"],
            "Alpha Faults": ["A_ERR", "A_ERR_2"]
        },
        "SUMMARY_TAB": {
            "Sensor Faults": {
                "COLUMNS": ["Ch1", "Ch2"],
                "Speed sensor": ["E_SENS_FR1", "E_SENS_FR2"]
            }
        }
    }"#;

    #[test]
    fn test_full_document_parses() {
        let config = AnalysisConfig::from_json_str(FULL_CONFIG).unwrap();

        assert_eq!(config.error_description, "Fault text");
        assert_eq!(config.fill_vent_pairs.len(), 4);
        assert_eq!(config.fill_vent_pairs["FILL_2"], "CH2_FILL");

        assert_eq!(config.error_log_tab.len(), 2);
        assert_eq!(config.summary_tab.len(), 1);
        assert_eq!(config.summary_tab[0].name, "Sensor Faults");
        assert_eq!(config.summary_tab[0].columns, vec!["Ch1", "Ch2"]);
        assert_eq!(config.summary_tab[0].rows.len(), 1);
        assert_eq!(config.summary_tab[0].rows[0].0, "Speed sensor");
    }

    #[test]
    fn test_group_order_follows_document() {
        let config = AnalysisConfig::from_json_str(FULL_CONFIG).unwrap();
        assert_eq!(config.error_log_tab[0].0, "Zebra Faults");
        assert_eq!(config.error_log_tab[1].0, "Alpha Faults");
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = AnalysisConfig::from_json_str("{}").unwrap();
        assert_eq!(
            config.error_description,
            constants::DEFAULT_DESCRIPTION_COLUMN
        );
        assert_eq!(config.fill_vent_pairs.len(), 8);
        assert_eq!(config.fill_vent_pairs["FILL_3"], "FILL_3");
        assert!(config.error_log_tab.is_empty());
        assert!(config.summary_tab.is_empty());
    }

    #[test]
    fn test_default_channel_specs() {
        let (specs, warnings) = AnalysisConfig::default().channel_specs();
        assert!(warnings.is_empty());
        assert_eq!(specs.len(), usize::from(constants::CHANNEL_COUNT));
        assert_eq!(specs[0].channel, 1);
        assert_eq!(specs[3].channel, 4);
        assert_eq!(specs[0].event_key(), "FILL_1_VENT_1");
    }

    #[test]
    fn test_channel_specs_use_mapped_columns() {
        let config = AnalysisConfig::from_json_str(FULL_CONFIG).unwrap();
        let (specs, warnings) = config.channel_specs();
        assert!(warnings.is_empty());
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].fill_column, "CH1_FILL");
        assert_eq!(specs[1].vent_column, "CH2_VENT");
    }

    #[test]
    fn test_unpaired_fill_key_warns_and_skips() {
        let config = AnalysisConfig::from_json_str(
            r#"{"FILL_VENT_PAIRS": {"FILL_1": "FILL_1", "VENT_1": "VENT_1", "FILL_2": "FILL_2"}}"#,
        )
        .unwrap();
        let (specs, warnings) = config.channel_specs();

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].channel, 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("VENT_2"));
    }

    #[test]
    fn test_non_channel_keys_ignored() {
        let config = AnalysisConfig::from_json_str(
            r#"{"FILL_VENT_PAIRS": {"FILL_X": "FILL_X", "NOTE": "ignored"}}"#,
        )
        .unwrap();
        let (specs, warnings) = config.channel_specs();
        assert!(specs.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_description_must_be_string() {
        let err = AnalysisConfig::from_json_str(r#"{"ERROR_DESCRIPTION": 7}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSection { section, .. }
            if section == constants::ERROR_DESCRIPTION_KEY));
    }

    #[test]
    fn test_pair_values_must_be_strings() {
        let err =
            AnalysisConfig::from_json_str(r#"{"FILL_VENT_PAIRS": {"FILL_1": 1}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSection { section, .. }
            if section == constants::FILL_VENT_PAIRS_KEY));
    }

    #[test]
    fn test_summary_table_requires_columns() {
        let err = AnalysisConfig::from_json_str(r#"{"SUMMARY_TAB": {"T": {"Row": ["X"]}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSection { section, .. }
            if section == constants::SUMMARY_TAB_KEY));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = AnalysisConfig::from_json_str("not json {{").unwrap_err();
        assert!(matches!(err, ConfigError::JsonParse { path: None, .. }));
    }

    #[test]
    fn test_from_path_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, FULL_CONFIG).unwrap();

        let config = AnalysisConfig::from_path(&path).unwrap();
        assert_eq!(config.error_description, "Fault text");
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AnalysisConfig::from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
