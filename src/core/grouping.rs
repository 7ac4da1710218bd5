// wspscan - core/grouping.rs
//
// Partitioning of summarised errors into named groups. Core layer: pure
// logic, no I/O.
//
// One catalogue capability, two constructors: the built-in table covering
// the standard WSP error vocabulary, and a configuration-driven table for
// fleets with custom descriptions. Callers depend only on the capability.

use crate::core::frequency::normalize_description;
use crate::core::model::{CanonicalTable, ErrorFrequencyEntry};
use crate::util::constants;
use crate::util::error::ColumnError;
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Catalogue
// =============================================================================

/// A named group and the error descriptions that belong to it.
#[derive(Debug, Clone)]
pub struct ErrorGroup {
    pub name: String,
    pub members: Vec<String>,
}

/// Maps error descriptions to group names.
///
/// Membership is disjoint: a description maps to at most one group, and
/// everything unmapped falls into the unclassified catch-all at grouping
/// time.
#[derive(Debug, Clone)]
pub struct GroupCatalog {
    groups: Vec<ErrorGroup>,

    /// Reverse index: normalised description to group name.
    index: HashMap<String, String>,
}

impl GroupCatalog {
    fn build(groups: Vec<ErrorGroup>) -> Self {
        let mut index = HashMap::new();
        for group in &groups {
            for member in &group.members {
                index.insert(normalize_description(member), group.name.clone());
            }
        }
        Self { groups, index }
    }

    /// The built-in catalogue covering the standard WSP error vocabulary.
    pub fn builtin() -> Self {
        fn group(name: &str, members: &[&str]) -> ErrorGroup {
            ErrorGroup {
                name: name.to_string(),
                members: members.iter().map(|m| m.to_string()).collect(),
            }
        }

        Self::build(vec![
            group(
                "Axle Lock Group",
                &["AXLE1_LOCK", "AXLE2_LOCK", "AXLE3_LOCK", "AXLE4_LOCK"],
            ),
            group(
                "Speed Sensor Error",
                &["E_SENS_FR1", "E_SENS_FR2", "E_SENS_FR3", "E_SENS_FR4"],
            ),
            group(
                "Dump Valve Errors",
                &[
                    "E_DV1_TOUT",
                    "E_DV2_TOUT",
                    "E_DV3_TOUT",
                    "E_DV4_TOUT",
                    "E_DV1_OC",
                    "E_DV2_OC",
                    "E_DV3_OC",
                    "E_DV4_OC",
                ],
            ),
            group(
                "Board Errors",
                &[
                    "E_ZERO_SPEED",
                    "E_SPEED_5",
                    "E_SPEED_5_1",
                    "E_SPEED_5_2",
                    "E_SPEED_30",
                    "E_SPEED_45",
                    "E_WSP_FAILURE",
                    "E_DEVICE_ON",
                ],
            ),
            group("Power On Event", &["I_POWER_ON"]),
        ])
    }

    /// Build a catalogue from configuration pairs (group name, members),
    /// in document order.
    pub fn from_config(entries: &[(String, Vec<String>)]) -> Self {
        Self::build(
            entries
                .iter()
                .map(|(name, members)| ErrorGroup {
                    name: name.clone(),
                    members: members.clone(),
                })
                .collect(),
        )
    }

    /// Group names in catalogue order, without the unclassified catch-all.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Group name for a normalised description, if any mapping exists.
    pub fn assign(&self, description: &str) -> Option<&str> {
        self.index
            .get(&normalize_description(description))
            .map(String::as_str)
    }
}

/// True for descriptions that record a condition clearing rather than
/// occurring. These are excluded from grouping entirely.
pub fn is_excluded(description: &str) -> bool {
    description
        .to_uppercase()
        .contains(constants::EXCLUDED_DESCRIPTION_MARKER)
}

// =============================================================================
// Grouping
// =============================================================================

/// Partition frequency entries into catalogue groups.
///
/// Every catalogue group appears in the output, empty or not, plus the
/// unclassified catch-all. Excluded ("cleared") descriptions are dropped
/// before assignment. Entries keep their summarizer order within each
/// partition.
pub fn group(
    frequencies: &[ErrorFrequencyEntry],
    catalog: &GroupCatalog,
) -> BTreeMap<String, Vec<ErrorFrequencyEntry>> {
    let mut partitions: BTreeMap<String, Vec<ErrorFrequencyEntry>> = catalog
        .group_names()
        .map(|name| (name.to_string(), Vec::new()))
        .collect();
    partitions.insert(constants::UNCLASSIFIED_GROUP.to_string(), Vec::new());

    let mut excluded = 0usize;
    for entry in frequencies {
        if is_excluded(&entry.description) {
            excluded += 1;
            continue;
        }

        let target = catalog
            .assign(&entry.description)
            .unwrap_or(constants::UNCLASSIFIED_GROUP);

        partitions
            .entry(target.to_string())
            .or_default()
            .push(entry.clone());
    }

    tracing::debug!(
        groups = partitions.len(),
        excluded,
        "Frequencies partitioned"
    );

    partitions
}

/// Per-group detail tables: for each group, the raw listing rows whose
/// normalised description belongs to it. Excluded descriptions appear in
/// no group, matching [`group`].
pub fn detail_tables(
    ecl: &CanonicalTable,
    description_column: &str,
    catalog: &GroupCatalog,
) -> Result<BTreeMap<String, CanonicalTable>, ColumnError> {
    let desc_col = ecl
        .column_index(description_column)
        .ok_or_else(|| ColumnError::Missing {
            column: description_column.to_string(),
            context: "group detail tables",
        })?;

    let mut buckets: BTreeMap<String, Vec<Vec<String>>> = catalog
        .group_names()
        .map(|name| (name.to_string(), Vec::new()))
        .collect();
    buckets.insert(constants::UNCLASSIFIED_GROUP.to_string(), Vec::new());

    for row in &ecl.rows {
        let description = &row[desc_col];
        if is_excluded(description) {
            continue;
        }

        let target = catalog
            .assign(description)
            .unwrap_or(constants::UNCLASSIFIED_GROUP);

        buckets
            .entry(target.to_string())
            .or_default()
            .push(row.clone());
    }

    Ok(buckets
        .into_iter()
        .map(|(name, rows)| (name, CanonicalTable::new(ecl.columns.clone(), rows)))
        .collect())
}

// =============================================================================
// Tests
// =============================================================================
