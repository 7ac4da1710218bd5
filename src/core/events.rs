// wspscan - core/events.rs
//
// Fill/vent cycle detection over merged dump-log tables. Core layer: pure
// logic, no I/O.
//
// A brake-control channel raises its FILL flag while the dump valve fills
// and pulses VENT while pressure is released. Each fill interval becomes
// one event annotated with the vent pulse count observed across it.

use crate::core::model::{CanonicalTable, ChannelActivity, FillVentEvent};
use crate::util::constants;
use crate::util::error::ColumnError;

/// Column bindings for one brake-control channel.
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    pub channel: u8,
    pub fill_column: String,
    pub vent_column: String,
    pub time_column: String,
    pub tick_column: String,
}

impl ChannelSpec {
    pub fn new(channel: u8, fill_column: &str, vent_column: &str) -> Self {
        Self {
            channel,
            fill_column: fill_column.to_string(),
            vent_column: vent_column.to_string(),
            time_column: constants::TIME_COLUMN.to_string(),
            tick_column: constants::TICK_COLUMN.to_string(),
        }
    }

    /// Map key under which this channel's events are reported.
    pub fn event_key(&self) -> String {
        format!(
            "{}{}_{}{}",
            constants::FILL_KEY_PREFIX,
            self.channel,
            constants::VENT_KEY_PREFIX,
            self.channel
        )
    }
}

// =============================================================================
// Event extraction
// =============================================================================

/// Extract fill/vent events for one channel.
///
/// Fill intervals are found from the sample-to-sample differences of the
/// FILL column: a rise (+1) opens an interval, the sample before a fall
/// (-1) closes it, and the k-th rise pairs with the k-th close. An
/// interval still open at the end of the log closes on the final sample.
/// The first sample never registers as a rise, so a log that starts
/// mid-fill contributes no event for that fill.
///
/// Vent pulses are counted over the interval extended one sample to the
/// left, so a vent already high at the interval start counts as one pulse.
/// A close that precedes its rise (a fall inherited from a fill the log
/// never saw open) still yields an event, with the reversed endpoints and
/// a zero pulse count.
pub fn extract_events(
    table: &CanonicalTable,
    spec: &ChannelSpec,
) -> Result<Vec<FillVentEvent>, ColumnError> {
    const CONTEXT: &str = "fill/vent event extraction";

    let fill = table.numeric_column(&spec.fill_column, CONTEXT)?;
    let vent = table.numeric_column(&spec.vent_column, CONTEXT)?;
    let time = table.numeric_column(&spec.time_column, CONTEXT)?;
    let tick = table.numeric_column(&spec.tick_column, CONTEXT)?;

    if fill.is_empty() {
        return Ok(Vec::new());
    }

    let mut starts = Vec::new();
    let mut ends = Vec::new();
    for i in 1..fill.len() {
        let diff = fill[i] - fill[i - 1];
        if diff == 1.0 {
            starts.push(i);
        } else if diff == -1.0 {
            ends.push(i - 1);
        }
    }
    if starts.len() > ends.len() {
        ends.push(fill.len() - 1);
    }

    let events: Vec<FillVentEvent> = starts
        .iter()
        .zip(ends.iter())
        .map(|(&start, &end)| FillVentEvent {
            channel: spec.channel,
            start_time: time[start],
            end_time: time[end],
            mod_tick_start: tick[start].round() as i64,
            mod_tick_end: tick[end].round() as i64,
            vent_transitions: count_vent_pulses(&vent, start, end),
        })
        .collect();

    tracing::debug!(
        channel = spec.channel,
        events = events.len(),
        "Fill/vent events extracted"
    );

    Ok(events)
}

/// Rising edges of `vent` across `[start-1, end]`, counted against an
/// implicit zero before the window.
fn count_vent_pulses(vent: &[f64], start: usize, end: usize) -> u64 {
    if end < start {
        return 0;
    }

    let lo = start.saturating_sub(1);
    let mut pulses = 0;
    let mut prev = 0.0;
    for &v in &vent[lo..=end] {
        if v - prev == 1.0 {
            pulses += 1;
        }
        prev = v;
    }
    pulses
}

// =============================================================================
// Channel filtering
// =============================================================================

/// Reduce a merged dump log to the configured channel columns.
///
/// Selection is all-or-nothing: if any configured column is absent the
/// result is an empty table plus a warning naming the missing columns.
/// Columns that are zero on every sample are dropped from the selection.
pub fn filter_channels(
    table: &CanonicalTable,
    specs: &[ChannelSpec],
) -> (CanonicalTable, Vec<String>) {
    let wanted: Vec<String> = specs
        .iter()
        .flat_map(|s| [s.fill_column.clone(), s.vent_column.clone()])
        .collect();

    match table.select_columns(&wanted) {
        Some(selected) => (drop_zero_columns(selected), Vec::new()),
        None => {
            let missing: Vec<&str> = wanted
                .iter()
                .filter(|c| table.column_index(c).is_none())
                .map(String::as_str)
                .collect();
            let warning = format!(
                "Channel filter skipped: columns not present in dump log: {}",
                missing.join(", ")
            );
            tracing::warn!("{}", warning);
            (CanonicalTable::new(Vec::new(), Vec::new()), vec![warning])
        }
    }
}

/// Per-column sums of the filtered dump log. Cells that do not parse as
/// numbers contribute nothing.
pub fn channel_activity(table: &CanonicalTable) -> Vec<ChannelActivity> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| ChannelActivity {
            column: column.clone(),
            total: table
                .rows
                .iter()
                .map(|row| row[idx].trim().parse::<f64>().unwrap_or(0.0))
                .sum(),
        })
        .collect()
}

/// Drop columns whose every sample parses to zero. A table with no rows
/// keeps its header.
fn drop_zero_columns(table: CanonicalTable) -> CanonicalTable {
    if table.rows.is_empty() {
        return table;
    }

    let keep: Vec<usize> = (0..table.columns.len())
        .filter(|&idx| {
            table
                .rows
                .iter()
                .any(|row| row[idx].trim().parse::<f64>().map_or(true, |v| v != 0.0))
        })
        .collect();

    if keep.len() == table.columns.len() {
        return table;
    }

    let columns = keep.iter().map(|&i| table.columns[i].clone()).collect();
    let rows = table
        .rows
        .iter()
        .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
        .collect();
    CanonicalTable::new(columns, rows)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dump_table(fill: &[f64], vent: &[f64]) -> CanonicalTable {
        let columns = vec![
            "MOD_TICK".to_string(),
            "MONTIME".to_string(),
            "FILL_1".to_string(),
            "VENT_1".to_string(),
        ];
        let rows = fill
            .iter()
            .zip(vent.iter())
            .enumerate()
            .map(|(i, (f, v))| {
                vec![
                    format!("{}", 100 + i),
                    format!("{:.2}", i as f64 * 0.05),
                    format!("{}", f),
                    format!("{}", v),
                ]
            })
            .collect();
        CanonicalTable::new(columns, rows)
    }

    fn spec() -> ChannelSpec {
        ChannelSpec::new(1, "FILL_1", "VENT_1")
    }

    #[test]
    fn test_event_key() {
        assert_eq!(spec().event_key(), "FILL_1_VENT_1");
    }

    #[test]
    fn test_two_fill_intervals_with_vent_counts() {
        let table = dump_table(
            &[0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0],
        );
        let events = extract_events(&table, &spec()).unwrap();

        assert_eq!(events.len(), 2);

        assert_eq!(events[0].start_time, 0.05);
        assert_eq!(events[0].end_time, 0.10);
        assert_eq!(events[0].mod_tick_start, 101);
        assert_eq!(events[0].mod_tick_end, 102);
        assert_eq!(events[0].vent_transitions, 1);

        assert_eq!(events[1].start_time, 0.25);
        assert_eq!(events[1].end_time, 0.25);
        assert_eq!(events[1].mod_tick_start, 105);
        assert_eq!(events[1].mod_tick_end, 105);
        assert_eq!(events[1].vent_transitions, 0);
    }

    #[test]
    fn test_open_interval_closes_on_last_sample() {
        let table = dump_table(&[0.0, 1.0, 1.0], &[0.0, 1.0, 0.0]);
        let events = extract_events(&table, &spec()).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].mod_tick_start, 101);
        assert_eq!(events[0].mod_tick_end, 102);
        assert_eq!(events[0].vent_transitions, 1);
    }

    #[test]
    fn test_vent_high_before_interval_counts_once() {
        // The look-back sample is compared against an implicit zero, so a
        // vent already high going into the interval registers as a pulse.
        let table = dump_table(&[0.0, 0.0, 1.0, 0.0], &[0.0, 1.0, 1.0, 0.0]);
        let events = extract_events(&table, &spec()).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].vent_transitions, 1);
    }

    #[test]
    fn test_log_starting_mid_fill_yields_reversed_event() {
        let table = dump_table(&[1.0, 0.0, 0.0, 1.0, 0.0], &[0.0, 1.0, 0.0, 0.0, 1.0]);
        let events = extract_events(&table, &spec()).unwrap();

        // The fall at row 1 closes a fill the log never saw open; it pairs
        // with the first observed rise and reports reversed endpoints.
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].mod_tick_start, 103);
        assert_eq!(events[0].mod_tick_end, 100);
        assert_eq!(events[0].vent_transitions, 0);
    }

    #[test]
    fn test_flat_fill_yields_no_events() {
        let table = dump_table(&[0.0, 0.0, 0.0], &[1.0, 0.0, 1.0]);
        assert!(extract_events(&table, &spec()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let table = CanonicalTable::new(vec!["MONTIME".to_string()], vec![]);
        assert!(matches!(
            extract_events(&table, &spec()),
            Err(ColumnError::Missing { .. })
        ));
    }

    #[test]
    fn test_non_numeric_cell_is_an_error() {
        let mut table = dump_table(&[0.0, 1.0], &[0.0, 0.0]);
        table.rows[1][2] = "high".to_string();
        assert!(matches!(
            extract_events(&table, &spec()),
            Err(ColumnError::NumericParse { .. })
        ));
    }

    #[test]
    fn test_filter_keeps_configured_nonzero_columns() {
        let table = CanonicalTable::new(
            vec![
                "MONTIME".to_string(),
                "FILL_1".to_string(),
                "VENT_1".to_string(),
            ],
            vec![
                vec!["0.00".to_string(), "0".to_string(), "0".to_string()],
                vec!["0.05".to_string(), "1".to_string(), "0".to_string()],
            ],
        );
        let (filtered, warnings) = filter_channels(&table, &[spec()]);

        assert!(warnings.is_empty());
        // VENT_1 is zero throughout and gets dropped; MONTIME was never
        // part of the selection.
        assert_eq!(filtered.columns, vec!["FILL_1".to_string()]);
        assert_eq!(filtered.row_count(), 2);

        let activity = channel_activity(&filtered);
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].column, "FILL_1");
        assert_eq!(activity[0].total, 1.0);
    }

    #[test]
    fn test_filter_is_all_or_nothing() {
        let table = CanonicalTable::new(
            vec!["FILL_1".to_string()],
            vec![vec!["1".to_string()]],
        );
        let (filtered, warnings) = filter_channels(&table, &[spec()]);

        assert!(filtered.is_empty());
        assert!(filtered.columns.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("VENT_1"));
    }
}
