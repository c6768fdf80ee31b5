use chrono::{DateTime, Utc};

use crate::extract::{normalize_accuracy, parse_flexible_number, split_cells};
use crate::record::{RawFile, ScenarioRecord};
use crate::session_date::resolve_timestamp;

/// Extract one record per valid data row from a session summary table.
///
/// A single export may hold several sessions. Rows without a scenario name
/// are skipped; unparsable numeric cells normalize to zero and never abort
/// the row.
pub fn extract_summary_table(file: &RawFile, ingested_at: DateTime<Utc>) -> Vec<ScenarioRecord> {
    let mut lines = file.contents.lines().filter(|line| !line.trim().is_empty());

    let Some(columns) = lines.next().and_then(SummaryColumns::from_header) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for line in lines {
        let cells = split_cells(line);

        let Some(scenario_name) = columns.text_cell(&cells, columns.scenario) else {
            continue;
        };

        let score = columns.numeric_cell(&cells, columns.score);
        let accuracy = columns
            .numeric_cell_opt(&cells, columns.accuracy)
            .map(normalize_accuracy)
            .unwrap_or(0.0);
        let time_to_kill = columns.numeric_cell(&cells, columns.time_to_kill);
        let frame_rate = columns.numeric_cell(&cells, columns.frame_rate);

        let in_file_date = columns.text_cell(&cells, columns.date);
        let timestamp = resolve_timestamp(&file.name, in_file_date.as_deref(), ingested_at);

        // Summary rows carry no per-event timeline, so no stamina estimate.
        records.push(ScenarioRecord::new(
            scenario_name,
            timestamp,
            score,
            accuracy,
            time_to_kill,
            frame_rate,
            0.0,
        ));
    }

    records
}

#[derive(Debug, Clone, Copy)]
struct SummaryColumns {
    scenario: Option<usize>,
    score: Option<usize>,
    date: Option<usize>,
    accuracy: Option<usize>,
    time_to_kill: Option<usize>,
    frame_rate: Option<usize>,
}

impl SummaryColumns {
    fn from_header(header_line: &str) -> Option<Self> {
        let cells: Vec<String> = split_cells(header_line)
            .into_iter()
            .map(|cell| cell.trim_matches('"').trim().to_ascii_lowercase())
            .collect();

        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| cells.iter().position(|cell| cell == alias))
        };

        let columns = Self {
            scenario: find(&["scenario name", "scenario"]),
            score: find(&["score"]),
            date: find(&["date and time", "date"]),
            accuracy: find(&["accuracy"]),
            time_to_kill: find(&["time to kill", "avg ttk", "ttk"]),
            frame_rate: find(&["avg fps", "fps"]),
        };

        // Without a scenario column there is nothing to key records by.
        columns.scenario?;
        Some(columns)
    }

    fn text_cell(&self, cells: &[&str], index: Option<usize>) -> Option<String> {
        index
            .and_then(|index| cells.get(index))
            .map(|cell| cell.trim_matches('"').trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn numeric_cell_opt(&self, cells: &[&str], index: Option<usize>) -> Option<f64> {
        index
            .and_then(|index| cells.get(index))
            .and_then(|cell| parse_flexible_number(cell))
    }

    fn numeric_cell(&self, cells: &[&str], index: Option<usize>) -> f64 {
        self.numeric_cell_opt(cells, index).unwrap_or(0.0)
    }
}
