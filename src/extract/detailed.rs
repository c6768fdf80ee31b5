use chrono::{DateTime, Utc};

use crate::extract::{normalize_accuracy, parse_elapsed_seconds, parse_flexible_number, split_cells};
use crate::ingest::SkipReason;
use crate::record::{RawFile, ScenarioRecord};
use crate::session_date::resolve_timestamp;
use crate::stamina::stamina_index;

const DETAILED_HEADER_TOKEN: &str = "Kill #";

const FIELD_SCENARIO: &str = "Scenario";
const FIELD_SCORE: &str = "Score";
const FIELD_HIT_COUNT: &str = "Hit Count";
const FIELD_MISS_COUNT: &str = "Miss Count";
const FIELD_AVG_TTK: &str = "Avg TTK";
const FIELD_AVG_FPS: &str = "Avg FPS";

/// Extract zero or one normalized record from a per-event detailed log.
///
/// The format mixes a tabular per-kill section with trailing `key: value`
/// metadata lines, with inconsistent delimiters between exports. Missing
/// scenario or unparsable score yields no record; malformed exports are
/// expected and reported, not fatal.
pub fn extract_detailed_log(
    file: &RawFile,
    ingested_at: DateTime<Utc>,
) -> Result<ScenarioRecord, SkipReason> {
    let footer = FooterFields::scan(&file.contents);
    let events = PerEventTable::scan(&file.contents);

    let scenario_name = footer
        .value(FIELD_SCENARIO)
        .map(str::to_string)
        .filter(|name| !name.is_empty())
        .ok_or(SkipReason::MissingScenario)?;

    let score = footer
        .value(FIELD_SCORE)
        .and_then(parse_flexible_number)
        .ok_or(SkipReason::UnparsableScore)?;

    let accuracy = footer
        .hit_miss_accuracy()
        .or_else(|| events.mean_accuracy())
        .unwrap_or(0.0);

    let avg_time_to_kill = footer
        .value(FIELD_AVG_TTK)
        .and_then(parse_flexible_number)
        .or_else(|| events.mean_time_to_kill())
        .unwrap_or(0.0);

    let avg_frame_rate = footer
        .value(FIELD_AVG_FPS)
        .and_then(parse_flexible_number)
        .unwrap_or(0.0);

    let timestamp = resolve_timestamp(&file.name, None, ingested_at);

    Ok(ScenarioRecord::new(
        scenario_name,
        timestamp,
        score,
        accuracy,
        avg_time_to_kill,
        avg_frame_rate,
        stamina_index(&events.kill_times),
    ))
}

/// Trailing `key: value` metadata collected from anywhere in the file.
#[derive(Debug, Default)]
struct FooterFields {
    scenario: Option<String>,
    score: Option<String>,
    hit_count: Option<String>,
    miss_count: Option<String>,
    avg_ttk: Option<String>,
    avg_fps: Option<String>,
}

impl FooterFields {
    fn scan(text: &str) -> Self {
        let mut fields = Self::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            for (key, slot) in [
                (FIELD_SCENARIO, &mut fields.scenario),
                (FIELD_SCORE, &mut fields.score),
                (FIELD_HIT_COUNT, &mut fields.hit_count),
                (FIELD_MISS_COUNT, &mut fields.miss_count),
                (FIELD_AVG_TTK, &mut fields.avg_ttk),
                (FIELD_AVG_FPS, &mut fields.avg_fps),
            ] {
                if slot.is_none() {
                    if let Some(value) = match_key_value(line, key) {
                        *slot = Some(value);
                    }
                }
            }
        }

        fields
    }

    fn value(&self, key: &str) -> Option<&str> {
        let slot = match key {
            FIELD_SCENARIO => &self.scenario,
            FIELD_SCORE => &self.score,
            FIELD_HIT_COUNT => &self.hit_count,
            FIELD_MISS_COUNT => &self.miss_count,
            FIELD_AVG_TTK => &self.avg_ttk,
            FIELD_AVG_FPS => &self.avg_fps,
            _ => &None,
        };

        slot.as_deref()
    }

    fn hit_miss_accuracy(&self) -> Option<f64> {
        let hits = self.hit_count.as_deref().and_then(parse_flexible_number)?;
        let misses = self.miss_count.as_deref().and_then(parse_flexible_number)?;

        if hits + misses > 0.0 {
            Some(hits / (hits + misses))
        } else {
            Some(0.0)
        }
    }
}

/// Match a `key: value` shaped line for one known field name.
///
/// The key and value may be separated by a colon, a comma, or a whitespace
/// run; exports are inconsistent about which.
fn match_key_value(line: &str, key: &str) -> Option<String> {
    let prefix = line.get(..key.len())?;
    if !prefix.eq_ignore_ascii_case(key) {
        return None;
    }

    let remainder = &line[key.len()..];
    let first_character = remainder.chars().next()?;
    if !matches!(first_character, ':' | ',') && !first_character.is_whitespace() {
        return None;
    }

    let value = remainder
        .trim_start_matches([':', ','])
        .trim_start_matches(|character: char| character.is_whitespace())
        .trim_start_matches([':', ','])
        .trim()
        .trim_matches('"')
        .trim();

    Some(value.to_string())
}

/// Per-kill rows from the tabular section of a detailed log.
///
/// Column positions vary between exports, so indices are resolved from the
/// header row by case-insensitive name match. Accumulation stops at the
/// first row whose leading cell contains a colon, which marks the start of
/// the footer metadata block.
#[derive(Debug, Default)]
struct PerEventTable {
    kill_times: Vec<f64>,
    time_to_kill_values: Vec<f64>,
    accuracy_values: Vec<f64>,
}

impl PerEventTable {
    fn scan(text: &str) -> Self {
        let mut table = Self::default();
        let mut lines = text.lines();

        let Some(columns) = lines.find_map(|line| {
            if line.contains(DETAILED_HEADER_TOKEN) {
                ColumnIndices::from_header(line)
            } else {
                None
            }
        }) else {
            return table;
        };

        for line in lines {
            let cells = split_cells(line);
            let Some(first) = cells.first() else {
                continue;
            };
            if first.is_empty() && cells.len() <= 1 {
                continue;
            }
            if first.contains(':') {
                // Footer boundary: summary metadata lines follow.
                break;
            }

            if let Some(elapsed) = columns
                .timestamp
                .and_then(|index| cells.get(index))
                .and_then(|cell| parse_elapsed_seconds(cell))
            {
                table.kill_times.push(elapsed);
            }
            if let Some(ttk) = columns.cell_number(&cells, columns.time_to_kill) {
                table.time_to_kill_values.push(ttk);
            }
            if let Some(accuracy) = columns.cell_number(&cells, columns.accuracy) {
                table.accuracy_values.push(normalize_accuracy(accuracy));
            }
        }

        table
    }

    fn mean_time_to_kill(&self) -> Option<f64> {
        mean(&self.time_to_kill_values)
    }

    fn mean_accuracy(&self) -> Option<f64> {
        mean(&self.accuracy_values)
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    timestamp: Option<usize>,
    time_to_kill: Option<usize>,
    accuracy: Option<usize>,
}

impl ColumnIndices {
    fn from_header(header_line: &str) -> Option<Self> {
        let cells = split_cells(header_line);
        if !cells
            .iter()
            .any(|cell| cell.contains(DETAILED_HEADER_TOKEN))
        {
            return None;
        }

        let find = |needle: &str| {
            cells
                .iter()
                .position(|cell| cell.to_ascii_lowercase().contains(needle))
        };

        Some(Self {
            timestamp: find("timestamp"),
            time_to_kill: find("ttk"),
            accuracy: find("accuracy"),
        })
    }

    fn cell_number(&self, cells: &[&str], index: Option<usize>) -> Option<f64> {
        index
            .and_then(|index| cells.get(index))
            .and_then(|cell| parse_flexible_number(cell))
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::{extract_detailed_log, match_key_value, PerEventTable};
    use crate::ingest::SkipReason;
    use crate::record::RawFile;
    use chrono::{TimeZone, Utc};

    fn ingestion_instant() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn detailed_export() -> String {
        let mut text = String::from("Kill #,Timestamp,Bot,Weapon,TTK,Shots,Hits,Accuracy,Damage Done\n");
        for kill in 0..6u32 {
            text.push_str(&format!(
                "{},00:00:{:02}.000,bot,ar,0.42,5,4,0.8,120\n",
                kill + 1,
                kill * 4
            ));
        }
        text.push_str("Score:,812.5\n");
        text.push_str("Scenario:,1wall6targets\n");
        text.push_str("Hit Count:,80\n");
        text.push_str("Miss Count:,20\n");
        text.push_str("Avg TTK:,0.42s\n");
        text.push_str("Avg FPS:,240\n");
        text
    }

    #[test]
    fn extracts_record_from_well_formed_detailed_log() {
        let file = RawFile::new(
            "1wall6targets - 2025.11.03-20.05.18 Stats.csv",
            detailed_export(),
        );

        let record = extract_detailed_log(&file, ingestion_instant())
            .expect("Expected detailed log to yield a record");

        assert_eq!(record.scenario_name, "1wall6targets");
        assert_eq!(record.score, 812.5);
        assert_eq!(record.avg_time_to_kill, 0.42);
        assert_eq!(record.avg_frame_rate, 240.0);
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2025, 11, 3, 20, 5, 18).unwrap()
        );
    }

    #[test]
    fn computes_accuracy_from_hit_and_miss_counts() {
        let file = RawFile::new("drill - 2025.01.02-10.00.00 Stats.csv", detailed_export());

        let record = extract_detailed_log(&file, ingestion_instant())
            .expect("Expected detailed log to yield a record");

        assert!((record.accuracy - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_scenario_yields_no_record() {
        let text = "Kill #,Timestamp\n1,00:00:01.000\nScore:,812.5\n";
        let file = RawFile::new("broken Stats.csv", text.to_string());

        let outcome = extract_detailed_log(&file, ingestion_instant());
        assert_eq!(outcome.unwrap_err(), SkipReason::MissingScenario);
    }

    #[test]
    fn unparsable_score_yields_no_record() {
        let text = "Kill #,Timestamp\n1,00:00:01.000\nScenario:,drill\nScore:,n/a\n";
        let file = RawFile::new("broken Stats.csv", text.to_string());

        let outcome = extract_detailed_log(&file, ingestion_instant());
        assert_eq!(outcome.unwrap_err(), SkipReason::UnparsableScore);
    }

    #[test]
    fn tolerates_decimal_comma_score() {
        let text = "Kill #,Timestamp\n1,00:00:01.000\nScenario:,drill\nScore:,1234,5\n";
        let file = RawFile::new("drill Stats.csv", text.to_string());

        let record = extract_detailed_log(&file, ingestion_instant())
            .expect("Expected decimal-comma score to parse");
        assert_eq!(record.score, 1234.5);
    }

    #[test]
    fn matches_key_value_across_separator_styles() {
        assert_eq!(
            match_key_value("Scenario: drill", "Scenario").as_deref(),
            Some("drill")
        );
        assert_eq!(
            match_key_value("Scenario:,drill", "Scenario").as_deref(),
            Some("drill")
        );
        assert_eq!(
            match_key_value("Scenario  drill", "Scenario").as_deref(),
            Some("drill")
        );
        assert_eq!(match_key_value("ScenarioX drill", "Scenario"), None);
    }

    #[test]
    fn per_event_scan_stops_at_footer_boundary() {
        let text = "Kill #,Timestamp,TTK,Accuracy,Damage\n\
                    1,00:00:02.000,0.4,0.9,100\n\
                    2,00:00:04.000,0.6,0.7,80\n\
                    Score:,100\n\
                    3,00:00:06.000,0.5,0.8,90\n";

        let table = PerEventTable::scan(text);
        assert_eq!(table.kill_times, vec![2.0, 4.0]);
        assert_eq!(table.time_to_kill_values, vec![0.4, 0.6]);
    }

    #[test]
    fn falls_back_to_per_event_averages_when_footer_is_sparse() {
        let text = "Kill #,Timestamp,TTK,Accuracy\n\
                    1,00:00:02.000,0.4,0.9\n\
                    2,00:00:04.000,0.6,0.7\n\
                    Scenario:,drill\n\
                    Score:,55\n";
        let file = RawFile::new("drill Stats.csv", text.to_string());

        let record = extract_detailed_log(&file, ingestion_instant())
            .expect("Expected sparse footer to still yield a record");

        assert!((record.avg_time_to_kill - 0.5).abs() < 1e-9);
        assert!((record.accuracy - 0.8).abs() < 1e-9);
        assert_eq!(record.avg_frame_rate, 0.0);
    }
}
