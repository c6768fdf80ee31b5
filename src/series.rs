use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::{ScenarioRecord, UploadRecord};

/// Per-scenario ordered series of normalized records.
///
/// Each scenario's records stay sorted ascending by timestamp; ties keep
/// their prior relative order, with newly merged records after existing
/// ones. Records themselves are never mutated by a merge.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSeries {
    scenarios: BTreeMap<String, Vec<ScenarioRecord>>,
}

impl ScenarioSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of newly extracted records, re-establishing each
    /// affected scenario's sort order with a stable sort.
    pub fn merge_batch(&mut self, records: Vec<ScenarioRecord>) {
        let mut touched_scenarios = std::collections::BTreeSet::new();

        for record in records {
            touched_scenarios.insert(record.scenario_name.clone());
            self.scenarios
                .entry(record.scenario_name.clone())
                .or_default()
                .push(record);
        }

        for scenario_name in touched_scenarios {
            if let Some(scenario_records) = self.scenarios.get_mut(&scenario_name) {
                // Vec::sort_by is stable, so equal timestamps keep their
                // prior relative order.
                scenario_records.sort_by(|left, right| left.timestamp.cmp(&right.timestamp));
            }
        }
    }

    pub fn records_for(&self, scenario_name: &str) -> Option<&[ScenarioRecord]> {
        self.scenarios
            .get(scenario_name)
            .map(|records| records.as_slice())
    }

    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn record_count(&self) -> usize {
        self.scenarios.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Flat upload view for the remote store sync path.
    pub fn upload_records(&self) -> Vec<UploadRecord> {
        self.scenarios
            .values()
            .flat_map(|records| records.iter().map(UploadRecord::from))
            .collect()
    }
}
