use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One raw export file as handed over by the file-selection layer.
/// Consumed exactly once by the classifier.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub contents: String,
}

impl RawFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// The canonical, schema-independent representation of one training session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRecord {
    pub scenario_name: String,
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub accuracy: f64,
    pub avg_time_to_kill: f64,
    pub avg_frame_rate: f64,
    pub stamina_index: f64,
    /// List-key token only. Never used for equality or ordering.
    pub id: Uuid,
}

impl ScenarioRecord {
    pub fn new(
        scenario_name: String,
        timestamp: DateTime<Utc>,
        score: f64,
        accuracy: f64,
        avg_time_to_kill: f64,
        avg_frame_rate: f64,
        stamina_index: f64,
    ) -> Self {
        Self {
            scenario_name,
            timestamp,
            score: sanitize_non_negative(score),
            accuracy: sanitize_fraction(accuracy),
            avg_time_to_kill: sanitize_non_negative(avg_time_to_kill),
            avg_frame_rate: sanitize_non_negative(avg_frame_rate),
            stamina_index: sanitize_non_negative(stamina_index),
            id: Uuid::new_v4(),
        }
    }
}

/// Flat representation submitted to the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub scenario: String,
    pub score: f64,
    pub accuracy: f64,
    pub time_to_kill: f64,
    pub frame_rate: f64,
    pub stamina_index: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<&ScenarioRecord> for UploadRecord {
    fn from(record: &ScenarioRecord) -> Self {
        Self {
            scenario: record.scenario_name.clone(),
            score: record.score,
            accuracy: record.accuracy,
            time_to_kill: record.avg_time_to_kill,
            frame_rate: record.avg_frame_rate,
            stamina_index: record.stamina_index,
            timestamp: record.timestamp,
        }
    }
}

fn sanitize_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn sanitize_fraction(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }

    value.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::ScenarioRecord;
    use chrono::Utc;

    #[test]
    fn sanitizes_unparsable_numeric_fields_to_zero() {
        let record = ScenarioRecord::new(
            "1wall6targets".to_string(),
            Utc::now(),
            f64::NAN,
            -0.5,
            f64::INFINITY,
            -10.0,
            f64::NAN,
        );

        assert_eq!(record.score, 0.0);
        assert_eq!(record.accuracy, 0.0);
        assert_eq!(record.avg_time_to_kill, 0.0);
        assert_eq!(record.avg_frame_rate, 0.0);
        assert_eq!(record.stamina_index, 0.0);
    }

    #[test]
    fn clamps_accuracy_into_unit_interval() {
        let record = ScenarioRecord::new(
            "1wall6targets".to_string(),
            Utc::now(),
            100.0,
            1.3,
            0.4,
            240.0,
            95.0,
        );

        assert_eq!(record.accuracy, 1.0);
    }

    #[test]
    fn assigns_distinct_identity_tokens() {
        let first = ScenarioRecord::new("a".to_string(), Utc::now(), 1.0, 0.5, 0.3, 144.0, 90.0);
        let second = ScenarioRecord::new("a".to_string(), Utc::now(), 1.0, 0.5, 0.3, 144.0, 90.0);

        assert_ne!(first.id, second.id);
    }
}
