use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::classify::{classify_format, LogFormat};
use crate::extract::{extract_detailed_log, extract_summary_table};
use crate::record::{RawFile, ScenarioRecord};
use crate::series::ScenarioSeries;

/// Why a file produced no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    UnrecognizedFormat,
    MissingScenario,
    UnparsableScore,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipReport {
    pub file_name: String,
    pub reason: SkipReason,
}

/// Result of one ingestion batch: the updated series snapshot plus a full
/// account of everything that was skipped. Malformed input never errors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub series: ScenarioSeries,
    pub skipped: Vec<SkipReport>,
    pub ingested: usize,
}

/// Outcome of extracting a single file, before any merge.
#[derive(Debug)]
pub struct FileOutcome {
    pub records: Vec<ScenarioRecord>,
    pub skip: Option<SkipReport>,
}

/// Classify one file and run the matching extractor. Pure per-file step
/// with no shared state, so batches can fan these out in parallel.
pub fn extract_file(file: &RawFile, ingested_at: DateTime<Utc>) -> FileOutcome {
    match classify_format(&file.contents) {
        LogFormat::DetailedLog => match extract_detailed_log(file, ingested_at) {
            Ok(record) => FileOutcome {
                records: vec![record],
                skip: None,
            },
            Err(reason) => FileOutcome {
                records: Vec::new(),
                skip: Some(SkipReport {
                    file_name: file.name.clone(),
                    reason,
                }),
            },
        },
        LogFormat::SummaryTable => {
            let records = extract_summary_table(file, ingested_at);
            let skip = records.is_empty().then(|| SkipReport {
                file_name: file.name.clone(),
                reason: SkipReason::MissingScenario,
            });
            FileOutcome { records, skip }
        }
        LogFormat::Unrecognized => FileOutcome {
            records: Vec::new(),
            skip: Some(SkipReport {
                file_name: file.name.clone(),
                reason: SkipReason::UnrecognizedFormat,
            }),
        },
    }
}

/// Batch ingestion engine holding the shared per-scenario series.
///
/// Extraction runs per file on blocking tasks; the merge into the series
/// happens once per batch behind a single writer, so a batch is
/// all-or-nothing and concurrent batches cannot interleave their merges.
#[derive(Debug, Clone, Default)]
pub struct StatIngestor {
    series: Arc<RwLock<ScenarioSeries>>,
}

impl StatIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a batch of raw export files and return the updated snapshot
    /// plus a skip report per file that yielded nothing.
    pub async fn ingest(&self, files: Vec<RawFile>) -> IngestReport {
        let ingested_at = Utc::now();
        let file_count = files.len();

        let mut extraction_tasks = Vec::with_capacity(file_count);
        for file in files {
            extraction_tasks.push(tokio::task::spawn_blocking(move || {
                extract_file(&file, ingested_at)
            }));
        }

        let mut batch_records = Vec::new();
        let mut skipped = Vec::new();
        for task in extraction_tasks {
            match task.await {
                Ok(outcome) => {
                    batch_records.extend(outcome.records);
                    if let Some(skip) = outcome.skip {
                        skipped.push(skip);
                    }
                }
                Err(error) => {
                    tracing::error!(join_error = %error, "File extraction task failed");
                }
            }
        }

        let ingested = batch_records.len();
        let series = {
            let mut series = self.series.write().await;
            series.merge_batch(batch_records);
            series.clone()
        };

        tracing::info!(
            files = file_count,
            records_ingested = ingested,
            files_skipped = skipped.len(),
            "Ingestion batch finished"
        );
        for skip in &skipped {
            tracing::warn!(
                file_name = %skip.file_name,
                reason = ?skip.reason,
                "Export file skipped"
            );
        }

        IngestReport {
            series,
            skipped,
            ingested,
        }
    }

    /// Current immutable snapshot of the per-scenario series.
    pub async fn snapshot(&self) -> ScenarioSeries {
        self.series.read().await.clone()
    }
}
