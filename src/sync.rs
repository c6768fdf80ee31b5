use serde::Serialize;
use std::future::Future;

use crate::record::UploadRecord;

/// Remote stores cap payload sizes, so uploads go out in bounded batches.
pub const DEFAULT_UPLOAD_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUploadFailure {
    pub batch_index: usize,
    pub record_count: usize,
    pub error: String,
}

/// Per-batch accounting for one upload run. A failed batch never prevents
/// later batches from being attempted; the local series stays available
/// for retry.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub batches_attempted: usize,
    pub batches_sent: usize,
    pub records_uploaded: usize,
    pub failures: Vec<BatchUploadFailure>,
}

impl SyncOutcome {
    pub fn fully_synced(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Client handle for the remote session store, injected into the sync path
/// rather than constructed ad hoc.
#[derive(Debug, Clone)]
pub struct RemoteStoreClient {
    http: reqwest::Client,
    base_url: String,
    batch_size: usize,
}

impl RemoteStoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            batch_size: DEFAULT_UPLOAD_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Upload a flat list of session records in bounded batches.
    pub async fn upload(&self, records: &[UploadRecord]) -> SyncOutcome {
        upload_in_batches(records, self.batch_size, |batch| async move {
            self.send_batch(&batch).await
        })
        .await
    }

    async fn send_batch(&self, batch: &[UploadRecord]) -> Result<(), String> {
        let endpoint = format!("{}/sessions", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&endpoint)
            .json(batch)
            .send()
            .await
            .map_err(|error| format!("Failed to reach session store '{endpoint}': {error}"))?;

        response
            .error_for_status()
            .map_err(|error| format!("Session store rejected batch: {error}"))?;

        Ok(())
    }
}

/// Batching core, separated from the HTTP transport so the per-batch
/// failure policy is testable without a live store.
pub(crate) async fn upload_in_batches<SendBatch, SendFuture>(
    records: &[UploadRecord],
    batch_size: usize,
    mut send_batch: SendBatch,
) -> SyncOutcome
where
    SendBatch: FnMut(Vec<UploadRecord>) -> SendFuture,
    SendFuture: Future<Output = Result<(), String>>,
{
    let batch_size = batch_size.max(1);
    let mut outcome = SyncOutcome::default();

    for (batch_index, batch) in records.chunks(batch_size).enumerate() {
        outcome.batches_attempted += 1;

        match send_batch(batch.to_vec()).await {
            Ok(()) => {
                outcome.batches_sent += 1;
                outcome.records_uploaded += batch.len();
            }
            Err(error) => {
                tracing::warn!(
                    batch_index,
                    record_count = batch.len(),
                    upload_error = %error,
                    "Session batch upload failed"
                );
                outcome.failures.push(BatchUploadFailure {
                    batch_index,
                    record_count: batch.len(),
                    error,
                });
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::upload_in_batches;
    use crate::record::UploadRecord;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn upload_records(count: usize) -> Vec<UploadRecord> {
        (0..count)
            .map(|index| UploadRecord {
                scenario: "Tile Frenzy".to_string(),
                score: index as f64,
                accuracy: 0.8,
                time_to_kill: 0.4,
                frame_rate: 240.0,
                stamina_index: 95.0,
                timestamp: Utc::now(),
            })
            .collect()
    }

    #[tokio::test]
    async fn splits_uploads_into_bounded_batches() {
        let records = upload_records(250);
        let calls = Arc::new(AtomicUsize::new(0));
        let call_counter = Arc::clone(&calls);

        let outcome = upload_in_batches(&records, 100, move |batch| {
            let call_counter = Arc::clone(&call_counter);
            async move {
                call_counter.fetch_add(1, Ordering::SeqCst);
                assert!(batch.len() <= 100);
                Ok(())
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.batches_sent, 3);
        assert_eq!(outcome.records_uploaded, 250);
        assert!(outcome.fully_synced());
    }

    #[tokio::test]
    async fn failed_batch_does_not_stop_later_batches() {
        let records = upload_records(250);
        let calls = Arc::new(AtomicUsize::new(0));
        let call_counter = Arc::clone(&calls);

        let outcome = upload_in_batches(&records, 100, move |_batch| {
            let call_counter = Arc::clone(&call_counter);
            async move {
                let call_index = call_counter.fetch_add(1, Ordering::SeqCst);
                if call_index == 1 {
                    Err("store unavailable".to_string())
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.batches_attempted, 3);
        assert_eq!(outcome.batches_sent, 2);
        assert_eq!(outcome.records_uploaded, 150);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].batch_index, 1);
        assert_eq!(outcome.failures[0].record_count, 100);
    }

    #[tokio::test]
    async fn empty_upload_is_a_no_op() {
        let outcome = upload_in_batches(&[], 100, |_batch| async { Ok(()) }).await;

        assert_eq!(outcome.batches_attempted, 0);
        assert!(outcome.fully_synced());
    }
}
