//! Ingestion and normalization engine for aim-trainer performance logs.
//!
//! Raw export files come in two incompatible, loosely-structured text
//! schemas: a per-event detailed log and a per-session summary table. This
//! crate classifies each file, extracts comparable metrics from either
//! schema, reconciles conflicting date sources, derives a stamina index
//! from per-kill timelines, and merges everything into per-scenario time
//! series ready for charting and remote sync.

pub mod classify;
pub mod extract;
pub mod ingest;
pub mod record;
pub mod series;
pub mod session_date;
pub mod settings;
pub mod stamina;
pub mod sync;
pub mod watch;

pub use classify::{classify_format, LogFormat};
pub use ingest::{IngestReport, SkipReason, SkipReport, StatIngestor};
pub use record::{RawFile, ScenarioRecord, UploadRecord};
pub use series::ScenarioSeries;
pub use settings::TrackerSettings;
pub use sync::{RemoteStoreClient, SyncOutcome, DEFAULT_UPLOAD_BATCH_SIZE};

/// Install the process-wide tracing subscriber. Call once at startup.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
