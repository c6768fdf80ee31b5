use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ingest::StatIngestor;
use crate::record::RawFile;

struct WatchState {
    handle: Option<JoinHandle<()>>,
    stats_folder: PathBuf,
}

lazy_static::lazy_static! {
    static ref WATCH_STATE: Arc<Mutex<Option<WatchState>>> = Arc::new(Mutex::new(None));
}

/// Start watching a stats export folder and auto-ingest new export files.
pub async fn start_stats_watch(ingestor: StatIngestor, stats_folder: String) -> Result<(), String> {
    let mut state = WATCH_STATE.lock().map_err(|error| error.to_string())?;

    if state.is_some() {
        return Err("Stats watch already running".to_string());
    }

    let folder = PathBuf::from(stats_folder.trim());
    if !folder.is_dir() {
        return Err(format!(
            "Stats folder not found at '{}'",
            folder.to_string_lossy()
        ));
    }

    let watch_folder = folder.clone();
    let handle = tokio::spawn(async move {
        if let Err(error) = watch_stats_folder(ingestor, &watch_folder).await {
            tracing::error!("Stats folder watcher stopped: {error}");
        }
    });

    *state = Some(WatchState {
        handle: Some(handle),
        stats_folder: folder,
    });

    Ok(())
}

pub async fn stop_stats_watch() -> Result<(), String> {
    let mut state = WATCH_STATE.lock().map_err(|error| error.to_string())?;

    if let Some(watch_state) = state.take() {
        if let Some(handle) = watch_state.handle.as_ref() {
            handle.abort();
        }
        tracing::info!(
            stats_folder = %watch_state.stats_folder.display(),
            "Stats folder watch stopped"
        );
    }

    Ok(())
}

/// True when the path holds at least one recognizable export file.
pub fn validate_stats_folder(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }

    match find_latest_export_path(path) {
        Ok(export_path) => export_path.is_some(),
        Err(_) => false,
    }
}

fn is_export_file_name(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".csv")
}

/// Most recently modified export file in the folder, if any.
pub fn find_latest_export_path(stats_folder: &str) -> Result<Option<PathBuf>, String> {
    let folder = Path::new(stats_folder);
    let directory_entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(error) => {
            if folder.exists() {
                return Err(error.to_string());
            }
            return Ok(None);
        }
    };

    let mut latest_match: Option<(SystemTime, PathBuf)> = None;

    for entry_result in directory_entries {
        let entry = entry_result.map_err(|error| error.to_string())?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !is_export_file_name(file_name) {
            continue;
        }

        let modified_time = entry
            .metadata()
            .and_then(|metadata| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        if latest_match
            .as_ref()
            .map(|(latest_time, _)| modified_time > *latest_time)
            .unwrap_or(true)
        {
            latest_match = Some((modified_time, path));
        }
    }

    Ok(latest_match.map(|(_, path)| path))
}

async fn watch_stats_folder(ingestor: StatIngestor, stats_folder: &Path) -> Result<(), String> {
    let (notify_sender, mut notify_receiver) =
        mpsc::unbounded_channel::<Result<Event, notify::Error>>();

    let mut watcher = notify::recommended_watcher(move |result| {
        if notify_sender.send(result).is_err() {
            tracing::debug!("Stats watcher notification receiver dropped");
        }
    })
    .map_err(|error| error.to_string())?;

    watcher
        .watch(stats_folder, RecursiveMode::NonRecursive)
        .map_err(|error| error.to_string())?;

    while let Some(notification_result) = notify_receiver.recv().await {
        match notification_result {
            Ok(event) => {
                for path in export_paths_from_event(&event) {
                    if let Err(error) = ingest_export_file(&ingestor, &path).await {
                        tracing::warn!(
                            export_path = %path.display(),
                            ingest_error = %error,
                            "Failed to ingest new export file"
                        );
                    }
                }
            }
            Err(error) => {
                tracing::warn!("Stats folder watcher error: {error}");
            }
        }
    }

    Ok(())
}

fn export_paths_from_event(event: &Event) -> Vec<PathBuf> {
    let relevant_kind = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_));
    if !relevant_kind {
        return Vec::new();
    }

    event
        .paths
        .iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(is_export_file_name)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

async fn ingest_export_file(ingestor: &StatIngestor, path: &Path) -> Result<(), String> {
    let contents = std::fs::read_to_string(path).map_err(|error| error.to_string())?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let report = ingestor
        .ingest(vec![RawFile::new(file_name.clone(), contents)])
        .await;

    tracing::info!(
        file_name = %file_name,
        records_ingested = report.ingested,
        "Auto-ingested export file"
    );

    Ok(())
}
