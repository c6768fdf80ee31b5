use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

use crate::sync::DEFAULT_UPLOAD_BATCH_SIZE;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSettings {
    pub stats_folder: String,
    pub server_url: String,
    pub upload_batch_size: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            stats_folder: default_stats_folder(),
            server_url: String::new(),
            upload_batch_size: DEFAULT_UPLOAD_BATCH_SIZE,
        }
    }
}

impl TrackerSettings {
    /// Load settings, falling back to defaults when no file exists yet.
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw_json = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(error) => {
                return Err(format!(
                    "Failed to read settings '{}': {error}",
                    path.display()
                ));
            }
        };

        serde_json::from_str(&raw_json)
            .map_err(|error| format!("Failed to parse settings '{}': {error}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent_directory) = path.parent() {
            std::fs::create_dir_all(parent_directory).map_err(|error| {
                format!(
                    "Failed to create settings directory '{}': {error}",
                    parent_directory.display()
                )
            })?;
        }

        let serialized = serde_json::to_string_pretty(self)
            .map_err(|error| format!("Failed to serialize settings: {error}"))?;

        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write settings '{}': {error}", path.display()))
    }
}

fn default_stats_folder() -> String {
    let home_directory = std::env::var("USERPROFILE")
        .or_else(|_| std::env::var("HOME"))
        .unwrap_or_default();

    Path::new(&home_directory)
        .join("Documents")
        .join("AimTrainer")
        .join("stats")
        .to_string_lossy()
        .to_string()
}
