use crate::errors::AppResult;
use crate::models::NotificationPreferences;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerSettings {
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub seed_sample_data: bool,
    pub notification_preferences: NotificationPreferences,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
            seed_sample_data: false,
            notification_preferences: NotificationPreferences::default(),
        }
    }
}

impl TrackerSettings {
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "settings file missing; using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&raw)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
