//! Engine configuration persistence
//!
//! Stores user preferences in `~/.config/parsehl/config.yaml`

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Engine settings that persist across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Extractor pool size; `None` uses the hardware parallelism
    #[serde(default)]
    pub worker_count: Option<usize>,
    /// Syntax used when none can be detected from the file name
    #[serde(default = "default_syntax")]
    pub default_syntax: String,
    /// Delay before a scheduled re-parse starts (see `HighlightScheduler::from_config`)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_syntax() -> String {
    "rust".to_string()
}

fn default_debounce_ms() -> u64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            default_syntax: default_syntax(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl EngineConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Worker count to use, resolving `None` to the hardware parallelism
    pub fn effective_worker_count(&self) -> usize {
        self.worker_count
            .filter(|&n| n > 0)
            .unwrap_or_else(crate::syntax::default_worker_count)
    }
}
