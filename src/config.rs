use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const APP_DIR_NAME: &str = "engagement-wizard";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tui: TuiConfig,
    pub data: DataConfig,
    pub wizard: WizardConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

/// Where wizard snapshots are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceBackend {
    /// Snapshot files under `<data_dir>/wizards`, survives restarts
    #[default]
    File,
    /// Process-local only
    Memory,
}

/// Wizard behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub persistence: PersistenceBackend,
    /// Storage key for the project creation snapshot.
    pub persistence_key: String,
    /// Resume an abandoned wizard on start.
    pub resume: bool,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 50 }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            persistence: PersistenceBackend::File,
            persistence_key: "project-create".to_string(),
            resume: true,
        }
    }
}

/// Where the loaded configuration came from. Reported once logging is up,
/// since loading happens before the subscriber is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// No file, defaults in effect
    Missing(PathBuf),
    /// File present but unreadable or unparseable, defaults in effect
    Invalid { path: PathBuf, error: String },
}

impl ConfigOrigin {
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => log::info!("Loaded config from {}", path.display()),
            ConfigOrigin::Missing(path) => {
                log::debug!("No config file at {}, using defaults", path.display())
            }
            ConfigOrigin::Invalid { path, error } => log::warn!(
                "Failed to parse config at {}: {error}, using defaults",
                path.display()
            ),
        }
    }

    /// User-facing warning for a config file that was ignored.
    pub fn warning(&self) -> Option<String> {
        match self {
            ConfigOrigin::Invalid { path, error } => Some(format!(
                "warning: ignored config {} ({error}), defaults were used",
                path.display()
            )),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/engagement-wizard/config.toml`.
    /// Falls back to `Default` if the file is missing or unparseable.
    pub fn load() -> (Self, ConfigOrigin) {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path with the same fallbacks.
    pub fn load_from(config_path: &Path) -> (Self, ConfigOrigin) {
        let path = config_path.to_path_buf();
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, ConfigOrigin::File(path)),
                Err(e) => (
                    Self::default(),
                    ConfigOrigin::Invalid {
                        path,
                        error: e.to_string(),
                    },
                ),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                (Self::default(), ConfigOrigin::Missing(path))
            }
            Err(e) => (
                Self::default(),
                ConfigOrigin::Invalid {
                    path,
                    error: e.to_string(),
                },
            ),
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    /// Directory holding wizard snapshot files.
    pub fn snapshot_dir(&self) -> PathBuf {
        self.data_dir().join("wizards")
    }

    /// JSON file backing the local project registry.
    pub fn projects_path(&self) -> PathBuf {
        self.data_dir().join("projects.json")
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR_NAME).join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
