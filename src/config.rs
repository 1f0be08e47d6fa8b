//! JSON Configuration File Support
//!
//! The console reads one JSON file (by default `config.json` in the working
//! directory). Key names follow the file format the server tooling already
//! uses, which is why they mix camelCase and snake_case.
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "dispatchUrl": "http://127.0.0.1:443",
//!   "adminKey": "secret",
//!   "playerUid": "10001",
//!   "autosaverEnable": true,
//!   "database_file": "./data/danheng.db",
//!   "autosave_file": "./backup",
//!   "intervalSeconds": 300,
//!   "slotCount": 5,
//!   "console": { "animationDelayMs": 6, "pollIntervalMs": 5, "prompt": "> " }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::actor::{CaptureConfig, ConsoleConfig, PublisherConfig};
use crate::error::ConfigError;
use crate::snapshot::SnapshotConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

fn default_player_uid() -> String {
    "10001".to_string()
}

const fn default_interval_seconds() -> u64 {
    300
}

const fn default_slot_count() -> u32 {
    5
}

/// Longest accepted snapshot interval: one week.
pub const MAX_INTERVAL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Longest accepted keyboard poll interval.
pub const MAX_POLL_INTERVAL_MS: u64 = 1_000;

/// Terminal tuning section.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsoleSection {
    /// Pause after every third typed character, in milliseconds.
    pub animation_delay_ms: u64,
    /// Keyboard poll interval, in milliseconds.
    pub poll_interval_ms: u64,
    /// Prompt marker.
    pub prompt: String,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            animation_delay_ms: 6,
            poll_interval_ms: 5,
            prompt: String::from("> "),
        }
    }
}

/// Top-level configuration file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Base URL of the server's dispatch endpoint.
    pub dispatch_url: String,

    /// Admin key used to authorize sessions.
    pub admin_key: String,

    /// Player that commands target.
    #[serde(default = "default_player_uid")]
    pub player_uid: String,

    /// Whether the snapshot worker runs.
    #[serde(default)]
    pub autosaver_enable: bool,

    /// File to snapshot.
    #[serde(rename = "database_file", default)]
    pub database_file: Option<PathBuf>,

    /// Directory holding the snapshot slots.
    #[serde(rename = "autosave_file", default)]
    pub autosave_file: Option<PathBuf>,

    /// Seconds between snapshots.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Number of rotating snapshot slots.
    #[serde(default = "default_slot_count")]
    pub slot_count: u32,

    /// Terminal tuning.
    #[serde(default)]
    pub console: ConsoleSection,
}

impl AppConfig {
    /// Read, parse and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_seconds == 0 || self.interval_seconds > MAX_INTERVAL_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "intervalSeconds must be between 1 and {MAX_INTERVAL_SECONDS}, got {}",
                self.interval_seconds
            )));
        }
        if self.slot_count == 0 {
            return Err(ConfigError::Invalid(
                "slotCount must be greater than zero".to_string(),
            ));
        }
        if self.console.poll_interval_ms == 0 || self.console.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "console.pollIntervalMs must be between 1 and {MAX_POLL_INTERVAL_MS}, got {}",
                self.console.poll_interval_ms
            )));
        }
        if self.console.prompt.is_empty() {
            return Err(ConfigError::Invalid(
                "console.prompt cannot be empty".to_string(),
            ));
        }
        if self.autosaver_enable && (self.database_file.is_none() || self.autosave_file.is_none()) {
            return Err(ConfigError::Invalid(
                "autosaverEnable requires database_file and autosave_file".to_string(),
            ));
        }
        Ok(())
    }

    /// Terminal engine settings.
    pub fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig {
            publisher: PublisherConfig {
                animation_delay: Duration::from_millis(self.console.animation_delay_ms),
                ..PublisherConfig::default()
            },
            capture: CaptureConfig {
                poll_interval: Duration::from_millis(self.console.poll_interval_ms),
                prompt: self.console.prompt.clone(),
            },
        }
    }

    /// Snapshot worker settings, if the worker is enabled.
    pub fn snapshot_config(&self) -> Option<SnapshotConfig> {
        if !self.autosaver_enable {
            return None;
        }
        Some(SnapshotConfig {
            source: self.database_file.clone()?,
            root: self.autosave_file.clone()?,
            interval: Duration::from_secs(self.interval_seconds),
            slot_count: self.slot_count,
            save_immediately: true,
        })
    }
}
