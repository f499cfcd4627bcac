//! Configuration loading and management
//!
//! Handles parsing of `.procdesk.toml` configuration files.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_FILENAME: &str = ".procdesk.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Suggestion service configuration
    #[serde(default)]
    pub suggest: SuggestConfig,

    /// Record numbering and seeding
    #[serde(default)]
    pub records: RecordsConfig,

    /// Defaults for suggested tasks
    #[serde(default)]
    pub tasks: TasksConfig,
}

/// Suggestion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API credential
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Upper bound on a single request, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Record numbering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Prefix for defect ids (`DEF-001`)
    #[serde(default = "default_defect_prefix")]
    pub defect_prefix: String,

    /// Prefix for candidate ids (`CAN-001`)
    #[serde(default = "default_candidate_prefix")]
    pub candidate_prefix: String,

    /// Zero-padded width of the numeric id part
    #[serde(default = "default_id_width")]
    pub id_width: usize,

    /// Load the mock records on startup
    #[serde(default = "default_true")]
    pub seed: bool,
}

fn default_defect_prefix() -> String {
    "DEF".to_string()
}

fn default_candidate_prefix() -> String {
    "CAN".to_string()
}

fn default_id_width() -> usize {
    3
}

fn default_true() -> bool {
    true
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            defect_prefix: default_defect_prefix(),
            candidate_prefix: default_candidate_prefix(),
            id_width: default_id_width(),
            seed: default_true(),
        }
    }
}

/// Defaults applied to suggested tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Due date offset when the service leaves it out
    #[serde(default = "default_offset_days")]
    pub default_offset_days: u32,

    /// Owner for defect tasks without one
    #[serde(default = "default_defect_owner")]
    pub defect_owner: String,

    /// Owner for hiring tasks without one
    #[serde(default = "default_recruitment_owner")]
    pub recruitment_owner: String,
}

fn default_offset_days() -> u32 {
    2
}

fn default_defect_owner() -> String {
    "Unassigned".to_string()
}

fn default_recruitment_owner() -> String {
    "Recruiter".to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_offset_days: default_offset_days(),
            defect_owner: default_defect_owner(),
            recruitment_owner: default_recruitment_owner(),
        }
    }
}

impl Config {
    /// Load configuration from a `.procdesk.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration for a CLI run.
    ///
    /// An explicit path must load cleanly. Otherwise the working directory is
    /// tried first, then the user config directory; a broken file found there
    /// is skipped with a warning.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        for candidate in search_paths(cwd) {
            if !candidate.exists() {
                continue;
            }
            match Self::load(&candidate) {
                Ok(config) => {
                    tracing::debug!(path = %candidate.display(), "loaded config");
                    return Ok(config);
                }
                Err(err) => {
                    tracing::warn!(path = %candidate.display(), error = %err, "ignoring invalid config");
                }
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.suggest.validate()?;
        self.records.validate()?;
        self.tasks.validate()?;
        Ok(())
    }
}

fn search_paths(cwd: &Path) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(CONFIG_FILENAME)];
    if let Some(dirs) = ProjectDirs::from("", "", "procdesk") {
        paths.push(dirs.config_dir().join("config.toml"));
    }
    paths
}

impl SuggestConfig {
    fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "suggest.model cannot be empty".to_string(),
            ));
        }
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "suggest.base_url must be an http(s) URL, got '{base_url}'"
            )));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "suggest.api_key_env cannot be empty".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "suggest.timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl RecordsConfig {
    fn validate(&self) -> Result<()> {
        for (field, prefix) in [
            ("records.defect_prefix", &self.defect_prefix),
            ("records.candidate_prefix", &self.candidate_prefix),
        ] {
            let prefix = prefix.trim();
            if prefix.is_empty() {
                return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
            }
            if !prefix.chars().all(|ch| ch.is_ascii_alphanumeric()) {
                return Err(Error::InvalidConfig(format!(
                    "{field} must be alphanumeric"
                )));
            }
        }
        if self.defect_prefix.trim() == self.candidate_prefix.trim() {
            return Err(Error::InvalidConfig(
                "records.defect_prefix and records.candidate_prefix must differ".to_string(),
            ));
        }
        if !(1..=9).contains(&self.id_width) {
            return Err(Error::InvalidConfig(
                "records.id_width must be between 1 and 9".to_string(),
            ));
        }
        Ok(())
    }
}

impl TasksConfig {
    fn validate(&self) -> Result<()> {
        if self.defect_owner.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "tasks.defect_owner cannot be empty".to_string(),
            ));
        }
        if self.recruitment_owner.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "tasks.recruitment_owner cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
