//! Configuration management for the Vesper assistant
//!
//! Settings come from a TOML file in the platform config directory, with
//! environment variables taking precedence for secrets and paths.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::interpreter::InterpreterConfig;
use crate::{Error, Result};

/// Environment variable holding the Gemini API key
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the data directory
const DATA_DIR_ENV: &str = "VESPER_DATA_DIR";

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Display name the assistant announces itself with
    pub assistant_name: String,

    /// Path to data directory (database, cache, etc)
    pub data_dir: PathBuf,

    /// Command interpreter timing
    pub interpreter: InterpreterSettings,

    /// AI query backend
    pub ai: AiSettings,

    /// Reminder due-check tick
    pub reminders: ReminderSettings,
}

/// Command interpreter timing settings
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct InterpreterSettings {
    /// Cool-down between accepted commands, in milliseconds
    pub cooldown_ms: u64,

    /// Best-effort pause after a control-signal dispatch, in milliseconds
    pub dispatch_delay_ms: u64,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            cooldown_ms: 1000,
            dispatch_delay_ms: 100,
        }
    }
}

/// AI query backend settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Gemini API key; usually supplied via `GEMINI_API_KEY`
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Ceiling on one query, in seconds
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-pro".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Reminder due-check settings
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    /// Seconds between due-reminder checks
    pub check_interval_secs: u64,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            check_interval_secs: 60,
        }
    }
}

/// On-disk layout of the config file; all sections optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    assistant_name: Option<String>,
    data_dir: Option<PathBuf>,
    interpreter: InterpreterSettings,
    ai: AiSettings,
    reminders: ReminderSettings,
}

impl Config {
    /// Load configuration from the default location
    ///
    /// Reads `config.toml` under the platform config directory if present,
    /// then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed, or if
    /// the data directory cannot be created
    pub fn load() -> Result<Self> {
        let dirs = project_dirs()?;
        let path = dirs.config_dir().join("config.toml");
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file path
    ///
    /// A missing file yields defaults; environment overrides still apply.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed, or if
    /// the data directory cannot be created
    pub fn load_from(path: &Path) -> Result<Self> {
        let file: ConfigFile = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            ConfigFile::default()
        };

        let mut ai = file.ai;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                ai.api_key = Some(key);
            }
        }

        let data_dir = std::env::var(DATA_DIR_ENV).map_or_else(
            |_| {
                file.data_dir.map_or_else(
                    || project_dirs().map(|d| d.data_dir().to_path_buf()),
                    Ok,
                )
            },
            |dir| Ok(PathBuf::from(dir)),
        )?;

        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            assistant_name: file.assistant_name.unwrap_or_else(|| "Vesper".to_string()),
            data_dir,
            interpreter: file.interpreter,
            ai,
            reminders: file.reminders,
        })
    }

    /// Timing knobs in the form the interpreter takes
    #[must_use]
    pub fn interpreter_config(&self) -> InterpreterConfig {
        InterpreterConfig {
            cooldown: Duration::from_millis(self.interpreter.cooldown_ms),
            dispatch_delay: Duration::from_millis(self.interpreter.dispatch_delay_ms),
            ai_timeout: Duration::from_secs(self.ai.timeout_secs),
        }
    }

    /// Path to the assistant database
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("vesper.db")
    }
}

/// Platform directories for config and data
fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "Vesper", "vesper")
        .ok_or_else(|| Error::Config("could not determine home directory".to_string()))
}
