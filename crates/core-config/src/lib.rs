//! Configuration loading and parsing.
//!
//! `Config` is an explicit value handed to `Document` construction; nothing
//! here is process-global. Parsing tolerates unknown fields and fills every
//! missing field with its default, so an empty (or absent) `scriv.toml`
//! yields the default configuration. Colors are packed RGBA integers, which
//! TOML expresses naturally as hex literals (`text = 0xFFFFFFFF`).

use serde::Deserialize;
use std::{fs, io, path::PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// UI palette, packed RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Colors {
    #[serde(default = "Colors::default_selection")]
    pub selection: u32,
    #[serde(default = "Colors::default_text")]
    pub text: u32,
    #[serde(default = "Colors::default_background")]
    pub background: u32,
    #[serde(default = "Colors::default_cursor")]
    pub cursor: u32,
    #[serde(default = "Colors::default_panels")]
    pub panels: u32,
    #[serde(default = "Colors::default_line_numbers")]
    pub line_numbers: u32,
}

impl Colors {
    const fn default_selection() -> u32 {
        0x5555_55FF
    }
    const fn default_text() -> u32 {
        0xFFFF_FFFF
    }
    const fn default_background() -> u32 {
        0x0000_0000
    }
    const fn default_cursor() -> u32 {
        0xFFFF_FFFF
    }
    const fn default_panels() -> u32 {
        0x9999_99FF
    }
    const fn default_line_numbers() -> u32 {
        0xBBBB_BBFF
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            selection: Self::default_selection(),
            text: Self::default_text(),
            background: Self::default_background(),
            cursor: Self::default_cursor(),
            panels: Self::default_panels(),
            line_numbers: Self::default_line_numbers(),
        }
    }
}

/// Undo/redo tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    /// Maximum live records kept, excluding the head sentinel.
    #[serde(default = "HistoryConfig::default_capacity")]
    pub capacity: usize,
    /// Two edits closer than this merge into one undo unit.
    #[serde(default = "HistoryConfig::default_squash_window_ms")]
    pub squash_window_ms: u64,
}

impl HistoryConfig {
    const fn default_capacity() -> usize {
        1024
    }
    const fn default_squash_window_ms() -> u64 {
        1000
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: Self::default_capacity(),
            squash_window_ms: Self::default_squash_window_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub colors: Colors,
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Best-effort config path: working-directory `scriv.toml` first, then the
/// platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("scriv.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("scriv").join("scriv.toml");
    }
    PathBuf::from("scriv.toml")
}

/// Load configuration from `path` (or the discovered location). A missing
/// file yields defaults; an unreadable or malformed file is an error.
pub fn load_from(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            info!(target: "config", path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}
