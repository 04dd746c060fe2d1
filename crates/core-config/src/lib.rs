//! Editor configuration: typed settings plus optional `keyline.toml` loading.
//!
//! Two layers. [`EditorConfig`] is the validated, in-memory surface the
//! engine reads on every key press; its setters reject bad values
//! synchronously (never silently clamp). [`ConfigFile`] is the serde shape of
//! an optional TOML file; unknown fields are ignored so the format can evolve
//! without warnings, and a file that fails to parse falls back to defaults.
//! Values read from a file still pass through the same setters, so a file
//! cannot smuggle in state a setter would reject.
//!
//! Platform defaults mirror classic line-editor behavior: Ctrl-D is EOF
//! everywhere, Ctrl-Z is EOF only on Windows, Ctrl-C raises an interrupt only
//! on Unix (elsewhere it cancels the line in-band).

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("word-break character set must not be empty")]
    EmptyWordBreakSet,
}

/// Validated runtime configuration consumed by the line editor.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    word_break_chars: Vec<char>,
    pub ctrl_d_is_eof: bool,
    pub ctrl_z_is_eof: bool,
    pub ctrl_c_interrupts: bool,
    pub enter_duplicates: bool,
    /// History capacity; 0 means unbounded.
    pub history_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            word_break_chars: vec![' ', '\n'],
            ctrl_d_is_eof: true,
            ctrl_z_is_eof: cfg!(windows),
            ctrl_c_interrupts: !cfg!(windows),
            enter_duplicates: false,
            history_capacity: 0,
        }
    }
}

impl EditorConfig {
    pub fn word_break_chars(&self) -> &[char] {
        &self.word_break_chars
    }

    /// Replace the word-break set. An empty set is rejected, never clamped.
    pub fn set_word_break_chars(&mut self, chars: Vec<char>) -> Result<(), ConfigError> {
        if chars.is_empty() {
            return Err(ConfigError::EmptyWordBreakSet);
        }
        self.word_break_chars = chars;
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
// File layer
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct KeysSection {
    pub ctrl_d_eof: Option<bool>,
    pub ctrl_z_eof: Option<bool>,
    pub ctrl_c_interrupts: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct HistorySection {
    pub capacity: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LineSection {
    pub enter_duplicates: Option<bool>,
    pub word_break_chars: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub keys: KeysSection,
    #[serde(default)]
    pub history: HistorySection,
    #[serde(default)]
    pub line: LineSection,
}

/// Best-effort config path following platform conventions: a local
/// `keyline.toml` wins, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("keyline.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("keyline").join("keyline.toml");
    }
    PathBuf::from("keyline.toml")
}

/// Load configuration from `path` (or the discovered location). A missing or
/// unparseable file yields defaults; semantic errors in present values (e.g.
/// an empty word-break string) propagate.
pub fn load_from(path: Option<PathBuf>) -> Result<EditorConfig> {
    let path = path.unwrap_or_else(discover);
    let mut config = EditorConfig::default();
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(config);
    };
    let file = match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => file,
        Err(err) => {
            warn!(target: "config", file = %path.display(), %err, "config_parse_failed_using_defaults");
            return Ok(config);
        }
    };
    apply_file(&mut config, &file)?;
    info!(
        target: "config",
        file = %path.display(),
        history_capacity = config.history_capacity,
        ctrl_d_eof = config.ctrl_d_is_eof,
        ctrl_z_eof = config.ctrl_z_is_eof,
        ctrl_c_interrupts = config.ctrl_c_interrupts,
        "config_loaded"
    );
    Ok(config)
}

fn apply_file(config: &mut EditorConfig, file: &ConfigFile) -> Result<()> {
    if let Some(v) = file.keys.ctrl_d_eof {
        config.ctrl_d_is_eof = v;
    }
    if let Some(v) = file.keys.ctrl_z_eof {
        config.ctrl_z_is_eof = v;
    }
    if let Some(v) = file.keys.ctrl_c_interrupts {
        config.ctrl_c_interrupts = v;
    }
    if let Some(v) = file.history.capacity {
        config.history_capacity = v;
    }
    if let Some(v) = file.line.enter_duplicates {
        config.enter_duplicates = v;
    }
    if let Some(chars) = &file.line.word_break_chars {
        config.set_word_break_chars(chars.chars().collect())?;
    }
    Ok(())
}
