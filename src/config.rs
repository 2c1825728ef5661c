//! Run configuration: tape size, end-of-input policy and step budget.
//!
//! The library only consumes a [`RunConfig`] value. Loading one from the
//! environment or the user's `bf.toml` is a convenience for the binaries.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use cross_xdg::BaseDirs;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Default number of tape cells.
pub const DEFAULT_MEMORY_SIZE: usize = 30_000;

/// Byte stored by `,` under [`EofPolicy::Sentinel`].
pub const EOF_SENTINEL: u8 = 255;

/// What `,` does once the input is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EofPolicy {
    /// Store 255 in the current cell and continue.
    #[default]
    Sentinel,
    /// Store 0 in the current cell and continue.
    Zero,
    /// Fail with [`InputExhausted`](crate::BrainfuckError::InputExhausted).
    Error,
}

impl FromStr for EofPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentinel" | "255" | "-1" => Ok(EofPolicy::Sentinel),
            "zero" | "0" => Ok(EofPolicy::Zero),
            "error" | "fail" => Ok(EofPolicy::Error),
            _ => Err(ConfigError::InvalidEofPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for EofPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EofPolicy::Sentinel => write!(f, "sentinel"),
            EofPolicy::Zero => write!(f, "zero"),
            EofPolicy::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub memory_size: usize,
    pub eof: EofPolicy,
    pub max_steps: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            eof: EofPolicy::default(),
            max_steps: None,
        }
    }
}

impl RunConfig {
    pub fn with_memory(mut self, memory_size: usize) -> Result<Self, ConfigError> {
        if memory_size == 0 {
            return Err(ConfigError::ZeroMemory);
        }
        self.memory_size = memory_size;
        Ok(self)
    }

    pub fn with_eof(mut self, eof: EofPolicy) -> Self {
        self.eof = eof;
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Defaults, overlaid with `~/.config/bf.toml`, overlaid with `BF_*` variables.
    ///
    /// A malformed config file is reported and skipped; malformed environment
    /// variables are errors since they were set deliberately.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(content) = read_config_file() {
            match cfg.clone().apply_toml(&content) {
                Ok(updated) => cfg = updated,
                Err(e) => warn!(error = %e, "ignoring invalid bf.toml"),
            }
        }
        cfg.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply keys from the `[run]` section of a `bf.toml` document.
    pub fn apply_toml(self, content: &str) -> Result<Self, ConfigError> {
        let map = parse_section(content, "run");
        self.apply_pairs(|key| map.get(key).cloned())
    }

    /// Apply `BF_MEMORY`, `BF_EOF` and `BF_MAX_STEPS` from `lookup`.
    pub fn apply_env<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.apply_pairs(|key| match key {
            "memory" => lookup("BF_MEMORY"),
            "eof" => lookup("BF_EOF"),
            "max_steps" => lookup("BF_MAX_STEPS"),
            _ => None,
        })
    }

    fn apply_pairs<F>(mut self, get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("memory") {
            self = self.with_memory(parse_number("memory", &v)?)?;
        }
        if let Some(v) = get("eof") {
            self.eof = v.parse()?;
        }
        if let Some(v) = get("max_steps") {
            self.max_steps = Some(parse_number("max_steps", &v)?);
        }
        Ok(self)
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .replace('_', "")
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { key, value: value.to_string() })
}

fn read_config_file() -> Option<String> {
    // On Linux: resolves to /home/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");

    let content = fs::read_to_string(&path).ok()?;
    debug!(path = %path.display(), "loaded config file");
    Some(content)
}

/// Very small hand-rolled reader: `key = value` pairs under `[section]`.
/// Values may be quoted; `#` starts a comment line.
fn parse_section(content: &str, section: &str) -> HashMap<String, String> {
    let mut in_section = false;
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line[1..line.len() - 1].trim() == section;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, raw)) = line.split_once('=') {
            let raw = raw.trim();
            let val = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            map.insert(key.trim().to_string(), val.to_string());
        }
    }
    map
}
