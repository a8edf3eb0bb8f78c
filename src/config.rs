/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete.

use std::path::PathBuf;

use log::{info, warn};
use serde::Deserialize;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayConfig {
    /// Pixels per level unit.
    pub scale: f64,
    pub speed: SpeedConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    /// Demo host: level units the player walks per tick.
    pub walk_speed: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig::from_toml(TomlConfig::default())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    speed: TomlSpeed,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_scale")]
    scale: f64,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_walk_speed")]
    walk_speed: f64,
}

// ── Defaults ──

fn default_scale() -> f64 { 16.0 }
fn default_tick_rate() -> u64 { 50 }
fn default_walk_speed() -> f64 { 0.25 }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { scale: default_scale() }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            walk_speed: default_walk_speed(),
        }
    }
}

// ── Loading ──

impl DisplayConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys fall back to defaults.
    pub fn load() -> Self {
        DisplayConfig::from_toml(load_toml(&candidate_dirs()))
    }

    /// Parse config text. Parse errors fall back to defaults.
    pub fn from_str_or_default(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => DisplayConfig::from_toml(cfg),
            Err(e) => {
                warn!("config.toml parse error: {e}; using default settings");
                DisplayConfig::default()
            }
        }
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let scale = if cfg.display.scale > 0.0 {
            cfg.display.scale
        } else {
            warn!("display.scale must be positive, got {}; using {}", cfg.display.scale, default_scale());
            default_scale()
        };
        DisplayConfig {
            scale,
            speed: SpeedConfig {
                tick_rate_ms: cfg.speed.tick_rate_ms.max(1),
                walk_speed: cfg.speed.walk_speed,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    info!("loaded {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    warn!("config.toml parse error: {e}; using default settings");
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                warn!("could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}
