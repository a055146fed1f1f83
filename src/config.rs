//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. The `--config` command-line flag
//! 2. `$MAILEXTRACT_CONFIG` (environment variable)
//! 3. `~/.config/mailextract/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailextract\config.toml` (Windows)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Placeholders and limits used while extracting messages.
    pub extract: ExtractConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Placeholders substituted for unreadable fields, and output limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Written in place of a subject whose accessor failed.
    pub subject_sentinel: String,
    /// Written in place of a sender whose accessor failed.
    pub sender_sentinel: String,
    /// Written in the index for a missing or unreadable receipt time.
    pub date_sentinel: String,
    /// Body placeholder, used both for the snippet and the artifact body.
    pub body_sentinel: String,
    /// Maximum snippet length in characters.
    pub snippet_max_chars: usize,
    /// File name of the body inside each artifact directory.
    pub body_file_name: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            subject_sentinel: "[Unreadable Subject]".to_string(),
            sender_sentinel: "[Unreadable Sender]".to_string(),
            date_sentinel: "[Unreadable Date]".to_string(),
            body_sentinel: "[Unreadable Body]".to_string(),
            snippet_max_chars: 500,
            body_file_name: "body.html".to_string(),
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// `explicit` (from `--config`) wins over every other location. Returns the
/// default configuration if no file is found or on parse error.
pub fn load_config(explicit: Option<&Path>) -> Config {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config_file_path(),
    };

    if let Some(path) = path {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILEXTRACT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mailextract").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailextract")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("mailextract.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.extract.subject_sentinel, "[Unreadable Subject]");
        assert_eq!(cfg.extract.date_sentinel, "[Unreadable Date]");
        assert_eq!(cfg.extract.snippet_max_chars, 500);
        assert_eq!(cfg.extract.body_file_name, "body.html");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[extract]
snippet_max_chars = 80
date_sentinel = ""
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.extract.snippet_max_chars, 80);
        assert_eq!(cfg.extract.date_sentinel, "");
        // Other fields use defaults
        assert_eq!(cfg.extract.body_sentinel, "[Unreadable Body]");
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").unwrap();
        let cfg = load_config(Some(&path));
        assert_eq!(cfg.general.log_level, "debug");
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[extract\nsnippet_max_chars = ").unwrap();
        let cfg = load_config(Some(&path));
        assert_eq!(cfg.extract.snippet_max_chars, 500);
    }

    #[test]
    fn test_cache_dir_override() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/mx-cache"));
        assert_eq!(
            log_file_path(&cfg),
            PathBuf::from("/tmp/mx-cache/mailextract.log")
        );
    }
}
