//! Configuration file parser for ~/.config/nami/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning for each one so
//! typos do not go unnoticed.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::layout::PageMetrics;
use crate::nav::SpyConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Masonry column count for the explore grid and galleries.
    pub columns: usize,

    /// How many reference images the remix history remembers.
    pub history_limit: usize,

    pub layout: LayoutConfig,

    pub scroll_spy: ScrollSpyConfig,

    pub catalog: CatalogConfig,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            columns: 5,
            history_limit: 10,
            layout: LayoutConfig::default(),
            scroll_spy: ScrollSpyConfig::default(),
            catalog: CatalogConfig::default(),
            keybindings: HashMap::new(),
        }
    }
}

/// Page chrome and block sizes, in page pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub header_height: f64,
    pub tab_bar_height: f64,
    pub activation_buffer: f64,
    pub section_title_height: f64,
    pub grid_gap: f64,
    pub featured_height: f64,
    /// Page pixels per terminal row.
    pub px_per_row: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            header_height: 72.0,
            tab_bar_height: 56.0,
            activation_buffer: 22.0,
            section_title_height: 60.0,
            grid_gap: 8.0,
            featured_height: 240.0,
            px_per_row: 24.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrollSpyConfig {
    /// Spy updates are ignored for this long after a programmatic jump.
    pub quiet_period_ms: u64,
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 500,
        }
    }
}

/// Knobs for the simulated catalog backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Simulated latency of `fetch_home_data`.
    pub latency_ms: u64,
    pub home_sections: usize,
    pub items_per_section: usize,
    pub category_page_items: usize,
    /// Reject every fetch.
    pub fail: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            latency_ms: 400,
            home_sections: 5,
            items_per_section: 16,
            category_page_items: 30,
            fail: false,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "theme",
        "columns",
        "history_limit",
        "layout",
        "scroll_spy",
        "catalog",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        if config.columns == 0 {
            tracing::warn!("columns = 0 is not usable, falling back to 1");
            config.columns = 1;
        }
        tracing::info!(
            path = %path.display(),
            theme = %config.theme,
            columns = config.columns,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn spy_config(&self) -> SpyConfig {
        SpyConfig {
            header_height: self.layout.header_height,
            tab_bar_height: self.layout.tab_bar_height,
            activation_buffer: self.layout.activation_buffer,
            quiet_period: Duration::from_millis(self.scroll_spy.quiet_period_ms),
        }
    }

    pub fn page_metrics(&self) -> PageMetrics {
        PageMetrics::from_config(&self.layout)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("nami_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, "dark");
        assert_eq!(config.columns, 5);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.scroll_spy.quiet_period_ms, 500);
        assert_eq!(config.catalog.latency_ms, 400);
        assert!(!config.catalog.fail);
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_default_offsets() {
        let spy = Config::default().spy_config();
        assert_eq!(spy.fixed_offset(), 128.0);
        assert_eq!(spy.activation_offset(), 150.0);
        assert_eq!(spy.quiet_period, Duration::from_millis(500));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/nami_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.columns, 5);
        cleanup(&path);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let path = write_config(
            "partial",
            "columns = 3\n[layout]\nheader_height = 80.0\n[catalog]\nfail = true\n",
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.columns, 3);
        assert_eq!(config.layout.header_height, 80.0);
        assert_eq!(config.layout.tab_bar_height, 56.0);
        assert!(config.catalog.fail);
        assert_eq!(config.catalog.items_per_section, 16);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
theme = "light"
columns = 4
history_limit = 3

[scroll_spy]
quiet_period_ms = 800

[catalog]
latency_ms = 50
home_sections = 2

[keybindings]
quit = "Ctrl+q"
retry = "F5"
"#;
        let path = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "light");
        assert_eq!(config.history_limit, 3);
        assert_eq!(
            config.spy_config().quiet_period,
            Duration::from_millis(800)
        );
        assert_eq!(config.catalog.latency_ms, 50);
        assert_eq!(config.catalog.home_sections, 2);
        assert_eq!(
            config.keybindings.get("retry").map(String::as_str),
            Some("F5")
        );
        cleanup(&path);
    }

    #[test]
    fn test_zero_columns_clamped() {
        let path = write_config("zero_columns", "columns = 0\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.columns, 1);
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "theme = \"dark\"\nmystery = 42\n");
        assert_eq!(Config::load(&path).unwrap().theme, "dark");
        cleanup(&path);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let path = write_config("wrongtype", "columns = \"five\"\n");
        assert!(Config::load(&path).is_err());
        cleanup(&path);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }
}
