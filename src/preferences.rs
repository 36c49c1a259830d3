//! Preference manager that merges config.toml defaults with stored overrides.
//!
//! Config values serve as defaults; rows in `user_preferences` override them.
//! Writes always go to the database, never to the config file.
use std::collections::HashMap;

use anyhow::Result;

use crate::config::Config;
use crate::storage::Database;

/// Key under which the chosen theme is stored.
pub const THEME_KEY: &str = "theme";

// ============================================================================
// PreferenceManager
// ============================================================================

/// Merged preference view: config defaults with database values layered on top.
#[derive(Debug, Clone)]
pub struct PreferenceManager {
    prefs: HashMap<String, String>,
}

impl PreferenceManager {
    /// Flatten `config`, then overlay every stored preference.
    pub async fn load(config: &Config, db: &Database) -> Result<Self> {
        let mut prefs = Self::flatten_config(config);
        for (key, value) in db.get_preferences_by_prefix("").await? {
            prefs.insert(key, value);
        }
        Ok(Self { prefs })
    }

    /// Config only. Used when the database cannot be read.
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefs: Self::flatten_config(config),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.prefs.get(key).map(String::as_str)
    }

    /// Persist `value` and update the in-memory view.
    pub async fn set(&mut self, db: &Database, key: &str, value: &str) -> Result<()> {
        db.set_preference(key, value).await?;
        self.prefs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    // ========================================================================
    // Typed Accessors
    // ========================================================================

    pub fn theme_variant(&self) -> &str {
        self.get(THEME_KEY).unwrap_or("dark")
    }

    pub fn columns(&self) -> usize {
        self.get("columns")
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5)
    }

    pub fn history_limit(&self) -> usize {
        self.get("history_limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10)
    }

    /// Keybinding overrides as (action, key string).
    pub fn keybindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefs.iter().filter_map(|(k, v)| {
            k.strip_prefix("keybind.")
                .map(|action| (action, v.as_str()))
        })
    }

    fn flatten_config(config: &Config) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(THEME_KEY.to_string(), config.theme.clone());
        map.insert("columns".to_string(), config.columns.to_string());
        map.insert(
            "history_limit".to_string(),
            config.history_limit.to_string(),
        );
        for (action, key_str) in &config.keybindings {
            map.insert(format!("keybind.{}", action), key_str.clone());
        }
        map
    }
}

// ============================================================================
// Tests
// ============================================================================
