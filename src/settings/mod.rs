//! Stored preferences keyed by the descriptor's message keys
//! Seeded from toggle defaults, updated by submitted config-page payloads

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::descriptor::SettingsPage;

/// A persisted preference value. Toggles store booleans; text is kept for
/// forward compatibility with host payloads that carry string settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Text(String),
}

impl std::fmt::Display for PrefValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefValue::Bool(b) => write!(f, "{}", b),
            PrefValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Preferences {
    #[serde(default)]
    pub values: BTreeMap<String, PrefValue>,
}

impl Preferences {
    /// Get the preference file path
    fn store_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("clayform");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("settings.toml"))
    }

    /// Seed every message key on the page with its declared default
    pub fn defaults(page: &SettingsPage) -> Self {
        let values = page
            .toggles()
            .iter()
            .map(|t| (t.message_key.to_string(), PrefValue::Bool(t.default_value)))
            .collect();
        Preferences { values }
    }

    /// Load stored preferences, or fall back to the page defaults
    pub fn load(page: &SettingsPage) -> Result<Self> {
        let path = match Self::store_path() {
            Ok(p) => p,
            Err(_) => return Ok(Self::defaults(page)),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str::<Preferences>(&content) {
                    Ok(mut prefs) => {
                        // Keys added to the page since the last save still
                        // need their defaults
                        for toggle in page.toggles() {
                            prefs
                                .values
                                .entry(toggle.message_key.to_string())
                                .or_insert(PrefValue::Bool(toggle.default_value));
                        }
                        return Ok(prefs);
                    }
                    Err(e) => tracing::warn!("Failed to parse preferences: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read preferences: {}", e),
            }
        }

        let prefs = Self::defaults(page);
        let _ = prefs.save();
        Ok(prefs)
    }

    /// Save preferences to the store file
    pub fn save(&self) -> Result<()> {
        let path = Self::store_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply a submitted payload: a JSON object mapping message keys to
    /// values. Keys missing from the descriptor are rejected, as are values
    /// whose type disagrees with the declaring element.
    pub fn apply(&mut self, page: &SettingsPage, payload: &serde_json::Value) -> Result<usize> {
        let object = payload
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("Submitted payload is not a JSON object"))?;

        // Validate the whole payload before touching the stored values, so a
        // bad entry never leaves a partial update behind
        let toggles = page.toggles();
        let mut checked = Vec::with_capacity(object.len());
        for (key, value) in object {
            let Some(toggle) = toggles.iter().find(|t| t.message_key == key.as_str()) else {
                anyhow::bail!("Unknown message key: {}", key);
            };

            match value {
                serde_json::Value::Bool(b) => checked.push((toggle.message_key, *b)),
                other => anyhow::bail!(
                    "Message key {} expects a boolean, got {}",
                    key,
                    other
                ),
            }
        }

        let applied = checked.len();
        for (key, value) in checked {
            self.values.insert(key.to_string(), PrefValue::Bool(value));
        }

        tracing::info!("Applied {} setting(s)", applied);
        Ok(applied)
    }

    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.values.get(key)
    }

    /// Store a single value, checking the key against the descriptor
    pub fn set(&mut self, page: &SettingsPage, key: &str, raw: &str) -> Result<()> {
        if !page.toggles().iter().any(|t| t.message_key == key) {
            anyhow::bail!("Unknown message key: {}", key);
        }
        let value = match raw {
            "true" => PrefValue::Bool(true),
            "false" => PrefValue::Bool(false),
            _ => anyhow::bail!("Message key {} expects true or false, got {:?}", key, raw),
        };
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
