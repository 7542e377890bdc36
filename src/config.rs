//! Marker configuration
//!
//! Stored in `~/.config/defmark/config.yaml`. Each field is validated on its
//! own: a bad value is reported and replaced by that field's default while
//! the rest of the file still applies.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::DefmarkError;
use crate::event::RefreshEvent;

const AUTO_ENABLE: &str = "auto_enable";
const REFRESH_EVENTS: &str = "refresh_events";
const DEBOUNCE_MS: &str = "debounce_ms";

/// Accepted spellings per field; the first is the one written by `save`
const AUTO_ENABLE_KEYS: &[&str] = &[AUTO_ENABLE, "autoEnable"];
const REFRESH_EVENTS_KEYS: &[&str] = &[REFRESH_EVENTS, "refreshEvents"];
const DEBOUNCE_MS_KEYS: &[&str] = &[DEBOUNCE_MS, "debounceMs"];

/// Settings read once at setup and mutable afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Enable markers automatically when a matching buffer is entered
    #[serde(default = "default_auto_enable", alias = "autoEnable")]
    pub auto_enable: bool,
    /// Edit events that trigger a refresh, in order, without duplicates
    #[serde(default = "default_refresh_events", alias = "refreshEvents")]
    pub refresh_events: Vec<RefreshEvent>,
    /// Quiet period before a refresh runs; 0 refreshes inline
    #[serde(default = "default_debounce_ms", alias = "debounceMs")]
    pub debounce_ms: u64,
}

fn default_auto_enable() -> bool {
    true
}

fn default_refresh_events() -> Vec<RefreshEvent> {
    RefreshEvent::ALL.to_vec()
}

fn default_debounce_ms() -> u64 {
    30
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            auto_enable: default_auto_enable(),
            refresh_events: default_refresh_events(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl PluginConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        let (config, warnings) = Self::load_from(&path);
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        config
    }

    /// Load from a specific file. Missing files yield defaults silently.
    pub fn load_from(path: &Path) -> (Self, Vec<DefmarkError>) {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return (Self::default(), Vec::new());
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                tracing::info!("Loaded config from {}", path.display());
                Self::from_yaml_str(&content)
            }
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                (Self::default(), Vec::new())
            }
        }
    }

    /// Parse YAML, validating each field independently
    pub fn from_yaml_str(yaml: &str) -> (Self, Vec<DefmarkError>) {
        match serde_yaml::from_str::<Value>(yaml) {
            Ok(value) => Self::from_value(&value),
            Err(e) => (
                Self::default(),
                vec![DefmarkError::InvalidConfiguration {
                    field: "<document>".to_string(),
                    reason: e.to_string(),
                }],
            ),
        }
    }

    /// Build from an already parsed YAML value
    pub fn from_value(value: &Value) -> (Self, Vec<DefmarkError>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        let mapping = match value {
            Value::Null => return (config, warnings),
            Value::Mapping(mapping) => mapping,
            other => {
                warnings.push(invalid("<document>", "expected a mapping", other));
                return (config, warnings);
            }
        };

        for key in mapping.keys() {
            let known = key.as_str().is_some_and(|k| {
                [AUTO_ENABLE_KEYS, REFRESH_EVENTS_KEYS, DEBOUNCE_MS_KEYS]
                    .iter()
                    .any(|keys| keys.contains(&k))
            });
            if !known {
                tracing::debug!("Ignoring unknown config key {:?}", key);
            }
        }

        if let Some(value) = lookup(mapping, AUTO_ENABLE_KEYS) {
            match value.as_bool() {
                Some(flag) => config.auto_enable = flag,
                None => warnings.push(invalid(AUTO_ENABLE, "expected a boolean", value)),
            }
        }

        if let Some(value) = lookup(mapping, REFRESH_EVENTS_KEYS) {
            match parse_events(value) {
                Ok(events) => config.refresh_events = events,
                Err(reason) => warnings.push(invalid(REFRESH_EVENTS, &reason, value)),
            }
        }

        if let Some(value) = lookup(mapping, DEBOUNCE_MS_KEYS) {
            match value.as_u64() {
                Some(ms) => config.debounce_ms = ms,
                None => warnings.push(invalid(
                    DEBOUNCE_MS,
                    "expected a non-negative integer",
                    value,
                )),
            }
        }

        (config, warnings)
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Replace the refresh events, dropping duplicates but keeping order
    pub fn set_refresh_events(&mut self, events: impl IntoIterator<Item = RefreshEvent>) {
        self.refresh_events = dedup_events(events);
    }

    /// Whether `event` should trigger a refresh
    pub fn wants(&self, event: RefreshEvent) -> bool {
        self.refresh_events.contains(&event)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// First present spelling of a field
fn lookup<'a>(mapping: &'a serde_yaml::Mapping, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| mapping.get(*key))
}

fn invalid(field: &str, expected: &str, got: &Value) -> DefmarkError {
    let got = serde_yaml::to_string(got)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "<unprintable>".to_string());
    DefmarkError::InvalidConfiguration {
        field: field.to_string(),
        reason: format!("{}, got `{}`; using default", expected, got),
    }
}

fn parse_events(value: &Value) -> Result<Vec<RefreshEvent>, String> {
    let items = value
        .as_sequence()
        .ok_or_else(|| "expected a list of event names".to_string())?;

    let mut events = Vec::with_capacity(items.len());
    for item in items {
        let name = item
            .as_str()
            .ok_or_else(|| "event names must be strings".to_string())?;
        events.push(name.parse::<RefreshEvent>()?);
    }
    Ok(dedup_events(events))
}

fn dedup_events(events: impl IntoIterator<Item = RefreshEvent>) -> Vec<RefreshEvent> {
    let mut unique = Vec::new();
    for event in events {
        if !unique.contains(&event) {
            unique.push(event);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PluginConfig::default();
        assert!(config.auto_enable);
        assert_eq!(config.refresh_events, RefreshEvent::ALL.to_vec());
        assert_eq!(config.debounce(), Duration::from_millis(30));
    }

    #[test]
    fn test_empty_document_is_default() {
        let (config, warnings) = PluginConfig::from_yaml_str("");
        assert_eq!(config, PluginConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_fields_apply() {
        let yaml = "auto_enable: false\nrefresh_events: [post-save, insert-leave]\ndebounce_ms: 0\n";
        let (config, warnings) = PluginConfig::from_yaml_str(yaml);
        assert!(warnings.is_empty());
        assert!(!config.auto_enable);
        assert_eq!(
            config.refresh_events,
            vec![RefreshEvent::PostSave, RefreshEvent::InsertLeave]
        );
        assert_eq!(config.debounce_ms, 0);
    }

    #[test]
    fn test_wrong_type_falls_back_per_field() {
        let yaml = "auto_enable: \"yes\"\nrefresh_events: [post-save]\n";
        let (config, warnings) = PluginConfig::from_yaml_str(yaml);

        assert!(config.auto_enable);
        assert_eq!(config.refresh_events, vec![RefreshEvent::PostSave]);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            DefmarkError::InvalidConfiguration { field, .. } if field == "auto_enable"
        ));
    }

    #[test]
    fn test_unknown_event_name_rejects_field() {
        let (config, warnings) =
            PluginConfig::from_yaml_str("refresh_events: [post-save, cursor-moved]\n");
        assert_eq!(config.refresh_events, RefreshEvent::ALL.to_vec());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("cursor-moved"));
    }

    #[test]
    fn test_refresh_events_not_a_list() {
        let (config, warnings) = PluginConfig::from_yaml_str("refresh_events: post-save\n");
        assert_eq!(config.refresh_events, RefreshEvent::ALL.to_vec());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_negative_debounce_rejected() {
        let (config, warnings) = PluginConfig::from_yaml_str("debounce_ms: -5\n");
        assert_eq!(config.debounce_ms, 30);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_duplicate_events_collapse() {
        let (config, warnings) = PluginConfig::from_yaml_str(
            "refresh_events: [insert-leave, post-save, insert-leave]\n",
        );
        assert!(warnings.is_empty());
        assert_eq!(
            config.refresh_events,
            vec![RefreshEvent::InsertLeave, RefreshEvent::PostSave]
        );
    }

    #[test]
    fn test_non_mapping_document() {
        let (config, warnings) = PluginConfig::from_yaml_str("- a\n- b\n");
        assert_eq!(config, PluginConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_malformed_yaml() {
        let (config, warnings) = PluginConfig::from_yaml_str("auto_enable: [unclosed\n");
        assert_eq!(config, PluginConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (config, warnings) = PluginConfig::from_yaml_str("theme: dark\nauto_enable: false\n");
        assert!(!config.auto_enable);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_camel_case_keys_accepted() {
        let yaml = "autoEnable: false\nrefreshEvents: [post-save]\ndebounceMs: 0\n";
        let (config, warnings) = PluginConfig::from_yaml_str(yaml);
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert!(!config.auto_enable);
        assert_eq!(config.refresh_events, vec![RefreshEvent::PostSave]);
        assert_eq!(config.debounce_ms, 0);
    }

    #[test]
    fn test_camel_case_key_still_validated() {
        let (config, warnings) = PluginConfig::from_yaml_str("autoEnable: 3\n");
        assert!(config.auto_enable);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_wants() {
        let mut config = PluginConfig::default();
        config.set_refresh_events([RefreshEvent::PostSave, RefreshEvent::PostSave]);
        assert_eq!(config.refresh_events.len(), 1);
        assert!(config.wants(RefreshEvent::PostSave));
        assert!(!config.wants(RefreshEvent::TextChanged));
    }
}
