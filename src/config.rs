use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::level::Severity;

pub const ENV_ENABLED: &str = "DEBUG_GATE_ENABLED";
pub const ENV_LEVEL: &str = "DEBUG_GATE_LEVEL";
pub const ENV_TIMESTAMP: &str = "DEBUG_GATE_TIMESTAMP";
pub const ENV_MODULE: &str = "DEBUG_GATE_MODULE";

/// Runtime switches consulted on every logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GateConfig {
    pub enabled: bool,
    pub level: Severity,
    pub show_timestamp: bool,
    pub show_module: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: Severity::Info,
            show_timestamp: true,
            show_module: true,
        }
    }
}

/// Partial update merged over an existing [`GateConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    pub enabled: Option<bool>,
    #[serde(deserialize_with = "lenient_level")]
    pub level: Option<Severity>,
    pub show_timestamp: Option<bool>,
    pub show_module: Option<bool>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.level.is_none()
            && self.show_timestamp.is_none()
            && self.show_module.is_none()
    }
}

impl GateConfig {
    /// Shallow merge: fields absent from the patch keep their value.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(level) = patch.level {
            self.level = level;
        }
        if let Some(show_timestamp) = patch.show_timestamp {
            self.show_timestamp = show_timestamp;
        }
        if let Some(show_module) = patch.show_module {
            self.show_module = show_module;
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from defaults overlaid with whatever `lookup`
    /// returns for the `DEBUG_GATE_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = GateConfig::default();
        let patch = ConfigPatch {
            enabled: parse_flag(ENV_ENABLED, lookup(ENV_ENABLED))?,
            level: parse_level(lookup(ENV_LEVEL))?,
            show_timestamp: parse_flag(ENV_TIMESTAMP, lookup(ENV_TIMESTAMP))?,
            show_module: parse_flag(ENV_MODULE, lookup(ENV_MODULE))?,
        };
        config.apply(&patch);
        Ok(config)
    }
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidFlag { key: &'static str, value: String },
    InvalidLevel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} expects a boolean, got {value:?}")
            }
            ConfigError::InvalidLevel(value) => write!(
                f,
                "{ENV_LEVEL} expects one of debug, info, warn, error, got {value:?}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

fn parse_flag(key: &'static str, raw: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidFlag { key, value: raw }),
    }
}

fn parse_level(raw: Option<String>) -> Result<Option<Severity>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    Severity::from_name(&raw.trim().to_ascii_lowercase())
        .map(Some)
        .ok_or(ConfigError::InvalidLevel(raw))
}

// An unrecognized level name would only ever produce the info threshold, so
// store that instead of rejecting the whole patch.
fn lenient_level<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(|name| Severity::resolve(&name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_disabled_at_info() {
        let config = GateConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.level, Severity::Info);
        assert!(config.show_timestamp);
        assert!(config.show_module);
    }

    #[test]
    fn patch_keeps_unspecified_fields() {
        let mut config = GateConfig::default();
        config.apply(&ConfigPatch {
            level: Some(Severity::Warn),
            ..ConfigPatch::default()
        });

        assert_eq!(config.level, Severity::Warn);
        assert!(!config.enabled);
        assert!(config.show_timestamp);
    }

    #[test]
    fn patch_deserializes_camel_case_and_folds_bad_level() {
        let patch: ConfigPatch =
            serde_json::from_str(r#"{"showModule": false, "level": "loud"}"#).expect("patch");
        assert_eq!(patch.show_module, Some(false));
        assert_eq!(patch.level, Some(Severity::Info));
        assert_eq!(patch.enabled, None);

        let empty: ConfigPatch = serde_json::from_str("{}").expect("empty patch");
        assert!(empty.is_empty());
    }

    #[test]
    fn config_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(GateConfig::default()).expect("serialize");
        assert_eq!(value["showTimestamp"], serde_json::json!(true));
        assert_eq!(value["level"], serde_json::json!("info"));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = GateConfig::from_lookup(lookup_from(&[
            (ENV_ENABLED, "Yes"),
            (ENV_LEVEL, "DEBUG"),
            (ENV_MODULE, "off"),
        ]))
        .expect("valid env");

        assert!(config.enabled);
        assert_eq!(config.level, Severity::Debug);
        assert!(!config.show_module);
        assert!(config.show_timestamp);
    }

    #[test]
    fn env_rejects_garbage() {
        let err = GateConfig::from_lookup(lookup_from(&[(ENV_ENABLED, "maybe")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidFlag {
                key: ENV_ENABLED,
                value: "maybe".to_string()
            }
        );

        let err = GateConfig::from_lookup(lookup_from(&[(ENV_LEVEL, "loud")])).unwrap_err();
        assert!(err.to_string().contains("loud"));
    }
}
