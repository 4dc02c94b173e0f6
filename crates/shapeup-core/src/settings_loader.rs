//! Settings loading from configuration files and the environment.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (deep-merged over the defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `SHAPEUP_DEBUG` | `debug` |
//! | `SHAPEUP_LOG_LEVEL` | `log_level` |
//! | `SHAPEUP_PAGE_KWARG` | `page_kwarg` |
//! | `SHAPEUP_PAGINATE_BY` | `paginate_by` (`0` or empty disables) |
//! | `SHAPEUP_ALLOW_EMPTY` | `allow_empty` |
//! | `SHAPEUP_LOOKUP_FIELD` | `lookup_field` |
//! | `SHAPEUP_PREVIEW_FIELD` | `preview_field` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use shapeup_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/views.toml").unwrap();
//! let settings = settings_loader::from_toml_file_with_env("config/views.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::ShapeupError;
use crate::settings::Settings;

/// Loads settings from a TOML string. Missing keys keep their defaults.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, ShapeupError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| ShapeupError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, ShapeupError> {
    from_toml_str(&read_file(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, ShapeupError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string. Missing keys keep their defaults.
pub fn from_json_str(json_str: &str) -> Result<Settings, ShapeupError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| ShapeupError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, ShapeupError> {
    from_json_str(&read_file(path.as_ref(), "JSON")?)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `SHAPEUP_*` environment variable overrides to a settings struct.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

fn apply_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("SHAPEUP_DEBUG") {
        settings.debug = parse_bool(&val);
    }

    if let Some(val) = var("SHAPEUP_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(val) = var("SHAPEUP_PAGE_KWARG") {
        settings.page_kwarg = val;
    }

    if let Some(val) = var("SHAPEUP_PAGINATE_BY") {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            settings.paginate_by = None;
        } else if let Ok(size) = trimmed.parse::<usize>() {
            settings.paginate_by = (size > 0).then_some(size);
        }
    }

    if let Some(val) = var("SHAPEUP_ALLOW_EMPTY") {
        settings.allow_empty = parse_bool(&val);
    }

    if let Some(val) = var("SHAPEUP_LOOKUP_FIELD") {
        settings.lookup_field = val;
    }

    if let Some(val) = var("SHAPEUP_PREVIEW_FIELD") {
        settings.preview_field = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_bool(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn read_file(path: &Path, format: &str) -> Result<String, ShapeupError> {
    std::fs::read_to_string(path).map_err(|e| {
        ShapeupError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(
    value: serde_json::Value,
    format: &str,
) -> Result<Settings, ShapeupError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        ShapeupError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        ShapeupError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = match base_map.remove(&key) {
                    Some(base_v) => merge_json(base_v, override_v),
                    None => override_v,
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
