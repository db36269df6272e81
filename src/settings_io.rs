use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::settings::Settings;

const SETTINGS_FILE: &str = "settings.json";

pub fn projector_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Projector"))
}

pub fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE)
}

fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_obj), Value::Object(overlay_obj)) => {
            for (k, v) in overlay_obj {
                match base_obj.get_mut(&k) {
                    Some(existing) => merge_json(existing, v),
                    None => {
                        base_obj.insert(k, v);
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value;
        }
    }
}

/// Normalize hand-edited or legacy settings before deserialization.
pub fn sanitize_settings_json(value: &mut Value) {
    let Value::Object(obj) = value else {
        return;
    };

    // Device ids are compared verbatim apart from case; stray whitespace from
    // manual edits would otherwise never match
    match obj.get("preferred_monitor_device_id") {
        Some(Value::String(id)) => {
            let trimmed = id.trim().to_string();
            obj.insert(
                "preferred_monitor_device_id".to_string(),
                Value::String(trimmed),
            );
        }
        Some(Value::Null) => {
            obj.insert(
                "preferred_monitor_device_id".to_string(),
                Value::String(String::new()),
            );
        }
        Some(_) => {
            obj.remove("preferred_monitor_device_id");
        }
        None => {}
    }

    // Non-numeric zoom values -> remove (let defaults apply)
    for key in ["min_scale", "max_scale", "zoom_step"] {
        if obj.get(key).is_some_and(|v| !v.is_number()) {
            obj.remove(key);
        }
    }
}

/// Load settings, falling back to defaults for a missing or corrupt file.
/// Keys absent from the file take their default values.
pub fn load_settings_from_disk(dir: &Path) -> Settings {
    let path = settings_path(dir);

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(_) => {
            tracing::debug!(path = ?path, "No settings file, using defaults");
            return Settings::default();
        }
    };

    let mut value: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Corrupt settings file, using defaults");
            return Settings::default();
        }
    };

    sanitize_settings_json(&mut value);

    // Merge onto current defaults so missing keys don't break deserialization.
    let mut merged =
        serde_json::to_value(Settings::default()).unwrap_or_else(|_| serde_json::json!({}));
    merge_json(&mut merged, value);

    match serde_json::from_value(merged) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Invalid settings values, using defaults");
            Settings::default()
        }
    }
}

/// Write settings as pretty JSON, preserving unknown keys already on disk.
pub fn save_settings_to_disk(dir: &Path, settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
    let path = settings_path(dir);

    let mut existing: Value = match std::fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| serde_json::json!({})),
        Err(_) => serde_json::json!({}),
    };
    if !existing.is_object() {
        existing = serde_json::json!({});
    }

    let new_value = serde_json::to_value(settings).context("Failed to serialize settings")?;
    merge_json(&mut existing, new_value);

    let pretty = serde_json::to_string_pretty(&existing).context("Failed to format settings")?;
    std::fs::write(&path, pretty)
        .with_context(|| format!("Failed to write settings: {:?}", path))?;
    Ok(())
}

/// Remember (or with `None`, forget) the projection monitor.
pub fn write_preferred_device_id(dir: &Path, device_id: Option<&str>) -> Result<Settings> {
    let mut settings = load_settings_from_disk(dir);
    settings.preferred_monitor_device_id = device_id.map(|s| s.trim().to_string()).unwrap_or_default();
    save_settings_to_disk(dir, &settings)?;

    tracing::info!(
        device_id = %settings.preferred_monitor_device_id,
        "Preferred projection monitor saved"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitize_trims_device_id() {
        let mut value = json!({
            "preferred_monitor_device_id": "  \\\\?\\DISPLAY#ABC  "
        });
        sanitize_settings_json(&mut value);
        assert_eq!(value["preferred_monitor_device_id"], json!("\\\\?\\DISPLAY#ABC"));
    }

    #[test]
    fn sanitize_replaces_null_device_id() {
        let mut value = json!({ "preferred_monitor_device_id": null });
        sanitize_settings_json(&mut value);
        assert_eq!(value["preferred_monitor_device_id"], json!(""));
    }

    #[test]
    fn sanitize_drops_non_numeric_zoom_values() {
        let mut value = json!({
            "min_scale": "small",
            "max_scale": 4.0,
            "zoom_step": null
        });
        sanitize_settings_json(&mut value);
        assert!(value.get("min_scale").is_none());
        assert!(value.get("zoom_step").is_none());
        assert_eq!(value["max_scale"], json!(4.0));
    }

    #[test]
    fn merge_overrides_nested_values() {
        let mut base = json!({ "a": 1, "b": { "c": 2, "d": 3 } });
        merge_json(&mut base, json!({ "b": { "c": 5 }, "e": true }));
        assert_eq!(base, json!({ "a": 1, "b": { "c": 5, "d": 3 }, "e": true }));
    }
}
