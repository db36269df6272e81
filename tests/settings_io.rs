use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use projector_core::settings::Settings;
use projector_core::settings_io;

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(label: &str) -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("projector_test_{}_{}_{}", label, std::process::id(), nanos));
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn write_json(path: &Path, value: serde_json::Value) {
    let data = serde_json::to_string_pretty(&value).unwrap();
    fs::write(path, data).unwrap();
}

#[test]
fn missing_file_loads_defaults() {
    let temp = TempDir::new("missing");
    assert_eq!(settings_io::load_settings_from_disk(&temp.path), Settings::default());
}

#[test]
fn corrupt_file_loads_defaults() {
    let temp = TempDir::new("corrupt");
    fs::write(settings_io::settings_path(&temp.path), "{ not json").unwrap();
    assert_eq!(settings_io::load_settings_from_disk(&temp.path), Settings::default());
}

#[test]
fn partial_file_merges_over_defaults() {
    let temp = TempDir::new("partial");
    write_json(
        &settings_io::settings_path(&temp.path),
        json!({ "preferred_monitor_device_id": " B ", "max_scale": 3.0 }),
    );

    let settings = settings_io::load_settings_from_disk(&temp.path);
    assert_eq!(settings.preferred_monitor_device_id, "B");
    assert_eq!(settings.max_scale, 3.0);
    assert_eq!(settings.min_scale, Settings::default().min_scale);
    assert_eq!(settings.log_level, "Error");
}

#[test]
fn preferred_device_roundtrips_and_clears() {
    let temp = TempDir::new("prefer");

    settings_io::write_preferred_device_id(&temp.path, Some("\\\\?\\DISPLAY#GSM5B08")).unwrap();
    let loaded = settings_io::load_settings_from_disk(&temp.path);
    assert_eq!(loaded.preferred_monitor_device_id, "\\\\?\\DISPLAY#GSM5B08");

    settings_io::write_preferred_device_id(&temp.path, None).unwrap();
    let cleared = settings_io::load_settings_from_disk(&temp.path);
    assert!(!cleared.has_preferred_monitor());
}

#[test]
fn save_preserves_unknown_keys() {
    let temp = TempDir::new("unknown_keys");
    let path = settings_io::settings_path(&temp.path);
    write_json(&path, json!({ "window_title": "Hall A" }));

    let settings = Settings {
        log_level: "Debug".to_string(),
        ..Settings::default()
    };
    settings_io::save_settings_to_disk(&temp.path, &settings).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["window_title"], json!("Hall A"));
    assert_eq!(raw["log_level"], json!("Debug"));
}

#[test]
fn save_creates_missing_config_dir() {
    let temp = TempDir::new("nested");
    let nested = temp.path.join("Projector");
    settings_io::save_settings_to_disk(&nested, &Settings::default()).unwrap();
    assert!(settings_io::settings_path(&nested).exists());
}
