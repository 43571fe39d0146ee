//! Settings loading and hot-reloading.
//!
//! Settings are loaded from RON files in the `data/settings` directory. If multiple
//! RON files are present, the first successfully parsed `Settings` will be used.
//! If no RON files are found or if no parsing succeeds, default settings will be used.
//!
//! When the watcher reports a change the `Settings` resource is replaced and every
//! spawned controller picks up the new tuning on its next frame (see
//! `plugin::apply_settings_changes`).
use crate::ron_loader::{load_ron_files, setup_ron_watcher, RonWatcher};
use crate::settings::{Settings, SETTINGS_DIR};
use bevy::prelude::{info, warn, Res, ResMut, Resource};

#[derive(Resource)]
pub struct SettingsWatcher(pub RonWatcher);

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher(RonWatcher::stub())
    }
}

/// Load settings from `path` (directory). If multiple `.ron` files are present
/// the first parsed `Settings` will be used. If none exist the `Default` is used.
///
/// # Arguments
/// * `path` - The directory path where settings RON files are located (e.g., "data/settings").
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    let items: Vec<Settings> = load_ron_files(path);
    if let Some(first) = items.into_iter().next() {
        first
    } else {
        info!("no settings found in {path}, using defaults");
        Settings::default()
    }
}

/// Create a watcher for the settings directory (hot-reload).
///
/// # Errors
/// Propagates the `notify::Error` raised when the directory cannot be watched.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    setup_ron_watcher(path).map(SettingsWatcher)
}

/// Check for changes and reload the settings resource when files change.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.0.take_changed() {
        info!("settings changed, reloading");
        let reloaded = load_settings_from_dir(SETTINGS_DIR);
        if reloaded != *settings {
            *settings = reloaded;
        }
    }
}

/// Report a watcher that could not be created and fall back to the stub.
#[must_use]
pub fn settings_watcher_or_stub(path: &str) -> SettingsWatcher {
    setup_settings_watcher(path).unwrap_or_else(|e| {
        warn!("settings hot-reload disabled for {path}: {e}");
        SettingsWatcher::stub()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("stride-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn empty_directory_yields_defaults() {
        let dir = scratch_dir("settings-empty");
        let settings = load_settings_from_dir(dir.to_str().expect("utf8 path"));
        assert_eq!(settings, Settings::default());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_directory_yields_defaults() {
        let settings = load_settings_from_dir("definitely/not/a/real/dir");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn ron_file_overrides_selected_fields() {
        let dir = scratch_dir("settings-file");
        fs::write(dir.join("controller.ron"), "(rotation: (rotation_tolerance: 45.0))").expect("write");
        fs::write(dir.join("notes.txt"), "not settings").expect("write");
        let settings = load_settings_from_dir(dir.to_str().expect("utf8 path"));
        assert_eq!(settings.rotation.rotation_tolerance, 45.0);
        assert_eq!(settings.movement, Settings::default().movement);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn shipped_settings_match_the_defaults() {
        let items: Vec<Settings> = load_ron_files(SETTINGS_DIR);
        assert_eq!(items, vec![Settings::default()]);
    }

    #[test]
    fn stub_watcher_never_reports_changes() {
        let watcher = SettingsWatcher::stub();
        assert!(!watcher.0.take_changed());
    }
}
