//! Settings loading and hot-reloading.
//!
//! Settings are loaded from RON files in the `data/settings` directory. If multiple
//! RON files are present, the first one (by file name) that parses is used.
//! If no RON files are found or none parse, default settings are used.
use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use crate::settings::Settings;
use bevy::log::info;
use bevy::prelude::{Res, ResMut, Resource};

pub const SETTINGS_DIR: &str = "data/settings";

#[derive(Resource)]
pub struct SettingsWatcher(pub crate::ron::RonWatcher);

/// Load settings from `path` (directory).
///
/// # Example
/// ```no_run
/// let settings = trailhead::settings::loader::load_settings_from_dir("data/settings");
/// assert!(settings.locomotion.move_speed > 0.0);
/// ```
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    load_ron_files::<Settings>(path).into_iter().next().unwrap_or_default()
}

/// Create a watcher for the settings directory (hot-reload).
///
/// # Errors
/// Propagates the `notify::Error` raised when the OS watcher cannot be created.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    setup_ron_watcher(path).map(SettingsWatcher)
}

/// Reload the `Settings` resource when the watcher reports a change.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.0.take_changed() {
        info!("settings changed, reloading from {SETTINGS_DIR}");
        *settings = load_settings_from_dir(SETTINGS_DIR);
    }
}

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher(crate::ron::RonWatcher::stub())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dir_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from_dir(dir.path().to_str().unwrap());
        assert_eq!(s.locomotion.move_speed, 2.5);
        assert_eq!(s.joystick.mobile_max_width, 1366.0);
    }

    #[test]
    fn first_parsable_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("00-broken.ron"), "(graphics: ").unwrap();
        std::fs::write(dir.path().join("10-main.ron"), "(world: (tree_count: 3))").unwrap();
        std::fs::write(dir.path().join("20-other.ron"), "(world: (tree_count: 9))").unwrap();
        let s = load_settings_from_dir(dir.path().to_str().unwrap());
        assert_eq!(s.world.tree_count, 3);
    }
}
