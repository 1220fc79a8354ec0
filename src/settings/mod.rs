//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! using the shared RON watcher utilities (see `ron::setup_ron_watcher`). Every
//! field has a serde default so a partial file only overrides what it names.
use bevy::prelude::{KeyCode, Resource, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsSettings {
    #[serde(default = "GraphicsSettings::default_vsync")]
    pub vsync: bool, // Cap FPS to the display refresh rate.
    #[serde(default = "GraphicsSettings::default_shadows")]
    pub shadows: bool, // Sun shadow maps.
}

impl GraphicsSettings {
    fn default_vsync() -> bool { true }
    fn default_shadows() -> bool { true }
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            vsync: Self::default_vsync(),
            shadows: Self::default_shadows(),
        }
    }
}

/// Procedural sky (bevy_atmosphere).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmosphereSettings {
    #[serde(default = "AtmosphereSettings::default_enabled")]
    pub enabled: bool, // Read at startup only
    #[serde(default = "AtmosphereSettings::default_resolution")]
    pub resolution: u32, // Skybox face size, applied live
    #[serde(default = "AtmosphereSettings::default_dithering")]
    pub dithering: bool,
}

impl AtmosphereSettings {
    fn default_enabled() -> bool { true }
    fn default_resolution() -> u32 { 512 }
    fn default_dithering() -> bool { true }
}

impl Default for AtmosphereSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            resolution: Self::default_resolution(),
            dithering: Self::default_dithering(),
        }
    }
}

/// Background music settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default = "AudioSettings::default_music_enabled")]
    pub music_enabled: bool, // Attempt to start music when the world scene opens
    #[serde(default = "AudioSettings::default_music_volume")]
    pub music_volume: f32, // 0.0..=1.0
    #[serde(default = "AudioSettings::default_music_path")]
    pub music_path: String, // Asset path of the looping track
}

impl AudioSettings {
    fn default_music_enabled() -> bool { true }
    fn default_music_volume() -> f32 { 0.8 }
    fn default_music_path() -> String { "music/little-slimes-adventure.mp3".to_string() }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            music_enabled: Self::default_music_enabled(),
            music_volume: Self::default_music_volume(),
            music_path: Self::default_music_path(),
        }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Action name -> key identifier
}

impl ControlsSettings {
    fn default_keybinds() -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("forward".to_string(), "W".to_string());
        m.insert("back".to_string(), "S".to_string());
        m.insert("left".to_string(), "A".to_string());
        m.insert("right".to_string(), "D".to_string());
        m.insert("jump".to_string(), "Space".to_string());
        m.insert("toggle_music".to_string(), "M".to_string());
        m.insert("toggle_debug".to_string(), "F1".to_string());
        m.insert("dump_debug".to_string(), "F3".to_string());
        m
    }

    /// Resolve the key bound to `action`, falling back to `default` when the
    /// binding is missing or names an unknown key.
    #[must_use]
    pub fn key(&self, action: &str, default: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(default)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { keybinds: Self::default_keybinds() }
    }
}

/// Tuning for the avatar controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocomotionSettings {
    #[serde(default = "LocomotionSettings::default_move_speed")]
    pub move_speed: f32, // Horizontal target speed, units/s
    #[serde(default = "LocomotionSettings::default_rotate_speed")]
    pub rotate_speed: f32, // Yaw rate, rad/s
    #[serde(default = "LocomotionSettings::default_joystick_turn_scale")]
    pub joystick_turn_scale: f32,
    #[serde(default = "LocomotionSettings::default_jump_impulse")]
    pub jump_impulse: f32, // Vertical velocity written on jump start
    #[serde(default = "LocomotionSettings::default_velocity_smoothing")]
    pub velocity_smoothing: f32, // Weight of the target velocity per frame (X/Z)
    #[serde(default = "LocomotionSettings::default_idle_cycle_seconds")]
    pub idle_cycle_seconds: f32,
    #[serde(default = "LocomotionSettings::default_grounded_threshold")]
    pub grounded_threshold: f32, // |vy| below this counts as grounded
    #[serde(default = "LocomotionSettings::default_dead_zone")]
    pub dead_zone: f32, // Joystick axis dead-zone
    #[serde(default = "LocomotionSettings::default_model_scale")]
    pub model_scale: f32,
}

impl LocomotionSettings {
    fn default_move_speed() -> f32 { 2.5 }
    fn default_rotate_speed() -> f32 { 2.0 }
    fn default_joystick_turn_scale() -> f32 { 1.5 }
    fn default_jump_impulse() -> f32 { 4.0 }
    fn default_velocity_smoothing() -> f32 { 0.15 }
    fn default_idle_cycle_seconds() -> f32 { 5.0 }
    fn default_grounded_threshold() -> f32 { 0.1 }
    fn default_dead_zone() -> f32 { 0.1 }
    fn default_model_scale() -> f32 { 0.8 }
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            move_speed: Self::default_move_speed(),
            rotate_speed: Self::default_rotate_speed(),
            joystick_turn_scale: Self::default_joystick_turn_scale(),
            jump_impulse: Self::default_jump_impulse(),
            velocity_smoothing: Self::default_velocity_smoothing(),
            idle_cycle_seconds: Self::default_idle_cycle_seconds(),
            grounded_threshold: Self::default_grounded_threshold(),
            dead_zone: Self::default_dead_zone(),
            model_scale: Self::default_model_scale(),
        }
    }
}

/// Trailing camera tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(default = "CameraSettings::default_offset")]
    pub offset: Vec3, // Behind and above the avatar
    #[serde(default = "CameraSettings::default_look_at_offset")]
    pub look_at_offset: Vec3, // Upper body
    #[serde(default = "CameraSettings::default_damping")]
    pub damping: f32, // Lerp factor per second, clamped to 1 per frame
    #[serde(default = "CameraSettings::default_fov_degrees")]
    pub fov_degrees: f32,
}

impl CameraSettings {
    fn default_offset() -> Vec3 { Vec3::new(0.0, 1.0, 5.0) }
    fn default_look_at_offset() -> Vec3 { Vec3::new(0.0, 1.0, 0.0) }
    fn default_damping() -> f32 { 5.0 }
    fn default_fov_degrees() -> f32 { 50.0 }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            offset: Self::default_offset(),
            look_at_offset: Self::default_look_at_offset(),
            damping: Self::default_damping(),
            fov_degrees: Self::default_fov_degrees(),
        }
    }
}

/// On-screen joystick and jump button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoystickSettings {
    #[serde(default = "JoystickSettings::default_knob_travel_px")]
    pub knob_travel_px: f32,
    #[serde(default = "JoystickSettings::default_base_size_px")]
    pub base_size_px: f32,
    #[serde(default = "JoystickSettings::default_mobile_max_width")]
    pub mobile_max_width: f32, // Touch controls only at or below this logical width
}

impl JoystickSettings {
    fn default_knob_travel_px() -> f32 { 40.0 }
    fn default_base_size_px() -> f32 { 120.0 }
    fn default_mobile_max_width() -> f32 { 1366.0 }
}

impl Default for JoystickSettings {
    fn default() -> Self {
        Self {
            knob_travel_px: Self::default_knob_travel_px(),
            base_size_px: Self::default_base_size_px(),
            mobile_max_width: Self::default_mobile_max_width(),
        }
    }
}

/// Scene switching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSettings {
    #[serde(default = "SceneSettings::default_loading_seconds")]
    pub loading_seconds: f32,
    #[serde(default = "SceneSettings::default_transition_ms")]
    pub transition_ms: u64,
    #[serde(default)]
    pub preloaded: bool, // Skip the loading scene entirely
}

impl SceneSettings {
    fn default_loading_seconds() -> f32 { 5.0 }
    fn default_transition_ms() -> u64 { 300 }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            loading_seconds: Self::default_loading_seconds(),
            transition_ms: Self::default_transition_ms(),
            preloaded: false,
        }
    }
}

/// Decorative world layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSettings {
    #[serde(default = "WorldSettings::default_size")]
    pub size: f32, // Half-extent of the walled play area
    #[serde(default = "WorldSettings::default_tree_count")]
    pub tree_count: usize,
    #[serde(default = "WorldSettings::default_rock_count")]
    pub rock_count: usize,
    #[serde(default = "WorldSettings::default_seed")]
    pub seed: u64,
}

impl WorldSettings {
    fn default_size() -> f32 { 40.0 }
    fn default_tree_count() -> usize { 50 }
    fn default_rock_count() -> usize { 25 }
    fn default_seed() -> u64 { 0x7261_696c }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            size: Self::default_size(),
            tree_count: Self::default_tree_count(),
            rock_count: Self::default_rock_count(),
            seed: Self::default_seed(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub graphics: GraphicsSettings,
    #[serde(default)]
    pub atmosphere: AtmosphereSettings,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub locomotion: LocomotionSettings,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub joystick: JoystickSettings,
    #[serde(default)]
    pub scene: SceneSettings,
    #[serde(default)]
    pub world: WorldSettings,
}

impl Settings {
    /// Convert a string key identifier (e.g., from `controls.keybinds`) into a `KeyCode`.
    ///
    /// Single letters and digits map to their key; named keys cover the
    /// arrows, whitespace/control keys, modifiers and function keys.
    ///
    /// # Returns
    /// `None` if the string does not name a known key.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        let s = name.trim().to_ascii_uppercase();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return match c {
                'A' => Some(KeyCode::KeyA),
                'B' => Some(KeyCode::KeyB),
                'C' => Some(KeyCode::KeyC),
                'D' => Some(KeyCode::KeyD),
                'E' => Some(KeyCode::KeyE),
                'F' => Some(KeyCode::KeyF),
                'G' => Some(KeyCode::KeyG),
                'H' => Some(KeyCode::KeyH),
                'I' => Some(KeyCode::KeyI),
                'J' => Some(KeyCode::KeyJ),
                'K' => Some(KeyCode::KeyK),
                'L' => Some(KeyCode::KeyL),
                'M' => Some(KeyCode::KeyM),
                'N' => Some(KeyCode::KeyN),
                'O' => Some(KeyCode::KeyO),
                'P' => Some(KeyCode::KeyP),
                'Q' => Some(KeyCode::KeyQ),
                'R' => Some(KeyCode::KeyR),
                'S' => Some(KeyCode::KeyS),
                'T' => Some(KeyCode::KeyT),
                'U' => Some(KeyCode::KeyU),
                'V' => Some(KeyCode::KeyV),
                'W' => Some(KeyCode::KeyW),
                'X' => Some(KeyCode::KeyX),
                'Y' => Some(KeyCode::KeyY),
                'Z' => Some(KeyCode::KeyZ),
                '0' => Some(KeyCode::Digit0),
                '1' => Some(KeyCode::Digit1),
                '2' => Some(KeyCode::Digit2),
                '3' => Some(KeyCode::Digit3),
                '4' => Some(KeyCode::Digit4),
                '5' => Some(KeyCode::Digit5),
                '6' => Some(KeyCode::Digit6),
                '7' => Some(KeyCode::Digit7),
                '8' => Some(KeyCode::Digit8),
                '9' => Some(KeyCode::Digit9),
                _ => None,
            };
        }

        Some(match s.as_str() {
            "F1" => KeyCode::F1,
            "F2" => KeyCode::F2,
            "F3" => KeyCode::F3,
            "F4" => KeyCode::F4,
            "F5" => KeyCode::F5,
            "F6" => KeyCode::F6,
            "F7" => KeyCode::F7,
            "F8" => KeyCode::F8,
            "F9" => KeyCode::F9,
            "F10" => KeyCode::F10,
            "F11" => KeyCode::F11,
            "F12" => KeyCode::F12,

            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,

            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "BACKSPACE" | "BACK" => KeyCode::Backspace,

            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,

            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let s: Settings = ron::from_str("(locomotion: (move_speed: 4.0), scene: (preloaded: true))").unwrap();
        assert_eq!(s.locomotion.move_speed, 4.0);
        assert_eq!(s.locomotion.jump_impulse, 4.0);
        assert_eq!(s.locomotion.idle_cycle_seconds, 5.0);
        assert!(s.scene.preloaded);
        assert_eq!(s.scene.transition_ms, 300);
        assert_eq!(s.camera.offset, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(s.controls.key("jump", KeyCode::Enter), KeyCode::Space);
    }

    #[test]
    fn keybind_lookup_falls_back_on_unknown_names() {
        let mut c = ControlsSettings::default();
        c.keybinds.insert("jump".to_string(), "NotAKey".to_string());
        assert_eq!(c.key("jump", KeyCode::Space), KeyCode::Space);
        assert_eq!(c.key("forward", KeyCode::ArrowUp), KeyCode::KeyW);
    }

    #[test]
    fn keycode_names() {
        assert_eq!(Settings::keycode_from_str("w"), Some(KeyCode::KeyW));
        assert_eq!(Settings::keycode_from_str("7"), Some(KeyCode::Digit7));
        assert_eq!(Settings::keycode_from_str("ArrowUp"), Some(KeyCode::ArrowUp));
        assert_eq!(Settings::keycode_from_str("space"), Some(KeyCode::Space));
        assert_eq!(Settings::keycode_from_str("?"), None);
    }
}

pub mod loader;
