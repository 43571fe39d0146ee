//! Controller settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! using the RON watcher utilities (see `ron::setup_ron_watcher`). Every field
//! has a serde default so a file only needs to mention what it changes.
use bevy::prelude::{KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::player::ActionClearPolicy;

/// Directory the demo loads settings from.
pub const SETTINGS_DIR: &str = "data/settings";

/// Speeds, accelerations and the vertical tuning of the locomotion model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementSettings {
    #[serde(default = "MovementSettings::default_walk_acceleration")]
    pub walk_acceleration: f32, // m/s^2 while walking (and while idling on the ground)
    #[serde(default = "MovementSettings::default_walk_speed")]
    pub walk_speed: f32, // horizontal speed cap while walking
    #[serde(default = "MovementSettings::default_run_acceleration")]
    pub run_acceleration: f32,
    #[serde(default = "MovementSettings::default_run_speed")]
    pub run_speed: f32,
    #[serde(default = "MovementSettings::default_sprint_acceleration")]
    pub sprint_acceleration: f32,
    #[serde(default = "MovementSettings::default_sprint_speed")]
    pub sprint_speed: f32, // also the airborne speed cap and the anti-bump bias
    #[serde(default = "MovementSettings::default_drag")]
    pub drag: f32, // horizontal deceleration on the ground, m/s^2
    #[serde(default = "MovementSettings::default_in_air_acceleration")]
    pub in_air_acceleration: f32,
    #[serde(default = "MovementSettings::default_in_air_drag")]
    pub in_air_drag: f32,
    #[serde(default = "MovementSettings::default_gravity")]
    pub gravity: f32, // positive, applied downward
    #[serde(default = "MovementSettings::default_jump_speed")]
    pub jump_speed: f32, // jump height factor fed to the impulse formula
    #[serde(default = "MovementSettings::default_terminal_velocity")]
    pub terminal_velocity: f32,
    #[serde(default = "MovementSettings::default_moving_threshold")]
    pub moving_threshold: f32, // input / speed deadzone
}

impl MovementSettings {
    fn default_walk_acceleration() -> f32 { 25.0 }
    fn default_walk_speed() -> f32 { 2.0 }
    fn default_run_acceleration() -> f32 { 50.0 }
    fn default_run_speed() -> f32 { 4.0 }
    fn default_sprint_acceleration() -> f32 { 30.0 }
    fn default_sprint_speed() -> f32 { 7.0 }
    fn default_drag() -> f32 { 20.0 }
    fn default_in_air_acceleration() -> f32 { 25.0 }
    fn default_in_air_drag() -> f32 { 5.0 }
    fn default_gravity() -> f32 { 25.0 }
    fn default_jump_speed() -> f32 { 0.8 }
    fn default_terminal_velocity() -> f32 { 50.0 }
    fn default_moving_threshold() -> f32 { 0.01 }

    /// Downward bias that keeps a grounded capsule pressed to the floor.
    #[must_use]
    pub fn anti_bump(&self) -> f32 {
        self.sprint_speed
    }

    /// Upward speed added by a jump.
    #[must_use]
    pub fn jump_impulse(&self) -> f32 {
        (self.jump_speed * self.gravity * 3.0).sqrt()
    }
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            walk_acceleration: Self::default_walk_acceleration(),
            walk_speed: Self::default_walk_speed(),
            run_acceleration: Self::default_run_acceleration(),
            run_speed: Self::default_run_speed(),
            sprint_acceleration: Self::default_sprint_acceleration(),
            sprint_speed: Self::default_sprint_speed(),
            drag: Self::default_drag(),
            in_air_acceleration: Self::default_in_air_acceleration(),
            in_air_drag: Self::default_in_air_drag(),
            gravity: Self::default_gravity(),
            jump_speed: Self::default_jump_speed(),
            terminal_velocity: Self::default_terminal_velocity(),
            moving_threshold: Self::default_moving_threshold(),
        }
    }
}

/// How the character's facing follows the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationSettings {
    #[serde(default = "RotationSettings::default_rotation_speed")]
    pub rotation_speed: f32, // smoothing rate toward the camera yaw, per second
    #[serde(default = "RotationSettings::default_rotate_to_target_time")]
    pub rotate_to_target_time: f32, // seconds an idle snap keeps turning
    #[serde(default = "RotationSettings::default_rotation_tolerance")]
    pub rotation_tolerance: f32, // degrees of idle mismatch tolerated before snapping
}

impl RotationSettings {
    fn default_rotation_speed() -> f32 { 10.0 }
    fn default_rotate_to_target_time() -> f32 { 0.67 }
    fn default_rotation_tolerance() -> f32 { 90.0 }
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            rotation_speed: Self::default_rotation_speed(),
            rotate_to_target_time: Self::default_rotate_to_target_time(),
            rotation_tolerance: Self::default_rotation_tolerance(),
        }
    }
}

/// Look sensitivity, pitch limit and third-person zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(default = "CameraSettings::default_look_sense")]
    pub look_sense_h: f32, // degrees of yaw per unit of look input
    #[serde(default = "CameraSettings::default_look_sense")]
    pub look_sense_v: f32, // degrees of pitch per unit of look input
    #[serde(default = "CameraSettings::default_look_limit_v")]
    pub look_limit_v: f32, // pitch clamp, degrees either side of level
    #[serde(default)]
    pub invert_x: bool,
    #[serde(default)]
    pub invert_y: bool,
    #[serde(default = "CameraSettings::default_zoom_speed")]
    pub zoom_speed: f32,
    #[serde(default = "CameraSettings::default_min_zoom")]
    pub min_zoom: f32,
    #[serde(default = "CameraSettings::default_max_zoom")]
    pub max_zoom: f32,
    #[serde(default = "CameraSettings::default_follow_distance")]
    pub follow_distance: f32, // starting third-person distance
    #[serde(default = "CameraSettings::default_eye_height")]
    pub eye_height: f32,
}

impl CameraSettings {
    fn default_look_sense() -> f32 { 0.1 }
    fn default_look_limit_v() -> f32 { 89.0 }
    fn default_zoom_speed() -> f32 { 0.1 }
    fn default_min_zoom() -> f32 { 1.0 }
    fn default_max_zoom() -> f32 { 5.0 }
    fn default_follow_distance() -> f32 { 3.0 }
    fn default_eye_height() -> f32 { 1.6 }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_sense_h: Self::default_look_sense(),
            look_sense_v: Self::default_look_sense(),
            look_limit_v: Self::default_look_limit_v(),
            invert_x: false,
            invert_y: false,
            zoom_speed: Self::default_zoom_speed(),
            min_zoom: Self::default_min_zoom(),
            max_zoom: Self::default_max_zoom(),
            follow_distance: Self::default_follow_distance(),
            eye_height: Self::default_eye_height(),
        }
    }
}

/// Capsule geometry and the layers counted as ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySettings {
    #[serde(default = "BodySettings::default_radius")]
    pub radius: f32,
    #[serde(default = "BodySettings::default_half_height")]
    pub half_height: f32,
    #[serde(default = "BodySettings::default_step_offset")]
    pub step_offset: f32,
    #[serde(default = "BodySettings::default_slope_limit")]
    pub slope_limit: f32, // degrees
    #[serde(default = "BodySettings::default_ground_layers")]
    pub ground_layers: u32, // bitmask of collider layers treated as ground
}

impl BodySettings {
    fn default_radius() -> f32 { 0.3 }
    fn default_half_height() -> f32 { 0.9 }
    fn default_step_offset() -> f32 { 0.3 }
    fn default_slope_limit() -> f32 { 45.0 }
    fn default_ground_layers() -> u32 { 1 }
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            radius: Self::default_radius(),
            half_height: Self::default_half_height(),
            step_offset: Self::default_step_offset(),
            slope_limit: Self::default_slope_limit(),
            ground_layers: Self::default_ground_layers(),
        }
    }
}

/// Gather/attack flag behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSettings {
    #[serde(default)]
    pub clear_policy: ActionClearPolicy,
}

/// Animation parameter smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSettings {
    #[serde(default = "AnimationSettings::default_locomotion_blend_speed")]
    pub locomotion_blend_speed: f32,
}

impl AnimationSettings {
    fn default_locomotion_blend_speed() -> f32 { 4.0 }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self { locomotion_blend_speed: Self::default_locomotion_blend_speed() }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default = "ControlsSettings::default_hold_to_sprint")]
    pub hold_to_sprint: bool, // sprint while held instead of toggling on press
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // action name -> key identifier
}

impl ControlsSettings {
    fn default_hold_to_sprint() -> bool { true }

    fn default_keybinds() -> HashMap<String, String> {
        [
            ("forward", "W"),
            ("back", "S"),
            ("left", "A"),
            ("right", "D"),
            ("jump", "Space"),
            ("sprint", "LShift"),
            ("walk", "LCtrl"),
            ("gather", "E"),
            ("attack", "F"),
            ("switch_camera", "V"),
            ("dump_debug", "F3"),
        ]
        .into_iter()
        .map(|(action, key)| (action.to_string(), key.to_string()))
        .collect()
    }

    /// Resolve the key bound to `action`, falling back to `default` when the
    /// binding is missing or names an unknown key.
    #[must_use]
    pub fn key(&self, action: &str, default: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| keycode_from_str(s))
            .unwrap_or(default)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            hold_to_sprint: Self::default_hold_to_sprint(),
            keybinds: Self::default_keybinds(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub movement: MovementSettings,
    #[serde(default)]
    pub rotation: RotationSettings,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub body: BodySettings,
    #[serde(default)]
    pub actions: ActionSettings,
    #[serde(default)]
    pub animation: AnimationSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
}

const LETTER_KEYS: [KeyCode; 26] = [
    KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
    KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
    KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
    KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
    KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
    KeyCode::KeyZ,
];

const DIGIT_KEYS: [KeyCode; 10] = [
    KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
    KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
];

const FUNCTION_KEYS: [KeyCode; 12] = [
    KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
    KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
];

/// Convert a key identifier from `controls.keybinds` into a `KeyCode`.
///
/// Accepts single letters and digits, `F1`..`F12`, arrows and the common
/// modifier and whitespace names. Matching is case-insensitive.
///
/// # Returns
/// `None` if the string does not name a supported key.
#[must_use]
pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
    let upper = name.trim().to_ascii_uppercase();
    let bytes = upper.as_bytes();

    if let [c] = bytes {
        return match c {
            b'A'..=b'Z' => Some(LETTER_KEYS[usize::from(c - b'A')]),
            b'0'..=b'9' => Some(DIGIT_KEYS[usize::from(c - b'0')]),
            _ => None,
        };
    }

    if let Some(n) = upper.strip_prefix('F').and_then(|n| n.parse::<usize>().ok()) {
        return n.checked_sub(1).and_then(|i| FUNCTION_KEYS.get(i)).copied();
    }

    Some(match upper.as_str() {
        "SPACE" => KeyCode::Space,
        "TAB" => KeyCode::Tab,
        "ENTER" | "RETURN" => KeyCode::Enter,
        "ESC" | "ESCAPE" => KeyCode::Escape,
        "CAPSLOCK" => KeyCode::CapsLock,
        "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
        "RSHIFT" => KeyCode::ShiftRight,
        "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
        "RCTRL" => KeyCode::ControlRight,
        "LALT" | "ALT" => KeyCode::AltLeft,
        "RALT" => KeyCode::AltRight,
        "UP" | "ARROWUP" => KeyCode::ArrowUp,
        "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
        "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
        "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
        _ => return None,
    })
}

pub mod loader;
