//! Camera look accumulation.
//!
//! `PlayerLook` turns look input into a camera yaw and pitch. Yaw is left
//! unbounded (the trigonometry wraps it); pitch is clamped to the configured
//! vertical limit.

use bevy::prelude::*;

use crate::settings::CameraSettings;

/// Camera orientation in degrees.
///
/// - `yaw`: rotation around world Y. Positive turns the view to the left.
/// - `pitch`: rotation around the camera's X axis, clamped to ±`look_limit_v`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerLook {
    pub yaw: f32,
    pub pitch: f32,
}

impl PlayerLook {
    #[must_use]
    pub fn new(yaw: f32) -> Self {
        Self { yaw, pitch: 0.0 }
    }

    /// Apply a look delta (x = right, y = down) to this `PlayerLook`.
    ///
    /// Public so benchmarks and systems call the same logic.
    pub fn apply_delta(&mut self, delta: Vec2, settings: &CameraSettings) {
        self.yaw -= settings.look_sense_h * delta.x;
        self.pitch = (self.pitch - settings.look_sense_v * delta.y)
            .clamp(-settings.look_limit_v, settings.look_limit_v);
    }

    /// Full camera orientation: yaw around Y, then pitch around X.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw.to_radians(), self.pitch.to_radians(), 0.0)
    }

    /// Yaw-only orientation, used as the target for the character's facing.
    #[must_use]
    pub fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_clamped_and_yaw_is_not() {
        let settings = CameraSettings::default();
        let mut look = PlayerLook::default();
        for _ in 0..100 {
            look.apply_delta(Vec2::new(100.0, -100.0), &settings);
        }
        assert_eq!(look.pitch, settings.look_limit_v);
        assert!((look.yaw + 1000.0).abs() < 1e-2);

        look.apply_delta(Vec2::new(0.0, 1.0e6), &settings);
        assert_eq!(look.pitch, -settings.look_limit_v);
    }

    #[test]
    fn moving_right_turns_the_view_right() {
        let settings = CameraSettings::default();
        let mut look = PlayerLook::default();
        look.apply_delta(Vec2::new(900.0, 0.0), &settings);
        let forward = look.rotation() * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-4);
    }
}
