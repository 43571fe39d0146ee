//! Lateral (horizontal) movement: camera-relative acceleration, drag, the
//! per-state speed cap and the steep-slope correction applied in the air.

use bevy::prelude::*;

use crate::camera::CameraView;
use crate::physics::surface_angle;
use crate::player::MovementState;
use crate::settings::MovementSettings;

/// Acceleration, speed cap and drag for one movement state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LateralProfile {
    pub acceleration: f32,
    pub speed_cap: f32,
    pub drag: f32,
}

impl LateralProfile {
    #[must_use]
    pub fn for_state(state: MovementState, settings: &MovementSettings) -> Self {
        let (acceleration, speed_cap) = match state {
            MovementState::Walking => (settings.walk_acceleration, settings.walk_speed),
            MovementState::Running => (settings.run_acceleration, settings.run_speed),
            MovementState::Sprinting => (settings.sprint_acceleration, settings.sprint_speed),
            MovementState::Jumping | MovementState::Falling => {
                (settings.in_air_acceleration, settings.sprint_speed)
            }
            MovementState::Idling | MovementState::Strafing => {
                (settings.walk_acceleration, settings.sprint_speed)
            }
        };
        let drag = if state.is_airborne() {
            settings.in_air_drag
        } else {
            settings.drag
        };
        Self { acceleration, speed_cap, drag }
    }
}

/// World-space direction for `movement` (x = right, y = forward) relative to
/// the camera, flattened onto the ground plane.
#[must_use]
pub fn camera_relative_direction(view: &CameraView, movement: Vec2) -> Vec3 {
    let (forward, right) = view.horizontal_basis();
    right * movement.x + forward * movement.y
}

/// Slow `horizontal` by `drag * dt`, stopping at zero instead of reversing.
#[must_use]
pub fn apply_drag(horizontal: Vec3, drag: f32, dt: f32) -> Vec3 {
    let loss = drag * dt;
    if horizontal.length() <= loss {
        Vec3::ZERO
    } else {
        horizontal - horizontal.normalize_or_zero() * loss
    }
}

/// Project a downward `velocity` onto a surface steeper than `slope_limit`.
///
/// Walkable surfaces and upward motion pass through unchanged.
#[must_use]
pub fn steep_slope_correction(velocity: Vec3, normal: Vec3, slope_limit: f32) -> Vec3 {
    if surface_angle(normal) > slope_limit && velocity.y < 0.0 {
        velocity - normal * normal.dot(velocity)
    } else {
        velocity
    }
}

/// Combine this frame's horizontal integration with the already-integrated
/// vertical speed.
///
/// # Arguments
/// * `horizontal` - horizontal velocity measured from the last move
/// * `direction` - camera-relative input direction
/// * `profile` - acceleration, cap and drag for the current state
/// * `vertical` - vertical speed from the vertical step
/// * `dt` - frame time in seconds
#[must_use]
pub fn integrate_lateral(
    horizontal: Vec3,
    direction: Vec3,
    profile: &LateralProfile,
    vertical: f32,
    dt: f32,
) -> Vec3 {
    let mut h = Vec3::new(horizontal.x, 0.0, horizontal.z);
    h += direction * profile.acceleration * dt;
    h = apply_drag(h, profile.drag, dt);
    h = h.clamp_length_max(profile.speed_cap);
    Vec3::new(h.x, vertical, h.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraMode;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn profiles_follow_the_state_table() {
        let s = MovementSettings::default();
        let walk = LateralProfile::for_state(MovementState::Walking, &s);
        assert_eq!((walk.acceleration, walk.speed_cap, walk.drag), (25.0, 2.0, 20.0));
        let sprint = LateralProfile::for_state(MovementState::Sprinting, &s);
        assert_eq!((sprint.acceleration, sprint.speed_cap), (30.0, 7.0));
        let run = LateralProfile::for_state(MovementState::Running, &s);
        assert_eq!((run.acceleration, run.speed_cap), (50.0, 4.0));
        let idle = LateralProfile::for_state(MovementState::Idling, &s);
        assert_eq!((idle.acceleration, idle.speed_cap), (25.0, 7.0));
        let fall = LateralProfile::for_state(MovementState::Falling, &s);
        assert_eq!((fall.acceleration, fall.speed_cap, fall.drag), (25.0, 7.0, 5.0));
    }

    #[test]
    fn drag_shrinks_without_reversing() {
        let samples = [
            Vec3::new(3.0, 0.0, -1.0),
            Vec3::new(0.2, 0.0, 0.1),
            Vec3::new(-0.01, 0.0, 0.0),
            Vec3::ZERO,
        ];
        for drag in [5.0, 20.0, 400.0] {
            for h in samples {
                let after = apply_drag(h, drag, DT);
                assert!(after.length() <= h.length() + 1e-6);
                if after != Vec3::ZERO {
                    assert!(after.normalize().dot(h.normalize()) > 0.9999);
                }
            }
        }
        assert_eq!(apply_drag(Vec3::new(0.3, 0.0, 0.0), 20.0, DT), Vec3::ZERO);
    }

    #[test]
    fn input_is_relative_to_the_flattened_camera() {
        // camera pitched down and turned 90 degrees to the left
        let rotation = Quat::from_euler(EulerRot::YXZ, 90f32.to_radians(), -40f32.to_radians(), 0.0);
        let view = CameraView::from_rotation(rotation, CameraMode::ThirdPerson);
        let forward = camera_relative_direction(&view, Vec2::Y);
        assert!((forward - Vec3::NEG_X).length() < 1e-5);
        let right = camera_relative_direction(&view, Vec2::X);
        assert!((right - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn horizontal_speed_is_capped_and_vertical_reattached() {
        let profile = LateralProfile::for_state(MovementState::Running, &MovementSettings::default());
        let v = integrate_lateral(Vec3::new(0.0, -3.0, 10.0), Vec3::Z, &profile, 1.5, DT);
        assert!((Vec3::new(v.x, 0.0, v.z).length() - profile.speed_cap).abs() < 1e-5);
        assert_eq!(v.y, 1.5);
    }

    #[test]
    fn steep_downward_motion_slides_along_the_surface() {
        let normal = Vec3::new(60f32.to_radians().sin(), 60f32.to_radians().cos(), 0.0);
        let corrected = steep_slope_correction(Vec3::new(1.0, -4.0, 0.5), normal, 45.0);
        assert!(corrected.dot(normal).abs() < 1e-5);

        let rising = Vec3::new(1.0, 4.0, 0.0);
        assert_eq!(steep_slope_correction(rising, normal, 45.0), rising);
        let walkable = Quat::from_rotation_z(30f32.to_radians()) * Vec3::Y;
        let falling = Vec3::new(0.0, -4.0, 0.0);
        assert_eq!(steep_slope_correction(falling, walkable, 45.0), falling);
    }
}
