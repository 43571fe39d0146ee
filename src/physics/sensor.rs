//! Ground sensor: what surface is directly under the capsule?
//!
//! The probe sweeps a sphere of the capsule's radius straight down from the
//! capsule centre. Its reach is half the capsule height plus the current step
//! offset plus [`GROUND_PROBE_EPSILON`], so ground resting exactly at the step
//! boundary still registers. Because the controller zeroes the step offset
//! while airborne, the probe is shorter in the air than on the ground.

use bevy::prelude::*;

use super::{CollisionWorld, KinematicBody, LayerMask};

/// Extra reach added to the downward probe.
pub const GROUND_PROBE_EPSILON: f32 = 0.01;

/// Maximum distance the ground probe sweeps for `body`.
#[must_use]
pub fn probe_distance(body: &KinematicBody) -> f32 {
    body.half_height + body.step_offset + GROUND_PROBE_EPSILON
}

/// Normal of the surface under `body`, or `Vec3::Y` when nothing is in reach.
pub fn sense_ground<W: CollisionWorld + ?Sized>(world: &W, body: &KinematicBody, layers: LayerMask) -> Vec3 {
    world
        .sphere_cast(body.center(), body.radius, Vec3::NEG_Y, probe_distance(body), layers)
        .map_or(Vec3::Y, |hit| hit.normal)
}

/// Angle between `normal` and world up, in degrees.
#[must_use]
pub fn surface_angle(normal: Vec3) -> f32 {
    normal.angle_between(Vec3::Y).to_degrees()
}

#[must_use]
pub fn is_walkable(normal: Vec3, slope_limit: f32) -> bool {
    surface_angle(normal) <= slope_limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::StaticWorld;
    use crate::settings::BodySettings;

    fn body_at(position: Vec3) -> KinematicBody {
        KinematicBody::new(position, &BodySettings::default())
    }

    #[test]
    fn flat_ground_under_a_resting_body_reports_up() {
        let world = StaticWorld::new().with_ground(0.0);
        let normal = sense_ground(&world, &body_at(Vec3::ZERO), LayerMask::GROUND);
        assert!((normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn nothing_in_reach_falls_back_to_up() {
        let world = StaticWorld::new().with_ground(-10.0);
        let normal = sense_ground(&world, &body_at(Vec3::ZERO), LayerMask::GROUND);
        assert_eq!(normal, Vec3::Y);
    }

    #[test]
    fn filtered_layers_are_not_sensed() {
        let slope = Vec3::new(60f32.to_radians().sin(), 60f32.to_radians().cos(), 0.0);
        let world = StaticWorld::new().with_plane(Vec3::ZERO, slope, 0b10);
        let body = body_at(Vec3::new(0.0, 0.2, 0.0));
        assert_eq!(sense_ground(&world, &body, LayerMask::GROUND), Vec3::Y);
        let sensed = sense_ground(&world, &body, LayerMask(0b10));
        assert!((surface_angle(sensed) - 60.0).abs() < 1e-3);
    }

    #[test]
    fn step_offset_extends_the_probe() {
        // Ground sits just past the bare half-height reach of the sweep.
        let mut body = body_at(Vec3::ZERO);
        let world = StaticWorld::new().with_plane(
            Vec3::new(0.0, -0.35, 0.0),
            Vec3::new(0.3, 1.0, 0.0).normalize(),
            LayerMask::GROUND.0,
        );
        body.step_offset = 0.0;
        assert_eq!(sense_ground(&world, &body, LayerMask::GROUND), Vec3::Y);
        body.step_offset = 0.3;
        assert_ne!(sense_ground(&world, &body, LayerMask::GROUND), Vec3::Y);
    }

    #[test]
    fn walkable_threshold_is_inclusive() {
        let normal = Quat::from_rotation_z(45f32.to_radians()) * Vec3::Y;
        assert!(is_walkable(normal, 45.001));
        assert!(!is_walkable(normal, 44.0));
    }
}
