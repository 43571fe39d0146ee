//! Kinematic capsule body and the collision queries the controller relies on.
//!
//! The controller never talks to a physics engine directly. Everything it
//! needs goes through [`CollisionWorld`]: a downward sphere sweep for the
//! ground sensor, a sphere overlap for the grounded test, and exactly one
//! capsule move per frame. [`StaticWorld`] is a small reference
//! implementation used by the demo, the tests and the benchmarks.
pub mod sensor;
pub mod world;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub use sensor::*;
pub use world::*;

use crate::settings::BodySettings;

/// Bitmask selecting which collider layers a query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    /// Default layer for walkable world geometry.
    pub const GROUND: LayerMask = LayerMask(1);

    /// `true` if any bit of `layer` is selected by this mask.
    #[must_use]
    pub fn contains(self, layer: u32) -> bool {
        self.0 & layer != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::GROUND
    }
}

/// Result of a sphere sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Distance travelled along the sweep direction before contact.
    pub distance: f32,
    /// Contact point on the surface.
    pub point: Vec3,
    /// Surface normal at the contact point (unit length).
    pub normal: Vec3,
}

/// Collision queries and the single authoritative move of a capsule body.
pub trait CollisionWorld {
    /// Sweep a sphere from `origin` along `direction` for at most `max_distance`.
    ///
    /// Colliders the sphere already overlaps at `origin` are ignored, so a
    /// sweep started inside geometry only reports surfaces further along.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<SweepHit>;

    /// `true` if a sphere at `center` intersects any collider in `layers`.
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: LayerMask) -> bool;

    /// Move `body` by `motion`, resolving collisions.
    ///
    /// Implementations must update `body.position`, set `body.velocity` to the
    /// displacement actually achieved divided by `dt`, and refresh
    /// `body.touching_ground`.
    fn move_capsule(&mut self, body: &mut KinematicBody, motion: Vec3, layers: LayerMask, dt: f32);
}

/// Capsule collider driven kinematically by the player controller.
///
/// `position` is the base of the capsule (the character's feet); the capsule
/// centre sits `half_height` above it.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct KinematicBody {
    pub position: Vec3,
    pub radius: f32,
    pub half_height: f32,
    /// Maximum ledge height climbed automatically. Zeroed while airborne.
    pub step_offset: f32,
    /// Maximum walkable surface angle, in degrees.
    pub slope_limit: f32,
    /// Velocity achieved by the last move.
    pub velocity: Vec3,
    /// Whether the last move ended in contact with the ground below.
    pub touching_ground: bool,
}

impl KinematicBody {
    #[must_use]
    pub fn new(position: Vec3, settings: &BodySettings) -> Self {
        Self {
            position,
            radius: settings.radius,
            half_height: settings.half_height,
            step_offset: settings.step_offset,
            slope_limit: settings.slope_limit,
            velocity: Vec3::ZERO,
            touching_ground: false,
        }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.position + Vec3::Y * self.half_height
    }

    /// Centre of the sphere forming the bottom cap.
    #[must_use]
    pub fn bottom_sphere(&self) -> Vec3 {
        self.position + Vec3::Y * self.radius
    }

    /// Centre of the sphere forming the top cap.
    #[must_use]
    pub fn top_sphere(&self) -> Vec3 {
        self.position + Vec3::Y * (2.0 * self.half_height - self.radius).max(self.radius)
    }

    #[must_use]
    pub fn horizontal_velocity(&self) -> Vec3 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z)
    }

    #[must_use]
    pub fn horizontal_speed(&self) -> f32 {
        self.horizontal_velocity().length()
    }
}
