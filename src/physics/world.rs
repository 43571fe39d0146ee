//! Reference collision world made of half-spaces and axis-aligned boxes.
//!
//! Sweeps are analytic. Box sweeps use the box expanded by the sphere radius,
//! which treats the rounded corners of the swept volume as square; that is
//! conservative by at most `radius * (sqrt(3) - 1)` at a corner and never
//! misses a face hit. Capsule moves are sub-stepped and resolved by pushing
//! the spheres that make up the capsule out of every collider they touch.

use bevy::prelude::*;

use super::{is_walkable, CollisionWorld, KinematicBody, LayerMask, SweepHit};

/// Separation kept between a resolved body and the surface it touched.
const SKIN: f32 = 1e-4;
const MAX_SUBSTEPS: usize = 32;
const SOLVER_ITERATIONS: usize = 4;
/// Contacts under the bottom cap whose normal points at least this far up
/// count as ground contact.
const GROUND_NORMAL_MIN_Y: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Solid half-space on the negative side of `normal · p = offset`.
    Plane { normal: Vec3, offset: f32 },
    /// Solid axis-aligned box.
    Cuboid { min: Vec3, max: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub shape: Shape,
    /// Layer bits matched against a query's [`LayerMask`].
    pub layer: u32,
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    normal: Vec3,
    depth: f32,
}

impl Collider {
    fn penetration(&self, center: Vec3, radius: f32) -> Option<Contact> {
        match self.shape {
            Shape::Plane { normal, offset } => {
                let separation = normal.dot(center) - offset;
                (separation < radius).then_some(Contact {
                    normal,
                    depth: radius - separation,
                })
            }
            Shape::Cuboid { min, max } => {
                let closest = center.clamp(min, max);
                let delta = center - closest;
                let dist_sq = delta.length_squared();
                if dist_sq > 0.0 {
                    if dist_sq >= radius * radius {
                        return None;
                    }
                    let dist = dist_sq.sqrt();
                    return Some(Contact {
                        normal: delta / dist,
                        depth: radius - dist,
                    });
                }
                // centre is inside the box: leave through the nearest face
                [
                    (center.x - min.x, Vec3::NEG_X),
                    (max.x - center.x, Vec3::X),
                    (center.y - min.y, Vec3::NEG_Y),
                    (max.y - center.y, Vec3::Y),
                    (center.z - min.z, Vec3::NEG_Z),
                    (max.z - center.z, Vec3::Z),
                ]
                .into_iter()
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(dist, normal)| Contact {
                    normal,
                    depth: dist + radius,
                })
            }
        }
    }

    fn sweep(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<SweepHit> {
        if self.penetration(origin, radius).is_some() {
            return None;
        }
        match self.shape {
            Shape::Plane { normal, offset } => {
                let separation = normal.dot(origin) - offset;
                let approach = normal.dot(direction);
                if approach >= 0.0 {
                    return None;
                }
                let distance = (separation - radius) / -approach;
                (distance <= max_distance).then(|| SweepHit {
                    distance,
                    point: origin + direction * distance - normal * radius,
                    normal,
                })
            }
            Shape::Cuboid { min, max } => {
                let lo = min - Vec3::splat(radius);
                let hi = max + Vec3::splat(radius);
                let mut enter = 0.0f32;
                let mut exit = max_distance;
                let mut normal = Vec3::ZERO;
                for axis in 0..3 {
                    let o = origin[axis];
                    let d = direction[axis];
                    if d.abs() < f32::EPSILON {
                        if o < lo[axis] || o > hi[axis] {
                            return None;
                        }
                        continue;
                    }
                    let mut near = (lo[axis] - o) / d;
                    let mut far = (hi[axis] - o) / d;
                    if near > far {
                        std::mem::swap(&mut near, &mut far);
                    }
                    if near > enter {
                        enter = near;
                        normal = Vec3::ZERO;
                        normal[axis] = -d.signum();
                    }
                    exit = exit.min(far);
                    if enter > exit {
                        return None;
                    }
                }
                // started inside the expanded corner region without touching
                if normal == Vec3::ZERO {
                    return None;
                }
                let center = origin + direction * enter;
                Some(SweepHit {
                    distance: enter,
                    point: center.clamp(min, max),
                    normal,
                })
            }
        }
    }

    /// Height to lift the body to when the bottom cap bumps into a ledge it
    /// may step onto.
    fn step_top(&self, contact: &Contact, body: &KinematicBody) -> Option<f32> {
        let Shape::Cuboid { max, .. } = self.shape else {
            return None;
        };
        if body.step_offset <= 0.0 || is_walkable(contact.normal, body.slope_limit) {
            return None;
        }
        let rise = max.y - body.position.y;
        (rise > 0.0 && rise <= body.step_offset).then_some(max.y)
    }
}

/// Static collision geometry.
#[derive(Resource, Debug, Clone, Default)]
pub struct StaticWorld {
    colliders: Vec<Collider>,
}

impl StaticWorld {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an infinite flat ground at `height` on the ground layer.
    #[must_use]
    pub fn with_ground(self, height: f32) -> Self {
        self.with_plane(Vec3::new(0.0, height, 0.0), Vec3::Y, LayerMask::GROUND.0)
    }

    /// Add a half-space whose surface passes through `point`, solid opposite `normal`.
    #[must_use]
    pub fn with_plane(mut self, point: Vec3, normal: Vec3, layer: u32) -> Self {
        let normal = normal.try_normalize().unwrap_or(Vec3::Y);
        self.push(Collider {
            shape: Shape::Plane {
                normal,
                offset: normal.dot(point),
            },
            layer,
        });
        self
    }

    #[must_use]
    pub fn with_cuboid(mut self, min: Vec3, max: Vec3, layer: u32) -> Self {
        self.push(Collider {
            shape: Shape::Cuboid {
                min: min.min(max),
                max: min.max(max),
            },
            layer,
        });
        self
    }

    pub fn push(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    #[must_use]
    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    fn filtered(&self, layers: LayerMask) -> impl Iterator<Item = &Collider> {
        self.colliders.iter().filter(move |c| layers.contains(c.layer))
    }

    /// Push `body` out of everything it intersects. Returns whether the bottom
    /// cap rested on an up-facing surface.
    fn resolve(&self, body: &mut KinematicBody, layers: LayerMask) -> bool {
        let mut grounded = false;
        for _ in 0..SOLVER_ITERATIONS {
            let mut clear = true;
            for collider in self.filtered(layers) {
                for (index, height) in sphere_heights(body).into_iter().enumerate() {
                    let center = body.position + Vec3::Y * height;
                    let Some(contact) = collider.penetration(center, body.radius) else {
                        continue;
                    };
                    clear = false;
                    if index == 0 {
                        if let Some(top) = collider.step_top(&contact, body) {
                            body.position.y = top + SKIN;
                            continue;
                        }
                        if contact.normal.y > GROUND_NORMAL_MIN_Y {
                            grounded = true;
                        }
                        if is_walkable(contact.normal, body.slope_limit) {
                            // walkable contacts resolve vertically so the body does not creep downhill
                            body.position.y += contact.depth / contact.normal.y + SKIN;
                            continue;
                        }
                    }
                    body.position += contact.normal * (contact.depth + SKIN);
                }
            }
            if clear {
                break;
            }
        }
        grounded
    }
}

/// Heights above the feet of the spheres covering the capsule, bottom cap first.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn sphere_heights(body: &KinematicBody) -> Vec<f32> {
    let bottom = body.radius;
    let span = body.top_sphere().y - body.bottom_sphere().y;
    if span <= 0.0 || body.radius <= 0.0 {
        return vec![bottom];
    }
    let count = (span / body.radius).ceil() as usize + 1;
    (0..count)
        .map(|i| bottom + span * i as f32 / (count - 1) as f32)
        .collect()
}

impl CollisionWorld for StaticWorld {
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<SweepHit> {
        let direction = direction.try_normalize()?;
        self.filtered(layers)
            .filter_map(|c| c.sweep(origin, radius, direction, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: LayerMask) -> bool {
        self.filtered(layers).any(|c| c.penetration(center, radius).is_some())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn move_capsule(&mut self, body: &mut KinematicBody, motion: Vec3, layers: LayerMask, dt: f32) {
        let start = body.position;
        let max_step = (body.radius * 0.5).max(SKIN);
        let substeps = ((motion.length() / max_step).ceil() as usize).clamp(1, MAX_SUBSTEPS);
        let step = motion / substeps as f32;

        let mut grounded = false;
        for _ in 0..substeps {
            body.position += step;
            grounded |= self.resolve(body, layers);
        }

        body.velocity = if dt > 0.0 { (body.position - start) / dt } else { Vec3::ZERO };
        body.touching_ground = grounded;
    }
}
