//! Camera rig: the view the controller steers by, first/third person
//! switching and third-person zoom.
//!
//! The controller only ever reads a [`CameraView`]. Which virtual camera is
//! live is decided by [`CameraSwitcher`] using priorities: the active camera
//! gets [`ACTIVE_PRIORITY`], every other one [`INACTIVE_PRIORITY`].

use bevy::prelude::*;

use crate::settings::CameraSettings;

pub const ACTIVE_PRIORITY: i32 = 10;
pub const INACTIVE_PRIORITY: i32 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraMode {
    FirstPerson,
    #[default]
    ThirdPerson,
}

/// Forward and right vectors of the active camera plus its mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub forward: Vec3,
    pub right: Vec3,
    pub mode: CameraMode,
}

impl Default for CameraView {
    fn default() -> Self {
        Self::from_rotation(Quat::IDENTITY, CameraMode::default())
    }
}

impl CameraView {
    #[must_use]
    pub fn from_rotation(rotation: Quat, mode: CameraMode) -> Self {
        Self {
            forward: rotation * Vec3::NEG_Z,
            right: rotation * Vec3::X,
            mode,
        }
    }

    /// Forward and right projected onto the ground plane and normalized.
    /// A vector with no horizontal component comes back as zero.
    #[must_use]
    pub fn horizontal_basis(&self) -> (Vec3, Vec3) {
        let flatten = |v: Vec3| Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
        (flatten(self.forward), flatten(self.right))
    }

    #[must_use]
    pub fn is_first_person(&self) -> bool {
        self.mode == CameraMode::FirstPerson
    }
}

/// Marks the entity whose transform is driven as the player's camera.
#[derive(Component, Debug, Default)]
pub struct PlayerCamera;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualCamera {
    pub name: String,
    pub priority: i32,
}

/// Ordered list of virtual cameras; index 0 is the first-person camera.
#[derive(Resource, Debug, Clone, Default)]
pub struct CameraSwitcher {
    cameras: Vec<VirtualCamera>,
    active: usize,
}

impl CameraSwitcher {
    /// Build a switcher with the first camera active.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut switcher = Self {
            cameras: names
                .into_iter()
                .map(|name| VirtualCamera { name: name.into(), priority: INACTIVE_PRIORITY })
                .collect(),
            active: 0,
        };
        switcher.apply_priorities();
        switcher
    }

    /// First-person camera followed by the third-person one.
    #[must_use]
    pub fn first_and_third_person() -> Self {
        Self::new(["first_person", "third_person"])
    }

    fn apply_priorities(&mut self) {
        for (index, camera) in self.cameras.iter_mut().enumerate() {
            camera.priority = if index == self.active { ACTIVE_PRIORITY } else { INACTIVE_PRIORITY };
        }
    }

    /// Make `index` the live camera. Out-of-range indices are ignored.
    pub fn activate(&mut self, index: usize) {
        if index < self.cameras.len() {
            self.active = index;
            self.apply_priorities();
        }
    }

    /// Activate the next camera in order, wrapping around.
    pub fn switch_to_next(&mut self) {
        if self.cameras.is_empty() {
            warn!("no cameras registered with the camera switcher");
            return;
        }
        self.activate((self.active + 1) % self.cameras.len());
    }

    #[must_use]
    pub fn active(&self) -> Option<&VirtualCamera> {
        self.cameras.get(self.active)
    }

    #[must_use]
    pub fn cameras(&self) -> &[VirtualCamera] {
        &self.cameras
    }

    #[must_use]
    pub fn is_first_person_active(&self) -> bool {
        !self.cameras.is_empty() && self.active == 0
    }

    #[must_use]
    pub fn mode(&self) -> CameraMode {
        if self.is_first_person_active() {
            CameraMode::FirstPerson
        } else {
            CameraMode::ThirdPerson
        }
    }
}

/// Third-person follow distance.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ThirdPersonZoom {
    pub distance: f32,
}

impl ThirdPersonZoom {
    #[must_use]
    pub fn new(settings: &CameraSettings) -> Self {
        Self {
            distance: settings.follow_distance.clamp(settings.min_zoom, settings.max_zoom),
        }
    }

    /// Step the distance one `zoom_speed` against the wheel direction.
    /// Scrolling away from the user pulls the camera in.
    pub fn apply_scroll(&mut self, scroll: f32, settings: &CameraSettings) {
        if scroll == 0.0 || !scroll.is_finite() {
            return;
        }
        let delta = -scroll.signum() * settings.zoom_speed;
        self.distance = (self.distance + delta).clamp(settings.min_zoom, settings.max_zoom);
    }
}

/// Where the camera sits for a character standing at `feet`.
#[must_use]
pub fn follow_position(
    feet: Vec3,
    camera_rotation: Quat,
    mode: CameraMode,
    zoom: Option<&ThirdPersonZoom>,
    settings: &CameraSettings,
) -> Vec3 {
    let eye = feet + Vec3::Y * settings.eye_height;
    match mode {
        CameraMode::FirstPerson => eye,
        CameraMode::ThirdPerson => {
            let distance = zoom.map_or(settings.follow_distance, |z| z.distance);
            eye - camera_rotation * Vec3::NEG_Z * distance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_cycles_and_moves_priority() {
        let mut switcher = CameraSwitcher::new(["fp", "tp", "overhead"]);
        assert!(switcher.is_first_person_active());
        assert_eq!(switcher.cameras()[0].priority, ACTIVE_PRIORITY);
        assert_eq!(switcher.cameras()[1].priority, INACTIVE_PRIORITY);

        switcher.switch_to_next();
        assert_eq!(switcher.active().map(|c| c.name.as_str()), Some("tp"));
        assert_eq!(switcher.mode(), CameraMode::ThirdPerson);
        assert_eq!(switcher.cameras()[0].priority, INACTIVE_PRIORITY);
        assert_eq!(switcher.cameras()[1].priority, ACTIVE_PRIORITY);

        switcher.switch_to_next();
        switcher.switch_to_next();
        assert!(switcher.is_first_person_active());
        let live: Vec<_> = switcher.cameras().iter().filter(|c| c.priority == ACTIVE_PRIORITY).collect();
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn empty_switcher_does_nothing() {
        let mut switcher = CameraSwitcher::default();
        switcher.switch_to_next();
        assert!(switcher.active().is_none());
        assert!(!switcher.is_first_person_active());
        assert_eq!(switcher.mode(), CameraMode::ThirdPerson);
    }

    #[test]
    fn zoom_steps_against_the_wheel_and_clamps() {
        let settings = CameraSettings::default();
        let mut zoom = ThirdPersonZoom::new(&settings);
        assert_eq!(zoom.distance, 3.0);
        zoom.apply_scroll(120.0, &settings);
        assert!((zoom.distance - 2.9).abs() < 1e-5);
        zoom.apply_scroll(-0.5, &settings);
        assert!((zoom.distance - 3.0).abs() < 1e-5);
        zoom.apply_scroll(0.0, &settings);
        assert!((zoom.distance - 3.0).abs() < 1e-5);

        for _ in 0..100 {
            zoom.apply_scroll(1.0, &settings);
        }
        assert_eq!(zoom.distance, settings.min_zoom);
        for _ in 0..100 {
            zoom.apply_scroll(-1.0, &settings);
        }
        assert_eq!(zoom.distance, settings.max_zoom);
    }

    #[test]
    fn third_person_sits_behind_the_eye() {
        let settings = CameraSettings::default();
        let zoom = ThirdPersonZoom { distance: 2.0 };
        let feet = Vec3::new(1.0, 0.0, 1.0);
        let fp = follow_position(feet, Quat::IDENTITY, CameraMode::FirstPerson, Some(&zoom), &settings);
        assert_eq!(fp, feet + Vec3::Y * settings.eye_height);
        let tp = follow_position(feet, Quat::IDENTITY, CameraMode::ThirdPerson, Some(&zoom), &settings);
        assert!((tp - (fp + Vec3::Z * 2.0)).length() < 1e-6);
    }

    #[test]
    fn horizontal_basis_stays_on_the_ground_plane() {
        let view = CameraView::from_rotation(Quat::from_rotation_x(-60f32.to_radians()), CameraMode::FirstPerson);
        let (forward, right) = view.horizontal_basis();
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
        assert!((right - Vec3::X).length() < 1e-5);
        assert!(view.is_first_person());
    }
}
