//! Reconciling the character's facing with the camera's facing.
//!
//! While the character moves (or the camera is first person) its yaw follows
//! the camera every frame. While idling it only turns once the camera is more
//! than `rotation_tolerance` degrees away, and then keeps turning for
//! `rotate_to_target_time` seconds in the direction it latched when the snap
//! started. The latch is what stops the body from swinging back and forth when
//! the camera hovers around 180 degrees behind it.

use bevy::prelude::*;

use crate::player::PlayerLook;
use crate::settings::RotationSettings;

/// Wrap an angle in degrees into (-180, 180].
#[must_use]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Direction of an idle snap, seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    /// Counter-clockwise; the camera is to the character's left.
    Left,
    /// Clockwise; the camera is to the character's right.
    Right,
}

impl TurnDirection {
    #[must_use]
    pub fn of_mismatch(mismatch: f32) -> Self {
        if mismatch >= 0.0 {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Which rotation rule applied on the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationPhase {
    #[default]
    Following,
    IdleHold,
    IdleSnapping,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationState {
    /// Yaw-only orientation of the character.
    pub character: Quat,
    /// Signed camera-minus-character yaw in (-180, 180]; positive when the
    /// camera looks to the character's left.
    pub mismatch: f32,
    previous_mismatch: f32,
    pub is_rotating_to_target: bool,
    latched: Option<TurnDirection>,
    timer: f32,
    phase: RotationPhase,
    camera_rotation: Quat,
    camera_forward: Vec3,
    camera_right: Vec3,
}

impl RotationState {
    #[must_use]
    pub fn new(look: &PlayerLook) -> Self {
        let mut state = Self {
            character: look.yaw_rotation(),
            mismatch: 0.0,
            previous_mismatch: 0.0,
            is_rotating_to_target: false,
            latched: None,
            timer: 0.0,
            phase: RotationPhase::Following,
            camera_rotation: Quat::IDENTITY,
            camera_forward: Vec3::NEG_Z,
            camera_right: Vec3::X,
        };
        state.refresh(look);
        state.previous_mismatch = state.mismatch;
        state
    }

    #[must_use]
    pub fn phase(&self) -> RotationPhase {
        self.phase
    }

    #[must_use]
    pub fn latched_direction(&self) -> Option<TurnDirection> {
        self.latched
    }

    /// Seconds left on the idle snap.
    #[must_use]
    pub fn timer(&self) -> f32 {
        self.timer
    }

    #[must_use]
    pub fn camera_rotation(&self) -> Quat {
        self.camera_rotation
    }

    /// Camera forward flattened onto the ground plane.
    #[must_use]
    pub fn camera_forward(&self) -> Vec3 {
        self.camera_forward
    }

    #[must_use]
    pub fn camera_right(&self) -> Vec3 {
        self.camera_right
    }

    #[must_use]
    pub fn character_forward(&self) -> Vec3 {
        self.character * Vec3::NEG_Z
    }

    fn crossed_zero(&self) -> bool {
        TurnDirection::of_mismatch(self.previous_mismatch) != TurnDirection::of_mismatch(self.mismatch)
            && (self.previous_mismatch - self.mismatch).abs() < 180.0
    }

    fn turn_toward(&mut self, target: Quat, settings: &RotationSettings, dt: f32) {
        let t = (settings.rotation_speed * dt).min(1.0);
        self.character = self.character.slerp(target, t).normalize();
    }

    /// Advance the facing rules by one frame using the mismatch measured at
    /// the end of the previous frame.
    ///
    /// # Arguments
    /// * `look` - camera yaw/pitch after this frame's look input
    /// * `idling` - the character is in the `Idling` state
    /// * `first_person` - a first-person camera is active
    pub fn reconcile(
        &mut self,
        look: &PlayerLook,
        idling: bool,
        first_person: bool,
        settings: &RotationSettings,
        dt: f32,
    ) {
        let target = look.yaw_rotation();

        if first_person || !idling {
            self.timer = 0.0;
            self.latched = None;
            self.phase = RotationPhase::Following;
            self.turn_toward(target, settings, dt);
            self.is_rotating_to_target = false;
            return;
        }

        let beyond_tolerance = self.mismatch.abs() > settings.rotation_tolerance;
        if !beyond_tolerance && self.timer <= 0.0 {
            self.phase = RotationPhase::IdleHold;
            self.is_rotating_to_target = false;
            return;
        }

        if beyond_tolerance {
            let wanted = TurnDirection::of_mismatch(self.mismatch);
            let may_relatch = self.latched.is_none() || self.timer <= 0.0 || self.crossed_zero();
            if may_relatch {
                self.latched = Some(wanted);
            }
            if self.latched == Some(wanted) {
                self.timer = settings.rotate_to_target_time;
            }
        }

        self.timer -= dt;

        if self.latched == Some(TurnDirection::of_mismatch(self.mismatch)) && self.mismatch != 0.0 {
            self.phase = RotationPhase::IdleSnapping;
            self.turn_toward(target, settings, dt);
        } else {
            self.phase = RotationPhase::IdleHold;
        }
        self.is_rotating_to_target = self.timer > 0.0;
    }

    /// Rebuild the camera orientation and basis and re-measure the mismatch.
    pub fn refresh(&mut self, look: &PlayerLook) {
        self.camera_rotation = look.rotation();
        let yaw = look.yaw_rotation();
        self.camera_forward = yaw * Vec3::NEG_Z;
        self.camera_right = yaw * Vec3::X;

        let character_forward = self.character_forward();
        let sign = if character_forward.cross(self.camera_forward).y >= 0.0 { 1.0 } else { -1.0 };
        let angle = character_forward.angle_between(self.camera_forward).to_degrees();
        self.previous_mismatch = self.mismatch;
        self.mismatch = wrap_degrees(sign * angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn frame(state: &mut RotationState, look: &PlayerLook, idling: bool) {
        state.reconcile(look, idling, false, &RotationSettings::default(), DT);
        state.refresh(look);
    }

    #[test]
    fn wrapping_stays_in_the_half_open_range() {
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
        for i in -50..50 {
            let w = wrap_degrees(i as f32 * 37.3);
            assert!(w > -180.0 && w <= 180.0);
        }
    }

    #[test]
    fn mismatch_sign_follows_the_camera_side() {
        let mut state = RotationState::new(&PlayerLook::new(0.0));
        state.refresh(&PlayerLook::new(30.0));
        assert!((state.mismatch - 30.0).abs() < 1e-3);
        state.refresh(&PlayerLook::new(-30.0));
        assert!((state.mismatch + 30.0).abs() < 1e-3);
        state.refresh(&PlayerLook::new(200.0));
        assert!((state.mismatch + 160.0).abs() < 1e-2);
    }

    #[test]
    fn moving_characters_follow_the_camera() {
        let look = PlayerLook::new(60.0);
        let mut state = RotationState::new(&PlayerLook::new(0.0));
        state.refresh(&look);
        for _ in 0..120 {
            frame(&mut state, &look, false);
            assert_eq!(state.phase(), RotationPhase::Following);
        }
        assert!(state.mismatch.abs() < 0.1);
    }

    #[test]
    fn idle_characters_ignore_small_mismatches() {
        let look = PlayerLook::new(60.0);
        let mut state = RotationState::new(&PlayerLook::new(0.0));
        state.refresh(&look);
        let before = state.character;
        for _ in 0..60 {
            frame(&mut state, &look, true);
        }
        assert_eq!(state.character, before);
        assert_eq!(state.phase(), RotationPhase::IdleHold);
        assert!(!state.is_rotating_to_target);
    }

    #[test]
    fn idle_snap_keeps_its_direction_until_the_timer_expires() {
        let settings = RotationSettings::default();
        let mut state = RotationState::new(&PlayerLook::new(0.0));
        // camera swings 170 degrees to the left
        let mut look = PlayerLook::new(170.0);
        state.refresh(&look);
        frame(&mut state, &look, true);
        assert_eq!(state.latched_direction(), Some(TurnDirection::Left));
        assert!(state.is_rotating_to_target);

        // camera jumps across the back so the live mismatch now says "right"
        look.yaw += 60.0;
        state.refresh(&look);
        assert!(state.mismatch < -settings.rotation_tolerance);
        let held = state.character;
        frame(&mut state, &look, true);
        assert_eq!(state.latched_direction(), Some(TurnDirection::Left));
        assert_eq!(state.phase(), RotationPhase::IdleHold);
        assert_eq!(state.character, held);

        // once the snap timer runs out the latch may flip
        let mut frames = 0;
        while state.latched_direction() == Some(TurnDirection::Left) {
            frame(&mut state, &look, true);
            frames += 1;
            assert!(frames < 120, "latch never released");
        }
        assert_eq!(state.latched_direction(), Some(TurnDirection::Right));
    }

    fn character_yaw(state: &RotationState) -> f32 {
        state.character.to_euler(EulerRot::YXZ).0.to_degrees()
    }

    /// Latch Left with the camera 120 degrees to the left, then bring the
    /// mismatch back to +30 while the snap timer still runs.
    fn latched_left_then_near_zero() -> RotationState {
        let mut state = RotationState::new(&PlayerLook::new(0.0));
        let look = PlayerLook::new(120.0);
        state.refresh(&look);
        frame(&mut state, &look, true);
        assert_eq!(state.latched_direction(), Some(TurnDirection::Left));

        let look = PlayerLook::new(character_yaw(&state) + 30.0);
        state.refresh(&look);
        frame(&mut state, &look, true);
        assert!(state.mismatch > 0.0 && state.mismatch < 30.0);
        assert_eq!(state.latched_direction(), Some(TurnDirection::Left));
        state
    }

    #[test]
    fn crossing_zero_lets_the_latch_flip_before_the_timer_expires() {
        let mut state = latched_left_then_near_zero();
        let look = PlayerLook::new(character_yaw(&state) - 100.0);
        state.refresh(&look);
        assert!(state.timer() > 0.0);
        frame(&mut state, &look, true);
        assert_eq!(state.latched_direction(), Some(TurnDirection::Right));
        assert_eq!(state.phase(), RotationPhase::IdleSnapping);
        assert!(state.is_rotating_to_target);
    }

    #[test]
    fn swinging_through_the_back_keeps_the_latch() {
        let mut state = RotationState::new(&PlayerLook::new(0.0));
        let look = PlayerLook::new(120.0);
        state.refresh(&look);
        frame(&mut state, &look, true);
        assert_eq!(state.latched_direction(), Some(TurnDirection::Left));
        assert!(state.mismatch > 90.0);

        // +100 to -150 is a 250 degree step, so it went round the back
        let look = PlayerLook::new(character_yaw(&state) - 150.0);
        state.refresh(&look);
        let held = state.character;
        frame(&mut state, &look, true);
        assert_eq!(state.latched_direction(), Some(TurnDirection::Left));
        assert_eq!(state.phase(), RotationPhase::IdleHold);
        assert_eq!(state.character, held);
    }
}
