//! Per-frame input snapshot consumed by the player controller.
//!
//! An [`InputProvider`] produces a [`RawInput`] every frame (keyboard and
//! mouse through [`keyboard::KeyboardMousePlugin`], or a scripted sequence for
//! the demo and tests). [`InputLatch::snapshot`] then turns it into the
//! [`LocomotionInput`] the controller reads: movement clamped to unit length
//! and the sprint/walk toggles latched across frames.
pub mod keyboard;

use bevy::prelude::*;
use std::collections::VecDeque;

pub use keyboard::KeyboardMousePlugin;

/// Device-level input for one frame. Button fields are press edges unless
/// named `_held`.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct RawInput {
    /// x = right, y = forward.
    pub movement: Vec2,
    /// x = right, y = down.
    pub look: Vec2,
    /// Wheel delta; positive scrolls away from the user.
    pub scroll: f32,
    pub jump_pressed: bool,
    pub sprint_held: bool,
    pub sprint_pressed: bool,
    pub walk_pressed: bool,
    pub gather_pressed: bool,
    pub attack_pressed: bool,
    pub switch_camera_pressed: bool,
}

/// What the controller sees for one frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionInput {
    /// Magnitude never exceeds 1.
    pub movement: Vec2,
    pub look: Vec2,
    pub scroll: f32,
    pub jump_pressed: bool,
    /// Sprint is active, either held or toggled on.
    pub sprint_toggled_on: bool,
    pub walk_toggled_on: bool,
    pub gather_pressed: bool,
    pub attack_pressed: bool,
    pub switch_camera_pressed: bool,
}

/// Source of raw input, polled once per frame.
pub trait InputProvider {
    fn read(&mut self) -> RawInput;
}

/// Toggles that persist across frames.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputLatch {
    pub sprint_toggled_on: bool,
    pub walk_toggled_on: bool,
}

impl InputLatch {
    /// Fold this frame's `raw` input into the latched toggles.
    ///
    /// With `hold_to_sprint` the sprint flag mirrors the held button,
    /// otherwise each press flips it. Walk always toggles on press.
    pub fn snapshot(&mut self, raw: &RawInput, hold_to_sprint: bool) -> LocomotionInput {
        if hold_to_sprint {
            self.sprint_toggled_on = raw.sprint_held;
        } else if raw.sprint_pressed {
            self.sprint_toggled_on = !self.sprint_toggled_on;
        }
        if raw.walk_pressed {
            self.walk_toggled_on = !self.walk_toggled_on;
        }

        LocomotionInput {
            movement: raw.movement.clamp_length_max(1.0),
            look: raw.look,
            scroll: raw.scroll,
            jump_pressed: raw.jump_pressed,
            sprint_toggled_on: self.sprint_toggled_on,
            walk_toggled_on: self.walk_toggled_on,
            gather_pressed: raw.gather_pressed,
            attack_pressed: raw.attack_pressed,
            switch_camera_pressed: raw.switch_camera_pressed,
        }
    }
}

/// Replays a queue of frames, then reports no input.
#[derive(Resource, Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<RawInput>,
}

impl ScriptedInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `frame` `count` times.
    #[must_use]
    pub fn then(mut self, frame: RawInput, count: usize) -> Self {
        self.frames.extend(std::iter::repeat(frame).take(count));
        self
    }

    pub fn push(&mut self, frame: RawInput) {
        self.frames.push_back(frame);
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }
}

impl InputProvider for ScriptedInput {
    fn read(&mut self) -> RawInput {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Systems that fill [`RawInput`] run in `Read`; the latch runs in `Latch`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputSet {
    Read,
    Latch,
}

/// Feed [`RawInput`] from a [`ScriptedInput`] resource.
pub fn read_scripted_input(mut script: ResMut<ScriptedInput>, mut raw: ResMut<RawInput>) {
    *raw = script.read();
}

/// Build this frame's [`LocomotionInput`] from [`RawInput`].
#[allow(clippy::needless_pass_by_value)]
pub fn latch_input(
    raw: Res<RawInput>,
    settings: Res<crate::settings::Settings>,
    mut latch: ResMut<InputLatch>,
    mut input: ResMut<LocomotionInput>,
) {
    *input = latch.snapshot(&raw, settings.controls.hold_to_sprint);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_is_clamped_to_unit_length() {
        let mut latch = InputLatch::default();
        let raw = RawInput { movement: Vec2::new(1.0, 1.0), ..Default::default() };
        let input = latch.snapshot(&raw, true);
        assert!((input.movement.length() - 1.0).abs() < 1e-6);

        let small = RawInput { movement: Vec2::new(0.3, 0.0), ..Default::default() };
        assert_eq!(latch.snapshot(&small, true).movement, Vec2::new(0.3, 0.0));
    }

    #[test]
    fn hold_to_sprint_mirrors_the_button() {
        let mut latch = InputLatch::default();
        let held = RawInput { sprint_held: true, sprint_pressed: true, ..Default::default() };
        assert!(latch.snapshot(&held, true).sprint_toggled_on);
        assert!(!latch.snapshot(&RawInput::default(), true).sprint_toggled_on);
    }

    #[test]
    fn toggles_flip_on_press_and_persist() {
        let mut latch = InputLatch::default();
        let press = RawInput { sprint_pressed: true, walk_pressed: true, ..Default::default() };
        let first = latch.snapshot(&press, false);
        assert!(first.sprint_toggled_on && first.walk_toggled_on);
        let idle = latch.snapshot(&RawInput::default(), false);
        assert!(idle.sprint_toggled_on && idle.walk_toggled_on);
        let second = latch.snapshot(&press, false);
        assert!(!second.sprint_toggled_on && !second.walk_toggled_on);
    }

    #[test]
    fn scripted_input_runs_dry_into_defaults() {
        let jump = RawInput { jump_pressed: true, ..Default::default() };
        let mut script = ScriptedInput::new().then(jump, 2);
        assert_eq!(script.remaining(), 2);
        assert!(script.read().jump_pressed);
        assert!(script.read().jump_pressed);
        assert!(script.is_finished());
        assert_eq!(script.read(), RawInput::default());
    }
}
