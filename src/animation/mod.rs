//! Typed animation parameters.
//!
//! The controller publishes an [`AnimationParams`] value each frame; whatever
//! drives the character's animation graph implements [`AnimationSink`] and
//! maps the fields onto its own parameters.

use bevy::prelude::*;

use crate::input::LocomotionInput;
use crate::player::{MovementState, PlayerController};
use crate::settings::AnimationSettings;

const SPRINT_MAX_BLEND: f32 = 1.5;
const RUN_MAX_BLEND: f32 = 1.0;
const WALK_MAX_BLEND: f32 = 0.5;
const AIRBORNE_MAX_BLEND: f32 = 1.0;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationParams {
    pub grounded: bool,
    pub idling: bool,
    pub falling: bool,
    pub jumping: bool,
    pub rotating_to_target: bool,
    pub attacking: bool,
    pub gathering: bool,
    pub playing_action: bool,
    pub blend_x: f32,
    pub blend_y: f32,
    pub blend_magnitude: f32,
    pub rotation_mismatch: f32,
}

/// Consumer of per-frame animation parameters.
pub trait AnimationSink {
    fn apply(&mut self, params: &AnimationParams);
}

impl AnimationSink for AnimationParams {
    fn apply(&mut self, params: &AnimationParams) {
        *self = *params;
    }
}

/// Upper bound of the locomotion blend for `state`.
#[must_use]
pub fn max_blend(state: MovementState) -> f32 {
    match state {
        MovementState::Sprinting => SPRINT_MAX_BLEND,
        MovementState::Running => RUN_MAX_BLEND,
        MovementState::Walking => WALK_MAX_BLEND,
        MovementState::Jumping | MovementState::Falling => AIRBORNE_MAX_BLEND,
        MovementState::Idling | MovementState::Strafing => 0.0,
    }
}

/// Smooths the locomotion blend between frames.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationDriver {
    blend: Vec2,
}

impl AnimationDriver {
    #[must_use]
    pub fn blend(&self) -> Vec2 {
        self.blend
    }

    /// Compute this frame's parameters from the controller.
    pub fn update(
        &mut self,
        controller: &PlayerController,
        input: &LocomotionInput,
        settings: &AnimationSettings,
        dt: f32,
    ) -> AnimationParams {
        let state = controller.state();
        let target = input.movement * max_blend(state);
        let t = (settings.locomotion_blend_speed * dt).clamp(0.0, 1.0);
        self.blend = self.blend.lerp(target, t);

        let actions = controller.actions();
        AnimationParams {
            grounded: state.is_grounded_state(),
            idling: state == MovementState::Idling,
            falling: state == MovementState::Falling,
            jumping: state == MovementState::Jumping,
            rotating_to_target: controller.rotation().is_rotating_to_target,
            attacking: actions.attacking,
            gathering: actions.gathering,
            playing_action: actions.gathering,
            blend_x: self.blend.x,
            blend_y: self.blend.y,
            blend_magnitude: self.blend.length(),
            rotation_mismatch: controller.rotation().mismatch,
        }
    }

    /// Compute the parameters and hand them to `sink`.
    pub fn drive<S: AnimationSink + ?Sized>(
        &mut self,
        controller: &PlayerController,
        input: &LocomotionInput,
        settings: &AnimationSettings,
        dt: f32,
        sink: &mut S,
    ) {
        let params = self.update(controller, input, settings, dt);
        sink.apply(&params);
    }
}
