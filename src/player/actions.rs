//! Gather and attack flags.
//!
//! A press sets the flag; the animation layer reports completion through
//! `finish_gather` / `finish_attack`. Leaving the ground always interrupts
//! both actions.

use serde::{Deserialize, Serialize};

use crate::input::LocomotionInput;
use crate::player::MovementState;

/// When a gather in progress is interrupted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionClearPolicy {
    /// Only jumping or falling interrupts it.
    #[default]
    Airborne,
    /// Any movement input interrupts it as well.
    AnyMovement,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionFlags {
    pub gathering: bool,
    pub attacking: bool,
}

impl ActionFlags {
    pub fn update(&mut self, input: &LocomotionInput, state: MovementState, policy: ActionClearPolicy) {
        if input.gather_pressed {
            self.gathering = true;
        }
        if input.attack_pressed {
            self.attacking = true;
        }

        if state.is_airborne() {
            self.gathering = false;
            self.attacking = false;
        } else if policy == ActionClearPolicy::AnyMovement && input.movement != bevy::math::Vec2::ZERO {
            self.gathering = false;
        }
    }

    pub fn finish_gather(&mut self) {
        self.gathering = false;
    }

    pub fn finish_attack(&mut self) {
        self.attacking = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    fn pressed() -> LocomotionInput {
        LocomotionInput {
            gather_pressed: true,
            attack_pressed: true,
            ..Default::default()
        }
    }

    #[test]
    fn presses_latch_until_finished() {
        let mut flags = ActionFlags::default();
        flags.update(&pressed(), MovementState::Idling, ActionClearPolicy::Airborne);
        flags.update(&LocomotionInput::default(), MovementState::Idling, ActionClearPolicy::Airborne);
        assert!(flags.gathering && flags.attacking);
        flags.finish_gather();
        assert!(!flags.gathering && flags.attacking);
        flags.finish_attack();
        assert_eq!(flags, ActionFlags::default());
    }

    #[test]
    fn leaving_the_ground_interrupts_both() {
        for policy in [ActionClearPolicy::Airborne, ActionClearPolicy::AnyMovement] {
            let mut flags = ActionFlags { gathering: true, attacking: true };
            flags.update(&LocomotionInput::default(), MovementState::Jumping, policy);
            assert_eq!(flags, ActionFlags::default());
        }
    }

    #[test]
    fn movement_only_interrupts_gather_under_any_movement() {
        let moving = LocomotionInput {
            movement: Vec2::new(0.0, 1.0),
            ..Default::default()
        };
        let mut flags = ActionFlags { gathering: true, attacking: true };
        flags.update(&moving, MovementState::Running, ActionClearPolicy::Airborne);
        assert!(flags.gathering);

        flags.update(&moving, MovementState::Running, ActionClearPolicy::AnyMovement);
        assert!(!flags.gathering);
        assert!(flags.attacking);
    }
}
