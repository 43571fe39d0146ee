//! Movement states and the grounded/airborne classification rules.

use serde::{Deserialize, Serialize};

/// What the character is doing this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementState {
    #[default]
    Idling,
    Walking,
    Running,
    Sprinting,
    Jumping,
    Falling,
    /// Reserved for lock-on movement. The classifier never produces it.
    Strafing,
}

impl MovementState {
    /// `true` exactly for the states that keep the character on the ground.
    #[must_use]
    pub fn is_grounded_state(self) -> bool {
        matches!(self, Self::Idling | Self::Walking | Self::Running | Self::Sprinting)
    }

    #[must_use]
    pub fn is_airborne(self) -> bool {
        matches!(self, Self::Jumping | Self::Falling)
    }
}

/// Current movement state plus the one it replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub current: MovementState,
    pub previous: MovementState,
}

impl PlayerState {
    /// Replace the current state, remembering the old one.
    pub fn set(&mut self, next: MovementState) {
        self.previous = self.current;
        self.current = next;
    }

    /// The character left the ground this frame without it being a jump
    /// state last frame (a walk-off or the first frame of a jump).
    #[must_use]
    pub fn left_ground(&self) -> bool {
        self.previous.is_grounded_state() && !self.current.is_grounded_state()
    }
}

/// Grounded sub-state chosen from movement intent. Walking wins over
/// sprinting, which wins over running.
///
/// # Arguments
/// * `moving` - movement input present or the body still sliding
/// * `can_run` - input is mostly forward/backward rather than sideways
/// * `walk_toggled` - the walk toggle is latched on
/// * `sprinting` - sprint is held or toggled on
#[must_use]
pub fn lateral_state(moving: bool, can_run: bool, walk_toggled: bool, sprinting: bool) -> MovementState {
    if !moving {
        MovementState::Idling
    } else if walk_toggled || !can_run {
        MovementState::Walking
    } else if sprinting {
        MovementState::Sprinting
    } else {
        MovementState::Running
    }
}

/// Airborne state from the body's measured vertical speed.
#[must_use]
pub fn airborne_state(vertical_speed: f32) -> MovementState {
    if vertical_speed > 0.0 {
        MovementState::Jumping
    } else {
        MovementState::Falling
    }
}
