//! Player vertical physics: gravity, anti-bump, jumping and the terminal clamp.
//!
//! The vertical speed is a single scalar integrated before lateral movement so
//! the lateral step can reattach it as the Y component of the frame's move.

use crate::player::PlayerState;
use crate::settings::MovementSettings;

/// Vertical speed (positive up) and the jump latch consumed by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VerticalMotion {
    pub velocity: f32,
    /// Set on the frame a jump starts; cleared once the classifier has seen it.
    pub jumped_last_frame: bool,
    /// The last integration held the speed at `-anti_bump`.
    pinned: bool,
}

impl VerticalMotion {
    /// Step the vertical speed for one frame and return it.
    ///
    /// # Arguments
    /// * `settings` - gravity, jump and terminal tuning
    /// * `state` - movement state after this frame's classification
    /// * `jump_requested` - jump pressed this frame
    /// * `dt` - frame time in seconds
    pub fn integrate(
        &mut self,
        settings: &MovementSettings,
        state: &PlayerState,
        jump_requested: bool,
        dt: f32,
    ) -> f32 {
        let grounded = state.current.is_grounded_state();
        let was_pinned = std::mem::replace(&mut self.pinned, false);

        self.velocity -= settings.gravity * dt;

        if grounded && self.velocity < 0.0 {
            self.velocity = -settings.anti_bump();
            self.pinned = true;
        }

        if jump_requested && grounded {
            self.velocity += settings.jump_impulse();
            self.jumped_last_frame = true;
        }

        // first airborne frame after a walk-off or a jump: give back the bias
        // the last grounded frame injected
        if state.left_ground() && was_pinned {
            self.velocity += settings.anti_bump();
        }

        if self.velocity.abs() > settings.terminal_velocity {
            self.velocity = -settings.terminal_velocity;
        }

        self.velocity
    }
}
