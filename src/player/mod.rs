//! Player controller: movement state, vertical and lateral motion, facing.
//!
//! [`PlayerController`] owns all locomotion state for one character and is
//! advanced by two explicit calls per frame:
//!
//! 1. [`PlayerController::tick`] classifies the movement state, integrates
//!    vertical then lateral velocity and submits exactly one capsule move.
//! 2. [`PlayerController::late_tick`] applies look input and reconciles the
//!    character's facing with the camera once the body has moved.
//!
//! # Example:
//!
//! ```
//! use bevy::prelude::*;
//! use stride::camera::CameraMode;
//! use stride::input::LocomotionInput;
//! use stride::physics::{KinematicBody, StaticWorld};
//! use stride::player::PlayerController;
//! use stride::settings::Settings;
//!
//! let settings = Settings::default();
//! let mut world = StaticWorld::new().with_ground(0.0);
//! let mut body = KinematicBody::new(Vec3::ZERO, &settings.body);
//! let mut controller = PlayerController::new(&settings, 0.0);
//! let input = LocomotionInput { movement: Vec2::Y, ..Default::default() };
//!
//! let view = controller.camera_view(CameraMode::ThirdPerson);
//! controller.tick(&mut body, &mut world, &input, &view, 1.0 / 60.0);
//! controller.late_tick(&input, false, 1.0 / 60.0);
//! ```
pub mod actions;
pub mod camera;
pub mod movement;
pub mod physics;
pub mod rotation;
pub mod state;

use bevy::prelude::*;

pub use actions::*;
pub use camera::*;
pub use movement::*;
pub use physics::*;
pub use rotation::*;
pub use state::*;

use crate::camera::{CameraMode, CameraView};
use crate::input::LocomotionInput;
use crate::physics::{is_walkable, sense_ground, CollisionWorld, KinematicBody, LayerMask};
use crate::settings::{CameraSettings, MovementSettings, RotationSettings, Settings};

/// Locomotion state for one character.
#[derive(Component, Debug, Clone)]
pub struct PlayerController {
    movement: MovementSettings,
    rotation_settings: RotationSettings,
    camera: CameraSettings,
    ground_layers: LayerMask,
    step_offset: f32,
    clear_policy: ActionClearPolicy,

    state: PlayerState,
    vertical: VerticalMotion,
    look: PlayerLook,
    rotation: RotationState,
    actions: ActionFlags,
    /// Velocity submitted with the last move.
    velocity: Vec3,
    /// Last surface normal reported by the ground sensor.
    ground_normal: Vec3,
    grounded: bool,
}

impl PlayerController {
    /// A grounded, idle controller facing (and looking) along `yaw` degrees.
    #[must_use]
    pub fn new(settings: &Settings, yaw: f32) -> Self {
        let look = PlayerLook::new(yaw);
        Self {
            movement: settings.movement.clone(),
            rotation_settings: settings.rotation.clone(),
            camera: settings.camera.clone(),
            ground_layers: LayerMask(settings.body.ground_layers),
            step_offset: settings.body.step_offset,
            clear_policy: settings.actions.clear_policy,
            state: PlayerState::default(),
            vertical: VerticalMotion::default(),
            look,
            rotation: RotationState::new(&look),
            actions: ActionFlags::default(),
            velocity: Vec3::ZERO,
            ground_normal: Vec3::Y,
            grounded: true,
        }
    }

    /// Replace the tuning without touching the runtime state.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.movement = settings.movement.clone();
        self.rotation_settings = settings.rotation.clone();
        self.camera = settings.camera.clone();
        self.ground_layers = LayerMask(settings.body.ground_layers);
        self.step_offset = settings.body.step_offset;
        self.clear_policy = settings.actions.clear_policy;
    }

    /// Advance locomotion by one frame and move `body` exactly once.
    ///
    /// # Arguments
    /// * `body` - the capsule this controller drives
    /// * `world` - collision queries and the move
    /// * `input` - this frame's input snapshot
    /// * `view` - the active camera's orientation
    /// * `dt` - frame time in seconds; non-positive frames are skipped
    pub fn tick<W: CollisionWorld + ?Sized>(
        &mut self,
        body: &mut KinematicBody,
        world: &mut W,
        input: &LocomotionInput,
        view: &CameraView,
        dt: f32,
    ) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }

        self.classify(body, &*world, input);
        self.actions.update(input, self.state.current, self.clear_policy);

        let vertical = self.vertical.integrate(&self.movement, &self.state, input.jump_pressed, dt);
        let velocity = self.lateral(body, &*world, input, view, vertical, dt);

        world.move_capsule(body, velocity * dt, self.ground_layers, dt);
        self.velocity = velocity;
    }

    /// Apply look input and turn the character toward the camera.
    pub fn late_tick(&mut self, input: &LocomotionInput, first_person: bool, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        self.look.apply_delta(input.look, &self.camera);
        self.rotation.reconcile(
            &self.look,
            self.state.current == MovementState::Idling,
            first_person,
            &self.rotation_settings,
            dt,
        );
        self.rotation.refresh(&self.look);
    }

    fn is_grounded<W: CollisionWorld + ?Sized>(&mut self, body: &KinematicBody, world: &W) -> bool {
        if self.state.current.is_grounded_state() {
            let probe = body.position - Vec3::Y * body.radius;
            world.overlap_sphere(probe, body.radius, self.ground_layers)
        } else {
            self.ground_normal = sense_ground(world, body, self.ground_layers);
            body.touching_ground && is_walkable(self.ground_normal, body.slope_limit)
        }
    }

    fn classify<W: CollisionWorld + ?Sized>(
        &mut self,
        body: &mut KinematicBody,
        world: &W,
        input: &LocomotionInput,
    ) {
        let threshold = self.movement.moving_threshold;
        let has_input = input.movement.length() > threshold;
        let can_run = input.movement.y.abs() >= input.movement.x.abs();
        let moving = has_input || body.horizontal_speed() > threshold;

        self.grounded = self.is_grounded(body, world);

        let next = if !self.grounded || self.vertical.jumped_last_frame {
            self.vertical.jumped_last_frame = false;
            body.step_offset = 0.0;
            airborne_state(body.velocity.y)
        } else {
            body.step_offset = self.step_offset;
            lateral_state(moving, can_run, input.walk_toggled_on, input.sprint_toggled_on)
        };
        self.state.set(next);
    }

    fn lateral<W: CollisionWorld + ?Sized>(
        &mut self,
        body: &KinematicBody,
        world: &W,
        input: &LocomotionInput,
        view: &CameraView,
        vertical: f32,
        dt: f32,
    ) -> Vec3 {
        let profile = LateralProfile::for_state(self.state.current, &self.movement);
        let direction = camera_relative_direction(view, input.movement);
        let velocity = integrate_lateral(body.horizontal_velocity(), direction, &profile, vertical, dt);

        if self.state.current.is_airborne() {
            self.ground_normal = sense_ground(world, body, self.ground_layers);
            steep_slope_correction(velocity, self.ground_normal, body.slope_limit)
        } else {
            velocity
        }
    }

    /// View built from the controller's own camera yaw.
    #[must_use]
    pub fn camera_view(&self, mode: CameraMode) -> CameraView {
        CameraView {
            forward: self.rotation.camera_forward(),
            right: self.rotation.camera_right(),
            mode,
        }
    }

    #[must_use]
    pub fn state(&self) -> MovementState {
        self.state.current
    }

    #[must_use]
    pub fn player_state(&self) -> PlayerState {
        self.state
    }

    /// Result of the grounded test made by the last classification.
    #[must_use]
    pub fn is_grounded_now(&self) -> bool {
        self.grounded
    }

    #[must_use]
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical.velocity
    }

    /// Velocity submitted with the last move, before collision.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[must_use]
    pub fn ground_normal(&self) -> Vec3 {
        self.ground_normal
    }

    #[must_use]
    pub fn look(&self) -> &PlayerLook {
        &self.look
    }

    #[must_use]
    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    #[must_use]
    pub fn character_rotation(&self) -> Quat {
        self.rotation.character
    }

    #[must_use]
    pub fn camera_rotation(&self) -> Quat {
        self.rotation.camera_rotation()
    }

    #[must_use]
    pub fn actions(&self) -> ActionFlags {
        self.actions
    }

    #[must_use]
    pub fn ground_layers(&self) -> LayerMask {
        self.ground_layers
    }

    pub fn finish_gather(&mut self) {
        self.actions.finish_gather();
    }

    pub fn finish_attack(&mut self) {
        self.actions.finish_attack();
    }
}
