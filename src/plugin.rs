//! Bevy wiring for the player controller.
//!
//! The per-frame pipeline is spread over three schedules:
//!
//! - `PreUpdate`: an input provider fills [`RawInput`] (`InputSet::Read`),
//!   then [`latch_input`] builds the [`LocomotionInput`] (`InputSet::Latch`).
//! - `Update` (chained): settings reload, camera switching and zoom,
//!   [`PlayerController::tick`] for every player, transform sync, animation.
//! - `PostUpdate`: [`PlayerController::late_tick`] and the camera follow,
//!   before transforms propagate.
//!
//! The collision world is a resource of type `W` supplied by the host.

use bevy::prelude::*;
use bevy::transform::TransformSystem;
use std::marker::PhantomData;

use crate::animation::{AnimationDriver, AnimationParams};
use crate::camera::{follow_position, CameraSwitcher, CameraView, PlayerCamera, ThirdPersonZoom};
use crate::input::{latch_input, InputLatch, InputSet, LocomotionInput, RawInput};
use crate::physics::{CollisionWorld, KinematicBody};
use crate::player::PlayerController;
use crate::settings::loader::{check_settings_changes, SettingsWatcher};
use crate::settings::Settings;

/// Everything a controllable character entity needs.
#[derive(Bundle)]
pub struct PlayerBundle {
    pub controller: PlayerController,
    pub body: KinematicBody,
    pub transform: Transform,
    pub animation: AnimationDriver,
    pub params: AnimationParams,
}

impl PlayerBundle {
    #[must_use]
    pub fn new(settings: &Settings, feet: Vec3, yaw: f32) -> Self {
        let controller = PlayerController::new(settings, yaw);
        Self {
            transform: Transform::from_translation(feet).with_rotation(controller.character_rotation()),
            body: KinematicBody::new(feet, &settings.body),
            controller,
            animation: AnimationDriver::default(),
            params: AnimationParams::default(),
        }
    }
}

/// Camera entity following the player.
#[derive(Bundle)]
pub struct PlayerCameraBundle {
    pub marker: PlayerCamera,
    pub zoom: ThirdPersonZoom,
    pub transform: Transform,
}

impl PlayerCameraBundle {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            marker: PlayerCamera,
            zoom: ThirdPersonZoom::new(&settings.camera),
            transform: Transform::default(),
        }
    }
}

pub struct PlayerControllerPlugin<W> {
    _world: PhantomData<fn() -> W>,
}

impl<W> Default for PlayerControllerPlugin<W> {
    fn default() -> Self {
        Self { _world: PhantomData }
    }
}

impl<W: CollisionWorld + Resource> Plugin for PlayerControllerPlugin<W> {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<CameraSwitcher>() {
            app.insert_resource(CameraSwitcher::first_and_third_person());
        }
        app.init_resource::<Settings>()
            .init_resource::<RawInput>()
            .init_resource::<InputLatch>()
            .init_resource::<LocomotionInput>()
            .configure_sets(PreUpdate, (InputSet::Read, InputSet::Latch).chain())
            .add_systems(PreUpdate, latch_input.in_set(InputSet::Latch))
            .add_systems(
                Update,
                (
                    check_settings_changes.run_if(resource_exists::<SettingsWatcher>),
                    apply_settings_changes,
                    switch_cameras,
                    zoom_cameras,
                    drive_players::<W>,
                    sync_player_transforms,
                    drive_animation,
                )
                    .chain(),
            )
            .add_systems(
                PostUpdate,
                reconcile_rotation.before(TransformSystem::TransformPropagate),
            );
    }
}

/// Push reloaded settings into every spawned controller and body.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_settings_changes(
    settings: Res<Settings>,
    mut players: Query<(&mut PlayerController, &mut KinematicBody)>,
) {
    if !settings.is_changed() || settings.is_added() {
        return;
    }
    for (mut controller, mut body) in &mut players {
        controller.apply_settings(&settings);
        body.radius = settings.body.radius;
        body.half_height = settings.body.half_height;
        body.slope_limit = settings.body.slope_limit;
    }
    info!("applied new controller settings");
}

#[allow(clippy::needless_pass_by_value)]
pub fn switch_cameras(input: Res<LocomotionInput>, mut switcher: ResMut<CameraSwitcher>) {
    if input.switch_camera_pressed {
        switcher.switch_to_next();
        if let Some(active) = switcher.active() {
            debug!("active camera: {}", active.name);
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn zoom_cameras(
    input: Res<LocomotionInput>,
    settings: Res<Settings>,
    switcher: Res<CameraSwitcher>,
    mut zooms: Query<&mut ThirdPersonZoom>,
) {
    if input.scroll == 0.0 || switcher.is_first_person_active() {
        return;
    }
    for mut zoom in &mut zooms {
        zoom.apply_scroll(input.scroll, &settings.camera);
    }
}

/// Run [`PlayerController::tick`] for every player against the world `W`.
///
/// Without a [`PlayerCamera`] there is nothing to steer by; the frame is
/// skipped and the problem reported once. [`drive_animation`] and
/// [`reconcile_rotation`] skip the same frames.
#[allow(clippy::needless_pass_by_value)]
pub fn drive_players<W: CollisionWorld + Resource>(
    time: Res<Time>,
    input: Res<LocomotionInput>,
    switcher: Res<CameraSwitcher>,
    mut world: ResMut<W>,
    cameras: Query<&Transform, (With<PlayerCamera>, Without<PlayerController>)>,
    mut players: Query<(&mut PlayerController, &mut KinematicBody)>,
    mut warned: Local<bool>,
) {
    let camera = match cameras.get_single() {
        Ok(camera) => {
            *warned = false;
            camera
        }
        Err(e) => {
            if !*warned {
                warn!("player controller has no camera to steer by: {e}");
                *warned = true;
            }
            return;
        }
    };

    let view = CameraView::from_rotation(camera.rotation, switcher.mode());
    let dt = time.delta_seconds();
    for (mut controller, mut body) in &mut players {
        controller.tick(&mut body, &mut *world, &input, &view, dt);
    }
}

pub fn sync_player_transforms(mut players: Query<(&PlayerController, &KinematicBody, &mut Transform)>) {
    for (controller, body, mut transform) in &mut players {
        transform.translation = body.position;
        transform.rotation = controller.character_rotation();
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn drive_animation(
    time: Res<Time>,
    input: Res<LocomotionInput>,
    settings: Res<Settings>,
    cameras: Query<(), With<PlayerCamera>>,
    mut players: Query<(&PlayerController, &mut AnimationDriver, &mut AnimationParams)>,
) {
    if cameras.is_empty() {
        return;
    }
    let dt = time.delta_seconds();
    for (controller, mut driver, mut params) in &mut players {
        driver.drive(controller, &input, &settings.animation, dt, &mut *params);
    }
}

/// Late phase: look, facing reconciliation and the camera follow.
#[allow(clippy::needless_pass_by_value)]
pub fn reconcile_rotation(
    time: Res<Time>,
    input: Res<LocomotionInput>,
    settings: Res<Settings>,
    switcher: Res<CameraSwitcher>,
    mut players: Query<(&mut PlayerController, &KinematicBody, &mut Transform), Without<PlayerCamera>>,
    mut cameras: Query<(&mut Transform, Option<&ThirdPersonZoom>), With<PlayerCamera>>,
) {
    if cameras.is_empty() {
        return;
    }
    let dt = time.delta_seconds();
    let first_person = switcher.is_first_person_active();
    let mode = switcher.mode();

    for (mut controller, body, mut transform) in &mut players {
        controller.late_tick(&input, first_person, dt);
        transform.rotation = controller.character_rotation();

        for (mut camera, zoom) in &mut cameras {
            camera.rotation = controller.camera_rotation();
            camera.translation =
                follow_position(body.position, camera.rotation, mode, zoom, &settings.camera);
        }
    }
}
