//! Keyboard and mouse input provider.
//!
//! Reads the bound keys from `controls.keybinds` and accumulates mouse motion
//! and wheel events for the current update. Requires bevy's `InputPlugin`
//! (part of `DefaultPlugins`).

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

use crate::input::{InputSet, RawInput};
use crate::settings::{ControlsSettings, Settings};

/// Keys resolved from the settings for one frame.
struct Bindings {
    forward: KeyCode,
    back: KeyCode,
    left: KeyCode,
    right: KeyCode,
    jump: KeyCode,
    sprint: KeyCode,
    walk: KeyCode,
    gather: KeyCode,
    attack: KeyCode,
    switch_camera: KeyCode,
}

impl Bindings {
    fn from_controls(controls: &ControlsSettings) -> Self {
        Self {
            forward: controls.key("forward", KeyCode::KeyW),
            back: controls.key("back", KeyCode::KeyS),
            left: controls.key("left", KeyCode::KeyA),
            right: controls.key("right", KeyCode::KeyD),
            jump: controls.key("jump", KeyCode::Space),
            sprint: controls.key("sprint", KeyCode::ShiftLeft),
            walk: controls.key("walk", KeyCode::ControlLeft),
            gather: controls.key("gather", KeyCode::KeyE),
            attack: controls.key("attack", KeyCode::KeyF),
            switch_camera: controls.key("switch_camera", KeyCode::KeyV),
        }
    }
}

fn axis(keys: &ButtonInput<KeyCode>, positive: KeyCode, negative: KeyCode) -> f32 {
    let mut value = 0.0;
    if keys.pressed(positive) {
        value += 1.0;
    }
    if keys.pressed(negative) {
        value -= 1.0;
    }
    value
}

/// Fill [`RawInput`] from the keyboard and mouse.
#[allow(clippy::needless_pass_by_value)]
pub fn read_keyboard_mouse(
    keys: Res<ButtonInput<KeyCode>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    settings: Res<Settings>,
    mut raw: ResMut<RawInput>,
) {
    let bind = Bindings::from_controls(&settings.controls);

    let mut look = Vec2::ZERO;
    for ev in motion.read() {
        let mut delta = ev.delta;
        if settings.camera.invert_x {
            delta.x = -delta.x;
        }
        if settings.camera.invert_y {
            delta.y = -delta.y;
        }
        look += delta;
    }
    let scroll: f32 = wheel.read().map(|ev| ev.y).sum();

    *raw = RawInput {
        movement: Vec2::new(
            axis(&keys, bind.right, bind.left),
            axis(&keys, bind.forward, bind.back),
        ),
        look,
        scroll,
        jump_pressed: keys.just_pressed(bind.jump),
        sprint_held: keys.pressed(bind.sprint),
        sprint_pressed: keys.just_pressed(bind.sprint),
        walk_pressed: keys.just_pressed(bind.walk),
        gather_pressed: keys.just_pressed(bind.gather),
        attack_pressed: keys.just_pressed(bind.attack),
        switch_camera_pressed: keys.just_pressed(bind.switch_camera),
    };
}

/// Registers [`read_keyboard_mouse`] as the input provider.
pub struct KeyboardMousePlugin;

impl Plugin for KeyboardMousePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, read_keyboard_mouse.in_set(InputSet::Read));
    }
}
