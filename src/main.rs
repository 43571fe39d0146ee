use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::time::Duration;

use stride::debug::{DebugDumpPlugin, DumpControllerState};
use stride::input::{read_scripted_input, InputSet, RawInput, ScriptedInput};
use stride::physics::{KinematicBody, StaticWorld};
use stride::player::PlayerController;
use stride::plugin::{PlayerBundle, PlayerCameraBundle, PlayerControllerPlugin};
use stride::settings::loader as settings_loader;
use stride::settings::{Settings, SETTINGS_DIR};

// Simulation tick
pub const TICK_RATE: f64 = 60.0;

/// Ground, a kerb low enough to step onto and a platform to walk off.
fn demo_world() -> StaticWorld {
    StaticWorld::new()
        .with_ground(0.0)
        .with_cuboid(Vec3::new(-2.0, 0.0, -6.0), Vec3::new(2.0, 0.2, -5.0), 1)
        .with_cuboid(Vec3::new(-2.0, 0.0, -14.0), Vec3::new(2.0, 0.9, -9.0), 1)
}

fn demo_script() -> ScriptedInput {
    let forward = RawInput { movement: Vec2::Y, ..Default::default() };
    ScriptedInput::new()
        .then(RawInput::default(), 30)
        .then(forward, 60)
        .then(RawInput { sprint_held: true, ..forward }, 60)
        .then(RawInput { jump_pressed: true, ..forward }, 1)
        .then(forward, 90)
        .then(RawInput::default(), 30)
        .then(RawInput { look: Vec2::new(-1200.0, 0.0), ..Default::default() }, 1)
        .then(RawInput::default(), 60)
        .then(RawInput { switch_camera_pressed: true, ..Default::default() }, 1)
        .then(RawInput { scroll: -1.0, ..Default::default() }, 5)
        .then(RawInput { gather_pressed: true, ..Default::default() }, 1)
        .then(RawInput { movement: Vec2::new(1.0, 0.0), ..Default::default() }, 60)
}

fn spawn_demo(mut commands: Commands, settings: Res<Settings>) {
    commands.spawn((Name::new("player"), PlayerBundle::new(&settings, Vec3::ZERO, 0.0)));
    commands.spawn((Name::new("camera"), PlayerCameraBundle::new(&settings)));
}

fn log_state_changes(players: Query<(&Name, &PlayerController, &KinematicBody)>) {
    for (name, controller, body) in &players {
        let state = controller.player_state();
        if state.current != state.previous {
            info!(
                "{name}: {:?} -> {:?} at {:.2} (speed {:.2})",
                state.previous,
                state.current,
                body.position,
                body.horizontal_speed()
            );
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn exit_when_script_done(
    script: Res<ScriptedInput>,
    mut dumps: EventWriter<DumpControllerState>,
    mut exit: EventWriter<AppExit>,
    mut finished: Local<u32>,
) {
    if !script.is_finished() {
        return;
    }
    *finished += 1;
    match *finished {
        1 => {
            dumps.send(DumpControllerState);
        }
        _ => {
            info!("demo script finished");
            exit.send(AppExit::Success);
        }
    }
}

fn main() {
    let settings = settings_loader::load_settings_from_dir(SETTINGS_DIR);

    let mut app = App::new();

    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / TICK_RATE))),
    )
    .add_plugins(LogPlugin::default());

    app.insert_resource(settings);
    app.insert_resource(settings_loader::settings_watcher_or_stub(SETTINGS_DIR));
    app.insert_resource(demo_world());
    app.insert_resource(demo_script());

    app.add_plugins(PlayerControllerPlugin::<StaticWorld>::default())
        .add_plugins(DebugDumpPlugin);

    app.add_systems(Startup, spawn_demo);
    app.add_systems(PreUpdate, read_scripted_input.in_set(InputSet::Read));
    app.add_systems(Last, (log_state_changes, exit_when_script_done));

    app.run();
}
