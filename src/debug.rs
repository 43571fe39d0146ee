//! Debug utilities: a system (F3 default) that dumps every player controller's
//! state to a timestamped text file in `./debug-dumps/`.
//!
//! Useful for capturing movement state, velocities and facing at the moment
//! something looks wrong without attaching a debugger.
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use crate::camera::CameraSwitcher;
use crate::physics::{surface_angle, KinematicBody};
use crate::player::PlayerController;
use crate::settings::Settings;

pub const DUMP_DIR: &str = "debug-dumps";

/// Ask for a dump on the next frame without a key press.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct DumpControllerState;

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DumpControllerState>().add_systems(Last, debug_dump_system);
    }
}

/// Human-readable snapshot of one controller and its body.
#[must_use]
pub fn controller_report(name: &str, controller: &PlayerController, body: &KinematicBody) -> String {
    let mut out = String::new();
    let state = controller.player_state();
    let rotation = controller.rotation();
    writeln!(out, "[{name}]").ok();
    writeln!(out, "  state: {:?} (previous {:?})", state.current, state.previous).ok();
    writeln!(out, "  grounded test: {}", controller.is_grounded_now()).ok();
    writeln!(out, "  position: {:.3}", body.position).ok();
    writeln!(out, "  body velocity: {:.3}", body.velocity).ok();
    writeln!(out, "  commanded velocity: {:.3}", controller.velocity()).ok();
    writeln!(out, "  vertical velocity: {:.3}", controller.vertical_velocity()).ok();
    writeln!(out, "  touching ground: {}", body.touching_ground).ok();
    writeln!(
        out,
        "  ground normal: {:.3} ({:.1} deg, limit {:.1})",
        controller.ground_normal(),
        surface_angle(controller.ground_normal()),
        body.slope_limit
    )
    .ok();
    writeln!(out, "  step offset: {:.3}", body.step_offset).ok();
    writeln!(
        out,
        "  camera yaw/pitch: {:.2} / {:.2}",
        controller.look().yaw,
        controller.look().pitch
    )
    .ok();
    writeln!(
        out,
        "  rotation: mismatch {:.2}, phase {:?}, latched {:?}, timer {:.3}",
        rotation.mismatch,
        rotation.phase(),
        rotation.latched_direction(),
        rotation.timer()
    )
    .ok();
    let actions = controller.actions();
    writeln!(out, "  actions: gathering={} attacking={}", actions.gathering, actions.attacking).ok();
    out
}

/// Write `body` to `<dir>/controller-<timestamp>.txt`, creating `dir` if needed.
///
/// # Errors
/// Returns the I/O error if the directory or file cannot be written.
pub fn write_dump(dir: &Path, now: DateTime<Utc>, body: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("controller-{}.txt", now.format("%Y%m%d-%H%M%S%.3f")));
    let mut out = String::new();
    writeln!(out, "Controller dump").ok();
    writeln!(out, "Timestamp: {} (epoch secs: {})", now.format("%Y-%m-%d %H:%M:%S"), now.timestamp()).ok();
    out.push_str(body);
    fs::write(&path, out)?;
    Ok(path)
}

/// A Bevy system that listens for the dump key (default F3) or a
/// [`DumpControllerState`] event and writes every controller to disk.
#[allow(clippy::needless_pass_by_value)]
fn debug_dump_system(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut requests: EventReader<DumpControllerState>,
    settings: Res<Settings>,
    switcher: Option<Res<CameraSwitcher>>,
    players: Query<(Entity, &PlayerController, &KinematicBody)>,
) {
    let key = settings.controls.key("dump_debug", KeyCode::F3);
    let pressed = keys.is_some_and(|k| k.just_pressed(key));
    let requested = requests.read().count() > 0;
    if !pressed && !requested {
        return;
    }

    let mut out = String::new();
    if let Some(active) = switcher.as_ref().and_then(|s| s.active()) {
        writeln!(out, "Active camera: {}", active.name).ok();
    }
    writeln!(out, "Players: {}", players.iter().count()).ok();
    for (entity, controller, body) in &players {
        out.push_str(&controller_report(&format!("{entity:?}"), controller, body));
    }

    match write_dump(Path::new(DUMP_DIR), Utc::now(), &out) {
        Ok(path) => info!("wrote debug dump: {}", path.display()),
        Err(e) => error!("debug dump: failed to write to '{DUMP_DIR}': {e}"),
    }
}
