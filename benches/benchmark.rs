use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bevy::math::{Vec2, Vec3};
use stride::camera::CameraMode;
use stride::input::LocomotionInput;
use stride::physics::{sense_ground, CollisionWorld, KinematicBody, LayerMask, StaticWorld};
use stride::player::{PlayerController, PlayerLook, RotationState};
use stride::settings::{CameraSettings, RotationSettings, Settings};

/// Test out small camera movement deltas
fn bench_camera_look_clamp(c: &mut Criterion) {
    let settings = CameraSettings::default();
    c.bench_function("camera_look_clamp", |b| {
        b.iter(|| {
            let mut look = PlayerLook::default();
            // simulate many small mouse moves
            for i in 0..1_000usize {
                let dx = ((i * 13) % 17) as f32 * 0.1;
                let dy = ((i * 7) % 23) as f32 * 0.2 - 5.0;
                look.apply_delta(black_box(Vec2::new(dx, dy)), &settings);
            }
            black_box((look.yaw, look.pitch));
        })
    });
}

/// Randomized look deltas (deterministic LCG) feeding the facing reconciliation
fn bench_rotation_reconcile(c: &mut Criterion) {
    let camera = CameraSettings::default();
    let rotation = RotationSettings::default();
    c.bench_function("rotation_reconcile_random", |b| {
        b.iter(|| {
            let mut look = PlayerLook::default();
            let mut state = RotationState::new(&look);
            let mut seed: u32 = 0x1234_5678;
            for i in 0..1_000usize {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let dx = (((seed >> 16) & 0x7fff) as f32 / 32767.0) * 200.0 - 100.0;
                look.apply_delta(Vec2::new(dx, 0.0), &camera);
                state.reconcile(&look, i % 3 != 0, false, &rotation, 1.0 / 60.0);
                state.refresh(&look);
            }
            black_box(state.mismatch);
        })
    });
}

/// Ground probe against a world with a handful of colliders
fn bench_ground_sensor(c: &mut Criterion) {
    let settings = Settings::default();
    let world = StaticWorld::new()
        .with_ground(0.0)
        .with_cuboid(Vec3::new(-2.0, 0.0, -6.0), Vec3::new(2.0, 0.2, -5.0), 1)
        .with_cuboid(Vec3::new(-2.0, 0.0, -14.0), Vec3::new(2.0, 0.9, -9.0), 1)
        .with_plane(Vec3::new(10.0, 0.0, 0.0), Vec3::new(-0.5, 1.0, 0.0), 1);
    c.bench_function("ground_sensor", |b| {
        b.iter(|| {
            for i in 0..1_000usize {
                let x = (i % 40) as f32 * 0.5 - 5.0;
                let body = KinematicBody::new(Vec3::new(x, 0.1, -((i % 30) as f32) * 0.5), &settings.body);
                black_box(sense_ground(&world, &body, LayerMask::GROUND));
            }
        })
    });
}

/// Full controller frames: classify, integrate, move, rotate
fn bench_controller_tick(c: &mut Criterion) {
    let settings = Settings::default();
    let inputs = [
        LocomotionInput { movement: Vec2::Y, ..Default::default() },
        LocomotionInput { movement: Vec2::Y, sprint_toggled_on: true, ..Default::default() },
        LocomotionInput { movement: Vec2::new(0.7, 0.7), jump_pressed: true, ..Default::default() },
        LocomotionInput { look: Vec2::new(-40.0, 3.0), ..Default::default() },
    ];
    c.bench_function("controller_tick", |b| {
        b.iter(|| {
            let mut world = StaticWorld::new()
                .with_ground(0.0)
                .with_cuboid(Vec3::new(-2.0, 0.0, -6.0), Vec3::new(2.0, 0.2, -5.0), 1);
            let mut body = KinematicBody::new(Vec3::ZERO, &settings.body);
            let mut controller = PlayerController::new(&settings, 0.0);
            for i in 0..600usize {
                let input = &inputs[(i / 30) % inputs.len()];
                let view = controller.camera_view(CameraMode::ThirdPerson);
                controller.tick(&mut body, &mut world, input, &view, 1.0 / 60.0);
                controller.late_tick(input, false, 1.0 / 60.0);
            }
            black_box((body.position, controller.state()));
        })
    });
}

/// Raw capsule moves through the reference world
fn bench_move_capsule(c: &mut Criterion) {
    let settings = Settings::default();
    c.bench_function("move_capsule", |b| {
        b.iter(|| {
            let mut world = StaticWorld::new()
                .with_ground(0.0)
                .with_cuboid(Vec3::new(1.0, 0.0, -5.0), Vec3::new(2.0, 3.0, 5.0), 1);
            let mut body = KinematicBody::new(Vec3::ZERO, &settings.body);
            for _ in 0..1_000usize {
                world.move_capsule(&mut body, black_box(Vec3::new(0.1, -0.12, 0.02)), LayerMask::GROUND, 1.0 / 60.0);
            }
            black_box(body.position);
        })
    });
}

criterion_group!(
    benches,
    bench_camera_look_clamp,
    bench_rotation_reconcile,
    bench_ground_sensor,
    bench_controller_tick,
    bench_move_capsule
);
criterion_main!(benches);
