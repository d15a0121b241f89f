//! Skin Playback
//!
//! Drives a two-joint arm through two blended animations without a window:
//! - "raise" lifts the forearm along +Y and loops
//! - "wave" swings the forearm around Z and ping-pongs
//!
//! The two layers are mixed 60/40 every frame. Joint world positions are
//! logged every few frames. Optional first argument: path to an
//! `EngineSettings` JSON file.

use std::sync::Arc;

use anyhow::Context;
use ember::{
    AnimationAction, Channel, Engine, EngineSettings, HeadlessUniforms, InterpolationMode,
    KeyframeTrack, LoopMode, SkeletonJoint, TrackingAllocator, blend_poses,
};
use glam::{Mat4, Quat, Vec3};

const FRAME_DT: f32 = 1.0 / 30.0;
const FRAMES: u32 = 90;

fn load_settings() -> anyhow::Result<EngineSettings> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(EngineSettings::default());
    };
    let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    EngineSettings::from_json_str(&json).with_context(|| format!("parsing {path}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let allocator = Arc::new(TrackingAllocator::new());
    let mut engine = Engine::with_allocator(load_settings()?, HeadlessUniforms::new(), allocator.clone())?;

    // Arm rig: shoulder at the origin, elbow one unit up
    let joints = [
        SkeletonJoint::root(Mat4::IDENTITY),
        SkeletonJoint::child_of(0, Mat4::from_translation(-Vec3::Y)),
    ];
    let skeleton = engine.animation.create_skeleton(&joints, None)?;

    let raise = engine.animation.create_animation(
        "raise",
        &[Channel::translation(
            1,
            KeyframeTrack::new(
                vec![0.0, 1.0, 2.0],
                vec![Vec3::Y, Vec3::Y * 2.0, Vec3::Y],
                InterpolationMode::Linear,
            ),
        )],
        None,
    )?;
    let wave = engine.animation.create_animation(
        "wave",
        &[
            Channel::rotation(
                0,
                KeyframeTrack::new(
                    vec![0.0, 0.75],
                    vec![Quat::IDENTITY, Quat::from_rotation_z(1.0)],
                    InterpolationMode::Linear,
                ),
            ),
            Channel::rotation(
                1,
                KeyframeTrack::new(
                    vec![0.0, 0.75],
                    vec![Quat::from_rotation_z(-0.6), Quat::from_rotation_z(0.6)],
                    InterpolationMode::Linear,
                ),
            ),
        ],
        None,
    )?;

    let mut base = AnimationAction::new(raise).with_weight(0.6);
    let mut layer = AnimationAction::new(wave)
        .with_loop_mode(LoopMode::PingPong)
        .with_weight(0.4);

    // A transform carries the whole rig around the scene
    let root = engine.transforms.create()?;
    engine.transforms.set_position(root, Vec3::new(0.0, 0.0, -3.0))?;

    let bind = engine.animation.skeleton(skeleton)?.local_bind().to_vec();
    let mut pose_a = bind.clone();
    let mut pose_b = bind.clone();

    for frame in 0..FRAMES {
        engine.animation.advance_action(&mut base, FRAME_DT)?;
        engine.animation.advance_action(&mut layer, FRAME_DT)?;

        pose_a.copy_from_slice(&bind);
        pose_b.copy_from_slice(&bind);
        engine.animation.sample_action(&base, &mut pose_a)?;
        engine.animation.sample_action(&layer, &mut pose_b)?;

        let pose = engine.animation.joint_transforms_mut(skeleton)?;
        blend_poses(&pose_a, base.weight, &pose_b, layer.weight, None, pose);

        engine.animation.update_joint_matrices(skeleton)?;

        if frame % 15 == 0 {
            let model = engine.transforms.world_matrix(root)?;
            let globals = engine.animation.global_transforms(skeleton)?;
            let positions: Vec<Vec3> = globals
                .iter()
                .map(|g| model.transform_point3(g.w_axis.truncate()))
                .collect();
            log::info!(
                "frame {frame:3} t_raise={:.2} t_wave={:.2} shoulder={} elbow={}",
                base.time,
                layer.time,
                positions[0],
                positions[1]
            );
        }
    }

    engine.transforms.write_uniforms(root, Mat4::IDENTITY, Mat4::IDENTITY)?;
    log::info!(
        "done: {} bytes reserved (peak {}), settings {}",
        allocator.current_bytes(),
        allocator.peak_bytes(),
        serde_json::to_string(engine.settings())?
    );
    Ok(())
}
