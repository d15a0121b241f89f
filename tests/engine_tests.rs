//! Engine tests
//!
//! Tests for:
//! - Settings defaults, struct-update overrides and JSON loading
//! - Allocator accounting across engine lifetime
//! - Independent engine instances
//! - Action playback driving a skeleton through the engine

use std::sync::Arc;

use ember::{
    AnimationAction, Channel, EmberError, Engine, EngineSettings, HeadlessUniforms,
    InterpolationMode, JointTransform, KeyframeTrack, LoopMode, SkeletonJoint, TrackingAllocator,
    blend_poses,
};
use glam::{Mat4, Vec3};

const EPSILON: f32 = 1e-5;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn small_settings() -> EngineSettings {
    EngineSettings {
        max_num_transforms: 16,
        max_num_skeletons: 4,
        max_num_animations: 4,
    }
}

fn two_joint_rig() -> [SkeletonJoint; 2] {
    [
        SkeletonJoint::root(Mat4::IDENTITY),
        SkeletonJoint::child_of(0, Mat4::from_translation(-Vec3::Y)),
    ]
}

fn raise_channel() -> Channel {
    Channel::translation(
        1,
        KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Vec3::Y, Vec3::Y * 2.0],
            InterpolationMode::Linear,
        ),
    )
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn default_capacities() {
    let engine = Engine::headless(EngineSettings::default()).unwrap();
    assert_eq!(engine.transforms.capacity(), 1024);
    assert_eq!(engine.settings().skeleton_capacity(), 64);
    assert_eq!(engine.settings().animation_capacity(), 256);
}

#[test]
fn settings_from_json_keep_unset_defaults() {
    let settings = EngineSettings::from_json_str(r#"{ "max_num_transforms": 8 }"#).unwrap();
    assert_eq!(settings.max_num_transforms, 8);
    assert_eq!(settings.max_num_skeletons, 64);

    let engine = Engine::headless(settings).unwrap();
    assert_eq!(engine.transforms.capacity(), 8);
}

#[test]
fn zero_capacity_means_default() {
    let settings = EngineSettings::from_json_str(r#"{ "max_num_skeletons": 0 }"#).unwrap();
    assert_eq!(settings.skeleton_capacity(), 64);
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = EngineSettings::from_json_str("{ max_num_transforms: }").unwrap_err();
    assert!(matches!(err, EmberError::Config(_)));
}

#[test]
fn settings_serialize_round_trip() {
    let json = serde_json::to_string(&small_settings()).unwrap();
    assert_eq!(EngineSettings::from_json_str(&json).unwrap(), small_settings());
}

// ============================================================================
// Allocator
// ============================================================================

#[test]
fn allocator_returns_to_zero() {
    init_logging();
    let alloc = Arc::new(TrackingAllocator::new());
    {
        let mut engine =
            Engine::with_allocator(small_settings(), HeadlessUniforms::new(), alloc.clone()).unwrap();
        let after_init = alloc.current_bytes();
        assert!(after_init > 0);

        let skeleton = engine.animation.create_skeleton(&two_joint_rig(), None).unwrap();
        let anim = engine
            .animation
            .create_animation("raise", &[raise_channel()], None)
            .unwrap();
        assert!(alloc.current_bytes() > after_init);

        engine.animation.destroy_animation(anim).unwrap();
        engine.animation.destroy_skeleton(skeleton).unwrap();
        assert_eq!(alloc.current_bytes(), after_init);

        // Left alive on purpose: dropping the engine must release it too
        engine.animation.create_skeleton(&two_joint_rig(), None).unwrap();
    }
    assert_eq!(alloc.current_bytes(), 0);
    assert_eq!(alloc.live_allocations(), 0);
}

#[test]
fn budget_too_small_fails_init() {
    let alloc = Arc::new(TrackingAllocator::with_budget(64));
    let result = Engine::with_allocator(small_settings(), HeadlessUniforms::new(), alloc.clone());
    assert!(matches!(result, Err(EmberError::AllocationRefused { .. })));
    assert_eq!(alloc.current_bytes(), 0);
}

#[test]
fn engines_are_independent() {
    let mut a = Engine::headless(small_settings()).unwrap();
    let mut b = Engine::headless(small_settings()).unwrap();

    let node = a.transforms.create().unwrap();
    a.transforms.set_position(node, Vec3::X).unwrap();
    assert_eq!(a.transforms.len(), 1);
    assert!(b.transforms.is_empty());

    // Same slot, same generation: the handle is valid in both pools
    let other = b.transforms.create().unwrap();
    assert_eq!(node, other);
    assert_eq!(b.transforms.position(other).unwrap(), Vec3::ZERO);
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn looping_action_drives_skeleton() -> anyhow::Result<()> {
    init_logging();
    let mut engine = Engine::headless(small_settings())?;
    let skeleton = engine.animation.create_skeleton(&two_joint_rig(), None)?;
    let anim = engine
        .animation
        .create_animation("raise", &[raise_channel()], None)?;

    let mut action = AnimationAction::new(anim);
    for _ in 0..5 {
        engine.animation.advance_action(&mut action, 0.25)?;
    }
    assert!((action.time - 0.25).abs() < EPSILON);

    engine.animation.apply_action(&action, skeleton)?;
    let skin_count = engine.animation.update_joint_matrices(skeleton)?.len();
    assert_eq!(skin_count, 2);
    let joint = engine.animation.global_transforms(skeleton)?[1];
    assert!(joint.w_axis.truncate().abs_diff_eq(Vec3::Y * 1.25, EPSILON));
    Ok(())
}

#[test]
fn once_action_stops_at_end() {
    let mut engine = Engine::headless(small_settings()).unwrap();
    let anim = engine
        .animation
        .create_animation("raise", &[raise_channel()], None)
        .unwrap();

    let mut action = AnimationAction::new(anim).with_loop_mode(LoopMode::Once);
    engine.animation.advance_action(&mut action, 3.0).unwrap();
    assert_eq!(action.time, 1.0);
    assert!(action.paused);

    let mut pose = [JointTransform::IDENTITY; 2];
    engine.animation.sample_action(&action, &mut pose).unwrap();
    assert!(pose[1].translation.abs_diff_eq(Vec3::Y * 2.0, EPSILON));
}

#[test]
fn blended_actions_write_skeleton_pose() {
    let mut engine = Engine::headless(small_settings()).unwrap();
    let skeleton = engine.animation.create_skeleton(&two_joint_rig(), None).unwrap();
    let raise = engine
        .animation
        .create_animation("raise", &[raise_channel()], None)
        .unwrap();
    let slide = engine
        .animation
        .create_animation(
            "slide",
            &[Channel::translation(
                1,
                KeyframeTrack::new(vec![0.0], vec![Vec3::X], InterpolationMode::Step),
            )],
            Some(1.0),
        )
        .unwrap();

    let a = AnimationAction::new(raise).with_weight(0.5);
    let b = AnimationAction::new(slide).with_weight(0.5);

    let bind = engine.animation.skeleton(skeleton).unwrap().local_bind().to_vec();
    let mut pose_a = bind.clone();
    let mut pose_b = bind;
    engine.animation.sample_action(&a, &mut pose_a).unwrap();
    engine.animation.sample_action(&b, &mut pose_b).unwrap();

    let out = engine.animation.joint_transforms_mut(skeleton).unwrap();
    blend_poses(&pose_a, a.weight, &pose_b, b.weight, None, out);

    let pose = engine.animation.joint_transforms(skeleton).unwrap();
    assert!(pose[1].translation.abs_diff_eq(Vec3::new(0.5, 0.5, 0.0), EPSILON));
}

#[test]
fn stale_animation_handle_in_action_is_an_error() {
    let mut engine = Engine::headless(small_settings()).unwrap();
    let anim = engine
        .animation
        .create_animation("raise", &[raise_channel()], None)
        .unwrap();
    engine.animation.destroy_animation(anim).unwrap();

    let mut action = AnimationAction::new(anim);
    assert!(matches!(
        engine.animation.advance_action(&mut action, 0.1),
        Err(EmberError::InvalidHandle { kind: "animation", .. })
    ));
}
