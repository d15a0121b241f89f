use std::mem;

use ember_core::{EmberError, Result};
use glam::{Quat, Vec3};

use crate::joint::JointTransform;
use crate::tracks::KeyframeTrack;
use crate::values::Interpolatable;

/// The part of a joint's local transform a channel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointDof {
    Translation,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelTarget {
    pub joint_index: u16,
    pub dof: JointDof,
}

#[derive(Debug, Clone)]
pub enum ChannelData {
    Vec3(KeyframeTrack<Vec3>),
    Quat(KeyframeTrack<Quat>),
}

impl ChannelData {
    fn end_time(&self) -> f32 {
        match self {
            ChannelData::Vec3(track) => track.end_time(),
            ChannelData::Quat(track) => track.end_time(),
        }
    }

    fn heap_bytes(&self) -> usize {
        match self {
            ChannelData::Vec3(track) => track_bytes(track),
            ChannelData::Quat(track) => track_bytes(track),
        }
    }
}

fn track_bytes<T: Interpolatable>(track: &KeyframeTrack<T>) -> usize {
    track.times.len() * mem::size_of::<f32>() + track.values.len() * mem::size_of::<T>()
}

/// One curve aimed at a single DOF of a single joint.
#[derive(Debug, Clone)]
pub struct Channel {
    pub target: ChannelTarget,
    pub data: ChannelData,
}

impl Channel {
    #[must_use]
    pub fn translation(joint_index: u16, track: KeyframeTrack<Vec3>) -> Self {
        Self {
            target: ChannelTarget {
                joint_index,
                dof: JointDof::Translation,
            },
            data: ChannelData::Vec3(track),
        }
    }

    #[must_use]
    pub fn rotation(joint_index: u16, track: KeyframeTrack<Quat>) -> Self {
        Self {
            target: ChannelTarget {
                joint_index,
                dof: JointDof::Rotation,
            },
            data: ChannelData::Quat(track),
        }
    }

    #[must_use]
    pub fn scale(joint_index: u16, track: KeyframeTrack<Vec3>) -> Self {
        Self {
            target: ChannelTarget {
                joint_index,
                dof: JointDof::Scale,
            },
            data: ChannelData::Vec3(track),
        }
    }

    fn validate(&self, channel: usize) -> Result<()> {
        let matches_dof = matches!(
            (&self.data, self.target.dof),
            (ChannelData::Vec3(_), JointDof::Translation | JointDof::Scale)
                | (ChannelData::Quat(_), JointDof::Rotation)
        );
        if !matches_dof {
            return Err(EmberError::SamplerMismatch { channel });
        }

        match &self.data {
            ChannelData::Vec3(track) => validate_track(track, channel),
            ChannelData::Quat(track) => validate_track(track, channel),
        }
    }
}

fn validate_track<T: Interpolatable>(track: &KeyframeTrack<T>, channel: usize) -> Result<()> {
    if track.times.is_empty() {
        return Err(EmberError::EmptyChannel { channel });
    }
    if track.times.len() != track.values.len() {
        return Err(EmberError::KeyframeCountMismatch {
            channel,
            times: track.times.len(),
            values: track.values.len(),
        });
    }
    if let Some(index) = track.times.windows(2).position(|w| w[1] <= w[0]) {
        return Err(EmberError::UnsortedKeyframes {
            channel,
            index: index + 1,
        });
    }
    Ok(())
}

/// An immutable set of channels.
///
/// Sampling is a pure function of `(animation, time)`; playback state lives in
/// [`AnimationAction`](crate::AnimationAction).
#[derive(Debug, Clone, Default)]
pub struct Animation {
    pub name: String,
    duration: f32,
    channels: Vec<Channel>,
}

impl Animation {
    /// Copies and validates `channels`.
    ///
    /// Without an explicit `duration` the animation ends at the latest key
    /// time of any channel.
    pub fn new(name: impl Into<String>, channels: &[Channel], duration: Option<f32>) -> Result<Self> {
        for (index, channel) in channels.iter().enumerate() {
            channel.validate(index)?;
        }

        let duration = match duration {
            Some(d) if d.is_nan() || d < 0.0 => return Err(EmberError::InvalidDuration(d)),
            Some(d) => d,
            None => channels
                .iter()
                .map(|c| c.data.end_time())
                .fold(0.0_f32, f32::max),
        };

        let mut channels = channels.to_vec();
        for channel in &mut channels {
            if let ChannelData::Quat(track) = &mut channel.data {
                for q in &mut track.values {
                    *q = q.normalize();
                }
            }
        }

        Ok(Self {
            name: name.into(),
            duration,
            channels,
        })
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Writes every channel's value at `time` into `joints`.
    ///
    /// `time` is clamped to `[0, duration]`. Channels aimed past the end of
    /// `joints` are skipped, so an animation authored for a larger skeleton
    /// still plays on a smaller one.
    pub fn sample(&self, time: f32, joints: &mut [JointTransform]) {
        let time = time.clamp(0.0, self.duration);

        for channel in &self.channels {
            let Some(joint) = joints.get_mut(channel.target.joint_index as usize) else {
                continue;
            };

            match (&channel.data, channel.target.dof) {
                (ChannelData::Vec3(track), JointDof::Translation) => {
                    if let Some(v) = track.sample(time) {
                        joint.translation = v;
                    }
                }
                (ChannelData::Vec3(track), JointDof::Scale) => {
                    if let Some(v) = track.sample(time) {
                        joint.scale = v;
                    }
                }
                (ChannelData::Quat(track), JointDof::Rotation) => {
                    if let Some(q) = track.sample(time) {
                        joint.rotation = q;
                    }
                }
                _ => {}
            }
        }
    }

    /// Bytes held by the channel arrays.
    #[must_use]
    pub fn heap_bytes(&self) -> usize {
        self.channels.len() * mem::size_of::<Channel>()
            + self
                .channels
                .iter()
                .map(|c| c.data.heap_bytes())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::InterpolationMode;

    fn linear_x() -> Channel {
        Channel::translation(
            0,
            KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)],
                InterpolationMode::Linear,
            ),
        )
    }

    #[test]
    fn duration_defaults_to_last_key() {
        let anim = Animation::new("walk", &[linear_x()], None).unwrap();
        assert_eq!(anim.duration(), 1.0);

        let anim = Animation::new("walk", &[linear_x()], Some(3.0)).unwrap();
        assert_eq!(anim.duration(), 3.0);
    }

    #[test]
    fn rejects_negative_duration() {
        assert!(matches!(
            Animation::new("bad", &[linear_x()], Some(-1.0)),
            Err(EmberError::InvalidDuration(_))
        ));
    }

    #[test]
    fn rejects_malformed_channels() {
        let unsorted = Channel::translation(
            0,
            KeyframeTrack::new(
                vec![0.0, 1.0, 1.0],
                vec![Vec3::ZERO; 3],
                InterpolationMode::Linear,
            ),
        );
        assert!(matches!(
            Animation::new("bad", &[linear_x(), unsorted], None),
            Err(EmberError::UnsortedKeyframes { channel: 1, index: 2 })
        ));

        let mismatch = Channel::translation(
            0,
            KeyframeTrack::new(vec![0.0], vec![Vec3::ZERO; 2], InterpolationMode::Step),
        );
        assert!(matches!(
            Animation::new("bad", &[mismatch], None),
            Err(EmberError::KeyframeCountMismatch { .. })
        ));

        let empty = Channel::scale(0, KeyframeTrack::new(vec![], vec![], InterpolationMode::Step));
        assert!(matches!(
            Animation::new("bad", &[empty], None),
            Err(EmberError::EmptyChannel { channel: 0 })
        ));

        let wrong_type = Channel {
            target: ChannelTarget {
                joint_index: 0,
                dof: JointDof::Rotation,
            },
            data: ChannelData::Vec3(KeyframeTrack::new(
                vec![0.0],
                vec![Vec3::ZERO],
                InterpolationMode::Step,
            )),
        };
        assert!(matches!(
            Animation::new("bad", &[wrong_type], None),
            Err(EmberError::SamplerMismatch { channel: 0 })
        ));
    }

    #[test]
    fn quaternion_samples_are_normalized() {
        let channel = Channel::rotation(
            0,
            KeyframeTrack::new(
                vec![0.0],
                vec![Quat::from_xyzw(0.0, 0.0, 0.0, 2.0)],
                InterpolationMode::Linear,
            ),
        );
        let anim = Animation::new("spin", &[channel], None).unwrap();
        let ChannelData::Quat(track) = &anim.channels()[0].data else {
            panic!("expected quaternion channel");
        };
        assert!((track.values[0].length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_joint_is_skipped() {
        let far = Channel::translation(
            5,
            KeyframeTrack::new(vec![0.0], vec![Vec3::ONE], InterpolationMode::Step),
        );
        let anim = Animation::new("far", &[far, linear_x()], None).unwrap();
        let mut pose = [JointTransform::IDENTITY; 2];
        anim.sample(0.5, &mut pose);
        assert_eq!(pose[0].translation, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(pose[1], JointTransform::IDENTITY);
    }
}
