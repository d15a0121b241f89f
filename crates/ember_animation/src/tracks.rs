use crate::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Hold the earlier keyframe until the next key time is reached.
    Step,
    Linear,
}

/// One time-sampled curve. `times` is strictly ascending once the track is
/// part of an [`Animation`](crate::Animation).
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

/// Returns `i` such that `time` lies in `[times[i], times[i + 1])`.
///
/// Times at or before the first key map to interval 0, times at or after the
/// last key map to the last interval. Requires at least two keys.
#[must_use]
pub fn find_interval(times: &[f32], time: f32) -> usize {
    debug_assert!(times.len() >= 2);
    let last = times.len() - 1;

    if time <= times[0] {
        return 0;
    }
    if time >= times[last] {
        return last - 1;
    }

    let (mut low, mut high) = (0, times.len());
    while high > low + 1 {
        let mid = (low + high) / 2;
        if time >= times[mid] {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last key, or 0 for an empty track.
    #[inline]
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Evaluates the curve at `time`.
    ///
    /// Returns `None` for an empty track, or when `values` is shorter than
    /// `times` around the sampled interval.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        match self.times.len() {
            0 => None,
            1 => self.values.first().copied(),
            _ => {
                let index = find_interval(&self.times, time);
                self.sample_at_frame(index, time)
            }
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> Option<T> {
        let next = index + 1;
        let (t0, t1) = (self.times[index], self.times[next]);
        let (v0, v1) = (*self.values.get(index)?, *self.values.get(next)?);

        // Duplicate key times degrade to step so the fraction never divides by zero.
        if self.interpolation == InterpolationMode::Step || t0 == t1 {
            return Some(if time < t1 { v0 } else { v1 });
        }

        let alpha = (time.clamp(t0, t1) - t0) / (t1 - t0);
        Some(T::interpolate_linear(v0, v1, alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn find_interval_clamps_and_bisects() {
        let times = [0.0, 1.0, 2.0, 4.0];
        assert_eq!(find_interval(&times, -1.0), 0);
        assert_eq!(find_interval(&times, 0.0), 0);
        assert_eq!(find_interval(&times, 0.5), 0);
        assert_eq!(find_interval(&times, 1.0), 1);
        assert_eq!(find_interval(&times, 3.9), 2);
        assert_eq!(find_interval(&times, 4.0), 2);
        assert_eq!(find_interval(&times, 100.0), 2);
    }

    #[test]
    fn step_switches_exactly_at_next_key() {
        let track = KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Vec3::ZERO, Vec3::X],
            InterpolationMode::Step,
        );
        assert_eq!(track.sample(0.99), Some(Vec3::ZERO));
        assert_eq!(track.sample(1.0), Some(Vec3::X));
    }

    #[test]
    fn find_interval_two_keys() {
        let times = [0.25, 0.75];
        assert_eq!(find_interval(&times, 0.5), 0);
        assert_eq!(find_interval(&times, 0.75), 0);
    }

    #[test]
    fn duplicate_times_behave_like_step() {
        let track = KeyframeTrack::new(
            vec![0.0, 0.0, 1.0],
            vec![Vec3::X, Vec3::Y, Vec3::Z],
            InterpolationMode::Linear,
        );
        assert_eq!(track.sample(-1.0), Some(Vec3::X));
        assert_eq!(track.sample(0.0), Some(Vec3::Y));
        assert_eq!(track.sample(0.5), Some(Vec3::new(0.0, 0.5, 0.5)));
    }

    #[test]
    fn short_values_do_not_panic() {
        let track = KeyframeTrack::new(
            vec![0.0, 1.0, 2.0],
            vec![Vec3::ZERO, Vec3::X],
            InterpolationMode::Linear,
        );
        assert_eq!(track.sample(0.5), Some(Vec3::X * 0.5));
        assert!(track.sample(1.5).is_none());

        let lonely: KeyframeTrack<Vec3> =
            KeyframeTrack::new(vec![0.0], vec![], InterpolationMode::Step);
        assert!(lonely.sample(0.0).is_none());
    }

    #[test]
    fn empty_track_has_no_sample() {
        let track: KeyframeTrack<Vec3> =
            KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
        assert!(track.sample(0.0).is_none());
        assert_eq!(track.end_time(), 0.0);
    }
}
