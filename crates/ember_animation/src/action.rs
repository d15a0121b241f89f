use crate::AnimationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// Playback state of one animation instance.
///
/// The animation itself stays immutable and shareable; every skeleton that
/// plays it keeps its own action.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    animation: AnimationId,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    // -1 while a ping-pong cycle plays backwards
    direction: f32,
}

impl AnimationAction {
    #[must_use]
    pub fn new(animation: AnimationId) -> Self {
        Self {
            animation,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: true,
            direction: 1.0,
        }
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    #[inline]
    #[must_use]
    pub fn animation(&self) -> AnimationId {
        self.animation
    }

    /// Whether the action contributes to a blend this frame.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.weight > 0.0
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
        self.direction = 1.0;
        self.paused = false;
    }

    /// Moves the playhead by `dt` scaled by `time_scale`, wrapping or
    /// clamping to `[0, duration]` according to the loop mode.
    pub fn advance(&mut self, dt: f32, duration: f32) {
        if self.paused || !self.enabled {
            return;
        }
        if duration <= 0.0 {
            self.time = 0.0;
            return;
        }

        self.time += dt * self.time_scale * self.direction;

        match self.loop_mode {
            LoopMode::Once => {
                // Stop at either end and auto-pause
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                self.time = self.time.rem_euclid(duration);
            }
            LoopMode::PingPong => {
                // An odd number of end crossings this step reverses travel
                let crossings = (self.time / duration).floor();
                if crossings.rem_euclid(2.0) >= 1.0 {
                    self.direction = -self.direction;
                }

                let period = duration * 2.0;
                let t = self.time.rem_euclid(period);
                self.time = if t > duration { period - t } else { t };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(mode: LoopMode) -> AnimationAction {
        AnimationAction::new(AnimationId::NULL).with_loop_mode(mode)
    }

    #[test]
    fn once_clamps_and_pauses() {
        let mut a = action(LoopMode::Once);
        a.advance(1.5, 1.0);
        assert_eq!(a.time, 1.0);
        assert!(a.paused);
        a.advance(1.0, 1.0);
        assert_eq!(a.time, 1.0);
    }

    #[test]
    fn loop_wraps_both_directions() {
        let mut a = action(LoopMode::Loop);
        a.advance(2.5, 2.0);
        assert!((a.time - 0.5).abs() < 1e-6);

        a.time_scale = -1.0;
        a.advance(1.0, 2.0);
        assert!((a.time - 1.5).abs() < 1e-6);
    }

    #[test]
    fn ping_pong_reflects_and_returns() {
        let mut a = action(LoopMode::PingPong);
        a.advance(1.25, 1.0);
        assert!((a.time - 0.75).abs() < 1e-6);
        a.advance(0.5, 1.0);
        assert!((a.time - 0.25).abs() < 1e-6);
        a.advance(0.5, 1.0);
        assert!((a.time - 0.25).abs() < 1e-6);
        a.advance(0.25, 1.0);
        assert!((a.time - 0.5).abs() < 1e-6);
    }

    #[test]
    fn ping_pong_keeps_direction_across_long_steps() {
        let mut a = action(LoopMode::PingPong);
        a.advance(0.5, 1.0);
        // Crosses both ends in one step and keeps moving forward
        a.advance(2.0, 1.0);
        assert!((a.time - 0.5).abs() < 1e-6);
        a.advance(0.1, 1.0);
        assert!((a.time - 0.6).abs() < 1e-5);

        let mut b = action(LoopMode::PingPong);
        b.advance(2.6, 1.0);
        assert!((b.time - 0.6).abs() < 1e-5);
        b.advance(0.1, 1.0);
        assert!((b.time - 0.7).abs() < 1e-5);

        // Three crossings leave it travelling backwards
        let mut c = action(LoopMode::PingPong);
        c.advance(3.25, 1.0);
        assert!((c.time - 0.75).abs() < 1e-5);
        c.advance(0.25, 1.0);
        assert!((c.time - 0.5).abs() < 1e-5);
    }

    #[test]
    fn paused_action_does_not_move() {
        let mut a = action(LoopMode::Loop);
        a.paused = true;
        a.advance(0.5, 1.0);
        assert_eq!(a.time, 0.0);
    }
}
