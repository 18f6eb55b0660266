//! Triangular-wave sweep used to rock a model back and forth.

/// An angle that advances by a fixed step each frame and bounces between
/// `-limit` and `limit`.
///
/// The angle is clamped on the frame it would overshoot, so `|angle| <= limit`
/// holds after every call to [`advance`](Self::advance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedOscillator {
    angle: f32,
    step: f32,
    limit: f32,
}

impl BoundedOscillator {
    pub fn new(step: f32, limit: f32) -> Self {
        Self {
            angle: 0.0,
            step,
            limit: limit.abs(),
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Current signed step.
    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Change the step size, keeping the current direction.
    pub fn set_step_magnitude(&mut self, magnitude: f32) {
        let direction = if self.step < 0.0 { -1.0 } else { 1.0 };
        self.step = magnitude.abs() * direction;
    }

    /// Advance one frame and return the new angle.
    pub fn advance(&mut self) -> f32 {
        self.advance_scaled(1.0)
    }

    /// Advance by `rate` steps. A rate of zero holds the current angle.
    pub fn advance_scaled(&mut self, rate: f32) -> f32 {
        let next = self.angle + self.step * rate.max(0.0);
        if next.abs() > self.limit {
            self.angle = next.clamp(-self.limit, self.limit);
            self.step = -self.step;
        } else {
            self.angle = next;
        }
        self.angle
    }
}
