//! Exponential smoothing of a pointer-driven camera offset.

use glam::Vec2;

/// One step of first-order damping toward `target`.
///
/// The blend factor `gain * dt` is clamped to `[0, 1]`, so a long frame lands
/// on the target instead of overshooting it.
pub fn damp(current: f32, target: f32, gain: f32, dt: f32) -> f32 {
    current + (target - current) * (gain * dt).clamp(0.0, 1.0)
}

/// Smoothed camera offset following the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxSmoother {
    offset: Vec2,
    /// Damping gain `k`.
    pub gain: f32,
    /// Offset for a pointer at the window edge (cursor = ±0.5).
    pub amplitude: f32,
}

impl ParallaxSmoother {
    pub fn new(gain: f32, amplitude: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            gain,
            amplitude,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Target offset for a normalised cursor. Screen Y grows downward, so it is
    /// flipped.
    pub fn target_for(&self, cursor: Vec2) -> Vec2 {
        Vec2::new(cursor.x * self.amplitude, -cursor.y * self.amplitude)
    }

    /// Move toward the cursor's target and return the new offset.
    pub fn update(&mut self, cursor: Vec2, dt: f32) -> Vec2 {
        let target = self.target_for(cursor);
        self.offset = Vec2::new(
            damp(self.offset.x, target.x, self.gain, dt),
            damp(self.offset.y, target.y, self.gain, dt),
        );
        self.offset
    }
}
