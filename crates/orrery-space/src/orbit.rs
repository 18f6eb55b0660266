//! Circular orbital motion in the XZ plane.

use glam::{DVec2, DVec3, Vec3};

/// Errors raised when an orbit is configured.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum OrbitError {
    /// The period is zero, infinite, or NaN.
    #[error("orbital period {0} must be finite and non-zero")]
    InvalidPeriod(f64),
}

/// A validated orbital period in seconds.
///
/// Elapsed time is divided by the period, so zero is rejected. Negative
/// periods are allowed and orbit in the opposite direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalPeriod(f64);

impl OrbitalPeriod {
    pub fn new(seconds: f64) -> Result<Self, OrbitError> {
        if seconds == 0.0 || !seconds.is_finite() {
            return Err(OrbitError::InvalidPeriod(seconds));
        }
        Ok(Self(seconds))
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for OrbitalPeriod {
    type Error = OrbitError;

    fn try_from(seconds: f64) -> Result<Self, Self::Error> {
        Self::new(seconds)
    }
}

/// Position on a circle of radius `radius` at time `t`, as `(x, z)`.
///
/// The angle is `t / period` radians, so one revolution takes `2π · period`
/// seconds.
pub fn orbit_position(t: f64, period: OrbitalPeriod, radius: f64) -> DVec2 {
    let angle = t / period.0;
    DVec2::new(radius * angle.cos(), radius * angle.sin())
}

/// A body's circular orbit around a fixed centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularOrbit {
    pub radius: f64,
    pub period: OrbitalPeriod,
    pub center: DVec3,
}

impl CircularOrbit {
    pub fn new(radius: f64, period: OrbitalPeriod, center: DVec3) -> Self {
        Self {
            radius,
            period,
            center,
        }
    }

    /// Orbit around the origin.
    pub fn around_origin(radius: f64, period: OrbitalPeriod) -> Self {
        Self::new(radius, period, DVec3::ZERO)
    }

    /// Horizontal position at time `t`, with the given height.
    pub fn position_at(&self, t: f64, y: f64) -> DVec3 {
        let xz = orbit_position(t, self.period, self.radius);
        DVec3::new(self.center.x + xz.x, y, self.center.z + xz.y)
    }

    /// Move `position` onto the orbit at time `t`. The Y coordinate is untouched.
    pub fn apply(&self, t: f64, position: &mut Vec3) {
        let p = self.position_at(t, position.y as f64);
        position.x = p.x as f32;
        position.z = p.z as f32;
    }
}
