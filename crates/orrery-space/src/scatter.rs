//! Rejection-sampled star placement around an anchor.
//!
//! Candidates are drawn in a cylinder (radius, angle, vertical offset) and kept
//! only if they are at least `min_distance` from every star already accepted in
//! the same batch. Each star gets a bounded number of draws.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Default number of candidate draws per star.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// Errors from star placement.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScatterError {
    #[error("invalid scatter bounds: {0}")]
    InvalidBounds(String),

    /// One star used up its draws; the batch is discarded.
    #[error(
        "placed {placed} of {requested} stars before a candidate failed {attempts} times"
    )]
    PlacementTimeout {
        placed: usize,
        requested: usize,
        attempts: u32,
    },
}

/// Sampling ranges. Upper bounds are exclusive unless equal to the lower bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterBounds {
    pub max_radius: f32,
    pub vertical_min: f32,
    pub vertical_max: f32,
    pub scale_min: f32,
    pub scale_max: f32,
}

impl Default for ScatterBounds {
    fn default() -> Self {
        Self {
            max_radius: 20.0,
            vertical_min: -3.0,
            vertical_max: 3.0,
            scale_min: 0.05,
            scale_max: 0.2,
        }
    }
}

/// One accepted star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarPlacement {
    pub position: Vec3,
    /// Uniform scale.
    pub scale: f32,
    /// Rotation about Y in radians, in `[0, 4π)`.
    pub rotation: f32,
}

/// Places `count` stars around `anchor` with pairwise separation `min_distance`.
#[derive(Debug, Clone, PartialEq)]
pub struct StarScatterer {
    anchor: Vec3,
    count: usize,
    min_distance: f32,
    bounds: ScatterBounds,
    max_attempts: u32,
}

impl StarScatterer {
    pub fn new(
        anchor: Vec3,
        count: usize,
        min_distance: f32,
        bounds: ScatterBounds,
    ) -> Result<Self, ScatterError> {
        let scatterer = Self {
            anchor,
            count,
            min_distance,
            bounds,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        };
        scatterer.validate()?;
        Ok(scatterer)
    }

    /// Override the per-star draw budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Result<Self, ScatterError> {
        self.max_attempts = max_attempts;
        self.validate()?;
        Ok(self)
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    fn validate(&self) -> Result<(), ScatterError> {
        let b = &self.bounds;
        let finite = self.anchor.is_finite()
            && [
                self.min_distance,
                b.max_radius,
                b.vertical_min,
                b.vertical_max,
                b.scale_min,
                b.scale_max,
            ]
            .iter()
            .all(|v| v.is_finite());

        let reason = if !finite {
            "all bounds must be finite"
        } else if self.min_distance < 0.0 {
            "min_distance must be >= 0"
        } else if b.max_radius <= 0.0 {
            "max_radius must be positive"
        } else if b.vertical_min > b.vertical_max {
            "vertical_min exceeds vertical_max"
        } else if b.scale_min <= 0.0 || b.scale_min > b.scale_max {
            "scale range must satisfy 0 < min <= max"
        } else if self.max_attempts == 0 {
            "max_attempts must be non-zero"
        } else {
            return Ok(());
        };
        Err(ScatterError::InvalidBounds(reason.to_string()))
    }

    /// Place the stars using a `ChaCha8Rng` seeded with `seed`.
    pub fn scatter_seeded(&self, seed: u64) -> Result<Vec<StarPlacement>, ScatterError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.scatter(&mut rng)
    }

    /// Place the stars, drawing from `rng`.
    ///
    /// Returns [`ScatterError::PlacementTimeout`] if any single star fails to
    /// find a free spot within the draw budget.
    pub fn scatter<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<StarPlacement>, ScatterError> {
        if self.count == 0 {
            return Ok(Vec::new());
        }

        let mut placed: Vec<StarPlacement> = Vec::with_capacity(self.count);
        let mut total_draws: u64 = 0;

        while placed.len() < self.count {
            let mut accepted = None;
            for _ in 0..self.max_attempts {
                total_draws += 1;
                let candidate = self.draw_candidate(rng);
                if self.is_clear(&placed, candidate) {
                    accepted = Some(candidate);
                    break;
                }
            }

            let Some(position) = accepted else {
                log::warn!(
                    "Star placement gave up after {} draws ({} of {} placed)",
                    self.max_attempts,
                    placed.len(),
                    self.count
                );
                return Err(ScatterError::PlacementTimeout {
                    placed: placed.len(),
                    requested: self.count,
                    attempts: self.max_attempts,
                });
            };

            let scale = sample(rng, self.bounds.scale_min, self.bounds.scale_max);
            let rotation = sample(rng, 0.0, 2.0 * std::f32::consts::TAU);
            placed.push(StarPlacement {
                position,
                scale,
                rotation,
            });
        }

        log::debug!("Placed {} stars in {total_draws} draws", placed.len());
        Ok(placed)
    }

    fn draw_candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let radius = sample(rng, 0.0, self.bounds.max_radius);
        let angle = sample(rng, 0.0, std::f32::consts::TAU);
        let offset = sample(rng, self.bounds.vertical_min, self.bounds.vertical_max);
        Vec3::new(
            self.anchor.x + radius * angle.cos(),
            self.anchor.y + offset,
            self.anchor.z + radius * angle.sin(),
        )
    }

    fn is_clear(&self, placed: &[StarPlacement], candidate: Vec3) -> bool {
        placed
            .iter()
            .all(|s| s.position.distance(candidate) >= self.min_distance)
    }
}

/// Uniform in `[lo, hi)`, or `lo` when the range is empty.
fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if lo < hi { rng.random_range(lo..hi) } else { lo }
}
