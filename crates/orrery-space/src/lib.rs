//! Time-driven scene math: circular orbits, rejection-sampled star placement,
//! bounded back-and-forth sweeps, and exponential parallax smoothing.
//!
//! Everything here is pure or owns only its own small state, so it can be
//! driven by a deterministic clock and a seeded RNG in tests.

pub mod orbit;
pub mod oscillation;
pub mod parallax;
pub mod scatter;

pub use orbit::{CircularOrbit, OrbitError, OrbitalPeriod, orbit_position};
pub use oscillation::BoundedOscillator;
pub use parallax::{ParallaxSmoother, damp};
pub use scatter::{ScatterBounds, ScatterError, StarPlacement, StarScatterer};
