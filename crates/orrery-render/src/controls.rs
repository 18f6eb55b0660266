//! Orbit camera controller: drag rotates around a target, scroll zooms.
//!
//! Rotation input accumulates into pending yaw/pitch deltas. With damping on,
//! each [`OrbitControls::update`] applies `damping_factor` of the pending delta
//! and decays the rest, giving the camera inertia after the drag ends.

use glam::{Vec2, Vec3};

use crate::camera::Camera;

/// Elevation stays just short of the poles so the look-at basis never degenerates.
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 1e-3;

const MIN_DISTANCE: f32 = 1e-3;
const SETTLE_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    /// Azimuth in radians. 0 places the camera on the +Z side of the target.
    yaw: f32,
    /// Elevation above the target's horizon in radians.
    pitch: f32,
    distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
    pub enable_damping: bool,
    /// Share of the pending rotation applied per update, in (0, 1].
    pub damping_factor: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Distance multiplier per scroll line toward the target.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitControls {
    /// Start from the camera's current `position` orbiting `target`.
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let distance = offset.length().max(MIN_DISTANCE);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self {
            target,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 1.0,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.95,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }

    pub fn with_damping(mut self, enabled: bool, factor: f32) -> Self {
        self.enable_damping = enabled;
        self.damping_factor = factor.clamp(SETTLE_EPSILON, 1.0);
        self
    }

    pub fn with_speeds(mut self, rotate_speed: f32, zoom_speed: f32) -> Self {
        self.rotate_speed = rotate_speed;
        self.zoom_speed = zoom_speed;
        self
    }

    /// Queue a rotation from a pointer drag of `delta` pixels.
    ///
    /// Dragging right swings the camera left around the target; dragging down
    /// raises it.
    pub fn rotate(&mut self, delta: Vec2) {
        self.pending_yaw -= delta.x * self.rotate_speed;
        self.pending_pitch += delta.y * self.rotate_speed;
    }

    /// Queue a zoom of `lines` scroll lines. Positive values move closer.
    pub fn zoom(&mut self, lines: f32) {
        if lines != 0.0 && self.zoom_speed > 0.0 {
            self.pending_zoom *= self.zoom_speed.powf(lines);
        }
    }

    /// Apply pending input. Call once per frame.
    pub fn update(&mut self) {
        if self.enable_damping {
            self.yaw += self.pending_yaw * self.damping_factor;
            self.pitch += self.pending_pitch * self.damping_factor;
            self.pending_yaw *= 1.0 - self.damping_factor;
            self.pending_pitch *= 1.0 - self.damping_factor;
            if self.pending_yaw.abs() < SETTLE_EPSILON {
                self.pending_yaw = 0.0;
            }
            if self.pending_pitch.abs() < SETTLE_EPSILON {
                self.pending_pitch = 0.0;
            }
        } else {
            self.yaw += self.pending_yaw;
            self.pitch += self.pending_pitch;
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
        }

        self.yaw %= std::f32::consts::TAU;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance = (self.distance * self.pending_zoom)
            .clamp(self.min_distance.max(MIN_DISTANCE), self.max_distance.max(MIN_DISTANCE));
        self.pending_zoom = 1.0;
    }

    pub fn position(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.target
            + Vec3::new(
                self.distance * cos_pitch * sin_yaw,
                self.distance * sin_pitch,
                self.distance * cos_pitch * cos_yaw,
            )
    }

    /// Place `camera` on the orbit, shifted by `offset` in its own right/up
    /// plane, and aim it at the target.
    pub fn apply(&self, camera: &mut Camera, offset: Vec2) {
        camera.position = self.position();
        camera.look_at(self.target);
        if offset != Vec2::ZERO {
            camera.position += camera.right() * offset.x + camera.up() * offset.y;
            camera.look_at(self.target);
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw == 0.0 && self.pending_pitch == 0.0
    }
}
