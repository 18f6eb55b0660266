//! Perspective camera producing reverse-Z view-projection matrices.

use glam::{Mat3, Mat4, Quat, Vec3};

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation as a unit quaternion; the camera looks down its local -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    pub fn new(fov_y_deg: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y: fov_y_deg.to_radians(),
            near,
            far,
            ..Self::default()
        }
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * Mat4::from_quat(self.rotation)).inverse()
    }

    /// Reverse-Z: the near plane maps to depth 1 and the far plane to 0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Ignores degenerate sizes so a minimised window keeps the last aspect.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// Rotate to face `target`, keeping world +Y as up where possible.
    ///
    /// Looking straight along ±Y has no unique roll; the camera's right axis
    /// is then pinned to world +X.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(forward) = (target - self.position).try_normalize() else {
            return;
        };
        let right = forward
            .cross(Vec3::Y)
            .try_normalize()
            .unwrap_or(Vec3::X);
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: 75f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn assert_vec_near(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_identity_camera_looks_down_neg_z() {
        let camera = Camera::default();
        assert_vec_near(camera.forward(), Vec3::NEG_Z);
    }

    #[test]
    fn test_new_converts_degrees() {
        let camera = Camera::new(90.0, 0.5, 50.0);
        assert!((camera.fov_y - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(camera.near, 0.5);
        assert_eq!(camera.far, 50.0);
    }

    #[test]
    fn test_aspect_ratio_ignores_zero_height() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1920.0, 1080.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect_ratio(1920.0, 0.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut camera = Camera {
            position: Vec3::new(0.0, 3.0, 12.0),
            ..Camera::default()
        };
        camera.look_at(Vec3::ZERO);
        assert_vec_near(camera.forward(), Vec3::new(0.0, -3.0, -12.0).normalize());
        assert!(camera.up().y > 0.0);
        assert!(camera.right().y.abs() < 1e-5);
    }

    #[test]
    fn test_look_at_straight_down() {
        let mut camera = Camera {
            position: Vec3::new(0.0, 20.0, 0.0),
            ..Camera::default()
        };
        camera.look_at(Vec3::ZERO);
        assert_vec_near(camera.forward(), Vec3::NEG_Y);
        assert_vec_near(camera.right(), Vec3::X);
    }

    #[test]
    fn test_look_at_own_position_is_ignored() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::ZERO);
        assert_eq!(camera.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_reverse_z_depth_range() {
        let camera = Camera::default();
        let proj = camera.projection_matrix();

        let near = proj * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        assert!((near.z / near.w - 1.0).abs() < 1e-4);

        let far = proj * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((far.z / far.w).abs() < 1e-4);
    }

    #[test]
    fn test_view_matrix_inverse_is_camera_transform() {
        let camera = Camera {
            position: Vec3::new(10.0, 20.0, 30.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..Camera::default()
        };
        let reconstructed = camera.view_matrix().inverse().col(3).truncate();
        assert_vec_near(reconstructed, camera.position);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut camera = Camera {
            position: Vec3::new(4.0, 5.0, 6.0),
            ..Camera::default()
        };
        camera.look_at(Vec3::new(1.0, 0.0, -2.0));
        let clip = camera.view_projection_matrix() * Vec4::new(1.0, 0.0, -2.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-4);
        assert!((clip.y / clip.w).abs() < 1e-4);
    }
}
