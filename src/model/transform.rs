use glam::{Mat4, Vec3};

use super::camera::Camera;

/// Rotation and 2D offset of the cube. Owned by the frame scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformState {
    /// Radians around X. Unbounded, never wrapped.
    pub theta: f32,
    pub dx: f32,
    pub dy: f32,
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Translate(dx, dy, 0) * RotateX(theta)`. Same math as `vs_main` in cube.wgsl.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.dx, self.dy, 0.0)) * Mat4::from_rotation_x(self.theta)
    }

    /// `Projection * View * Translate * RotateX`. Order matters: swapping the
    /// model terms moves the cube along a rotated path.
    pub fn clip_matrix(&self, camera: &Camera) -> Mat4 {
        camera.projection * camera.view * self.model_matrix()
    }

    /// Per-vertex form of `model_matrix`, written the way the shader evaluates it.
    pub fn transform_position(&self, p: Vec3) -> Vec3 {
        let (s, c) = self.theta.sin_cos();
        let rotated = Vec3::new(p.x, c * p.y - s * p.z, s * p.y + c * p.z);
        rotated + Vec3::new(self.dx, self.dy, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::camera::CameraConfig;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn zero_state_is_projection_times_view() {
        let cam = Camera::new(&CameraConfig::default()).unwrap();
        let clip = TransformState::new().clip_matrix(&cam);
        assert!(clip.abs_diff_eq(cam.projection * cam.view, 1e-6));
    }

    #[test]
    fn rotation_is_applied_before_translation() {
        let t = TransformState { theta: FRAC_PI_2, dx: 0.0, dy: 1.0 };
        // +Y rotates onto +Z, then slides up in unrotated space
        let p = t.model_matrix().transform_point3(Vec3::Y);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 1.0, 1.0), 1e-6), "got {p}");

        // Translating first would push the offset through the rotation too
        let swapped = Mat4::from_rotation_x(t.theta) * Mat4::from_translation(Vec3::new(0.0, t.dy, 0.0));
        let q = swapped.transform_point3(Vec3::Y);
        assert!(q.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6), "got {q}");
    }

    #[test]
    fn shader_form_matches_matrix_form() {
        let t = TransformState { theta: 0.73, dx: -0.4, dy: 1.2 };
        let m = t.model_matrix();
        for p in [Vec3::new(1.0, -1.0, -1.0), Vec3::new(-1.0, 1.0, 1.0), Vec3::new(0.3, 0.2, -0.9)] {
            assert!(m.transform_point3(p).abs_diff_eq(t.transform_position(p), 1e-5));
        }
    }
}
