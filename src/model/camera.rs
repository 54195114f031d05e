use glam::{Mat4, Vec3};
use std::f32::consts::PI;

use crate::error::{CubeError, Result};

/// Fixed camera placement and frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            // 5 units out of the screen, looking down -Z
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::new(0.0, 0.0, -10.0),
            up: Vec3::Y,
            fov_y: PI / 3.0,
            aspect: 1.0,
            z_near: 0.5,
            z_far: 10.0,
        }
    }
}

/// View and projection, computed once at startup and never touched again.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Result<Self> {
        let view = build_view(config.eye, config.target, config.up)?;
        let projection = build_projection(config.fov_y, config.aspect, config.z_near, config.z_far)?;
        tracing::debug!(eye = ?config.eye, target = ?config.target, fov_y = config.fov_y, "camera built");
        Ok(Self { view, projection })
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }
}

fn finite_vec(name: &'static str, v: Vec3) -> Result<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(CubeError::camera(name, format!("{v} is not finite")))
    }
}

/// Right-handed look-at view matrix.
pub fn build_view(eye: Vec3, target: Vec3, up: Vec3) -> Result<Mat4> {
    finite_vec("eye", eye)?;
    finite_vec("target", target)?;
    finite_vec("up", up)?;

    let forward = target - eye;
    if forward.length_squared() <= f32::EPSILON {
        return Err(CubeError::camera("target", "eye and target coincide"));
    }
    if up.length_squared() <= f32::EPSILON {
        return Err(CubeError::camera("up", "up vector has zero length"));
    }
    if forward.normalize().cross(up.normalize()).length_squared() <= f32::EPSILON {
        return Err(CubeError::camera("up", "up vector is parallel to the view direction"));
    }

    Ok(Mat4::look_at_rh(eye, target, up))
}

/// Right-handed perspective projection with wgpu's [0, 1] depth range.
pub fn build_projection(fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Result<Mat4> {
    if !(fov_y.is_finite() && fov_y > 0.0 && fov_y < PI) {
        return Err(CubeError::camera("fov_y", format!("{fov_y} is outside (0, pi)")));
    }
    if !(aspect.is_finite() && aspect > 0.0) {
        return Err(CubeError::camera("aspect", format!("{aspect} must be positive")));
    }
    if !(z_near.is_finite() && z_near > 0.0) {
        return Err(CubeError::camera("z_near", format!("{z_near} must be positive")));
    }
    if !(z_far.is_finite() && z_far > z_near) {
        return Err(CubeError::camera("z_far", format!("{z_far} must exceed z_near {z_near}")));
    }

    Ok(Mat4::perspective_rh(fov_y, aspect, z_near, z_far))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejects(result: Result<Mat4>, field: &str) {
        match result {
            Err(CubeError::InvalidCameraParameter { name, .. }) => assert_eq!(name, field),
            other => panic!("expected InvalidCameraParameter({field}), got {other:?}"),
        }
    }

    #[test]
    fn projection_rejects_malformed_frustum() {
        rejects(build_projection(1.0, 1.0, 0.0, 10.0), "z_near");
        rejects(build_projection(1.0, 1.0, -0.5, 10.0), "z_near");
        rejects(build_projection(1.0, 1.0, 0.5, 0.5), "z_far");
        rejects(build_projection(1.0, 1.0, 0.5, 0.1), "z_far");
        rejects(build_projection(1.0, 0.0, 0.5, 10.0), "aspect");
        rejects(build_projection(1.0, -2.0, 0.5, 10.0), "aspect");
        rejects(build_projection(0.0, 1.0, 0.5, 10.0), "fov_y");
        rejects(build_projection(PI, 1.0, 0.5, 10.0), "fov_y");
        rejects(build_projection(f32::NAN, 1.0, 0.5, 10.0), "fov_y");
    }

    #[test]
    fn projection_accepts_default_frustum() {
        let cfg = CameraConfig::default();
        let proj = build_projection(cfg.fov_y, cfg.aspect, cfg.z_near, cfg.z_far).unwrap();
        assert!(proj.is_finite());
        assert!(proj.determinant().abs() > 0.0);
    }

    #[test]
    fn view_looks_down_negative_z() {
        let view = build_view(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -10.0), Vec3::Y).unwrap();
        // Right-handed look-at stores -forward in the third row.
        let forward = -view.row(2).truncate();
        assert!(forward.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6), "forward was {forward}");
        // Eye maps to the origin of view space.
        let eye_in_view = view.transform_point3(Vec3::new(0.0, 0.0, 5.0));
        assert!(eye_in_view.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn view_rejects_degenerate_look_at() {
        rejects(build_view(Vec3::ONE, Vec3::ONE, Vec3::Y), "target");
        rejects(build_view(Vec3::ZERO, Vec3::NEG_Z, Vec3::ZERO), "up");
        rejects(build_view(Vec3::ZERO, Vec3::Y, Vec3::Y), "up");
        rejects(build_view(Vec3::splat(f32::INFINITY), Vec3::ZERO, Vec3::Y), "eye");
    }

    #[test]
    fn default_camera_builds() {
        let cam = Camera::new(&CameraConfig::default()).unwrap();
        assert!(cam.view_proj().is_finite());
    }

    #[test]
    fn camera_surfaces_bad_config() {
        let cfg = CameraConfig { z_near: 0.0, ..CameraConfig::default() };
        assert!(matches!(
            Camera::new(&cfg),
            Err(CubeError::InvalidCameraParameter { name: "z_near", .. })
        ));
    }
}
