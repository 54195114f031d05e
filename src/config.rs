use crate::controller::KeyBindings;
use crate::model::CameraConfig;
use crate::view::ClearColor;

/// Per-frame increments. Tunable constants, not derived from frame time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    /// Radians added to `theta` on every animated frame.
    pub theta_step: f32,
    /// Units added to `dx`/`dy` on every frame a direction is held.
    pub move_step: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self { theta_step: 0.01, move_step: 0.1 }
    }
}

/// Everything tunable about a session.
#[derive(Debug, Clone)]
pub struct CubeConfig {
    pub width: u32,
    pub height: u32,
    pub camera: CameraConfig,
    pub motion: MotionConfig,
    pub clear_color: ClearColor,
    pub key_bindings: KeyBindings,
}

impl Default for CubeConfig {
    fn default() -> Self {
        let (width, height) = (600, 600);
        Self {
            width,
            height,
            camera: CameraConfig { aspect: width as f32 / height as f32, ..CameraConfig::default() },
            motion: MotionConfig::default(),
            clear_color: ClearColor::default(),
            key_bindings: KeyBindings::default(),
        }
    }
}
