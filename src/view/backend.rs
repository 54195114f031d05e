use glam::Mat4;

use crate::error::Result;
use crate::model::Vertex;

/// Shader constants the core pushes. One variant per uniform in cube.wgsl.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Theta(f32),
    Dx(f32),
    Dy(f32),
    View(Mat4),
    Projection(Mat4),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ClearColor {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        // Pink
        Self::new(1.0, 0.75, 0.79, 1.0)
    }
}

impl From<ClearColor> for wgpu::Color {
    fn from(c: ClearColor) -> Self {
        wgpu::Color { r: c.r, g: c.g, b: c.b, a: c.a }
    }
}

/// Drawing surface the frame scheduler talks to.
///
/// Implementations own the compiled program, the vertex/index buffers and the
/// depth-tested target. Any `Err` is fatal for the session.
pub trait RenderBackend {
    /// Upload the static vertex and index buffers. Called once before the first frame.
    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<()>;

    fn set_uniform(&mut self, uniform: Uniform) -> Result<()>;

    /// Clear color and depth for the upcoming draw.
    fn clear(&mut self, color: ClearColor) -> Result<()>;

    /// Draw `index_count` indices from the bound buffers with the bound program.
    fn draw_indexed(&mut self, index_count: u32) -> Result<()>;
}
