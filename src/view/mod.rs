// VIEW: rendering and graphics
pub mod backend;
pub mod render;
pub mod gpu_init;

pub use backend::{ClearColor, RenderBackend, Uniform};
pub use render::{CubeUniform, WgpuBackend};
pub use gpu_init::GpuContext;
