// MODEL: cube data, camera and transform state
pub mod geometry;
pub mod camera;
pub mod transform;

pub use geometry::{Vertex, VERTICES, INDICES, INDEX_COUNT};
pub use camera::{Camera, CameraConfig, build_view, build_projection};
pub use transform::TransformState;
