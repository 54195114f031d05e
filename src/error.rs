/// Errors surfaced by the cube renderer.
///
/// Startup errors abort initialization. Errors raised while a frame is being
/// drawn are fatal for the session: the frame loop stops instead of retrying.
#[derive(Debug, thiserror::Error)]
pub enum CubeError {
    /// Malformed look-at or frustum input; rejected before any matrix is built.
    #[error("invalid camera parameter `{name}`: {reason}")]
    InvalidCameraParameter { name: &'static str, reason: String },

    /// Adapter/device/surface acquisition, shader compile or link failure,
    /// or a lost surface mid-frame.
    #[error("render backend error: {0}")]
    RenderBackend(String),
}

impl CubeError {
    pub fn camera(name: &'static str, reason: impl Into<String>) -> Self {
        CubeError::InvalidCameraParameter { name, reason: reason.into() }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        CubeError::RenderBackend(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CubeError>;
