use crate::capture::image::CaptureError;

/// Failures while setting up a capture editor
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Could not allocate a {width}x{height} drawing surface")]
    Surface { width: u32, height: u32 },

    #[error("Background image: {0}")]
    Decode(#[from] CaptureError),

    #[error("Background decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
