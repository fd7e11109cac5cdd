use thiserror::Error;

/// Failures while building or reshaping a working frame.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("source frame has no decodable pixel backing: {0}")]
    Decode(String),

    #[error("frame dimensions {width}x{height} are empty")]
    EmptyFrame { width: u32, height: u32 },

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },

    #[error("target canvas {0}x{1} is empty")]
    ZeroTarget(u32, u32),
}
