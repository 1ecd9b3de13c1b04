use thiserror::Error;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Failures reported by a [`GraphicsDevice`](super::GraphicsDevice).
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to create shader program: {0}")]
    ProgramCreation(String),

    #[error("invalid texture size {width}x{height}")]
    InvalidTextureSize { width: u32, height: u32 },

    #[error("texture data is {actual} bytes, expected {expected}")]
    TextureDataLength { expected: usize, actual: usize },

    #[error("vertex upload of {len} floats exceeds buffer capacity {capacity}")]
    BufferOverflow { len: usize, capacity: usize },

    #[error("unknown {0} handle")]
    UnknownHandle(&'static str),
}
