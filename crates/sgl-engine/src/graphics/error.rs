use std::path::PathBuf;

use thiserror::Error;

use crate::device::DeviceError;

/// Protocol and argument errors raised by the batches.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("begin called while the batch is already recording")]
    AlreadyRecording,

    #[error("batch is not recording; call begin first")]
    NotRecording,

    #[error("invalid draw mode {0}; expected 0 (points), 1 (lines) or 4 (filled)")]
    InvalidDrawMode(u32),

    #[error("{primitive} cannot be drawn in {mode} mode")]
    UnsupportedInMode {
        primitive: &'static str,
        mode: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to read texture file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image")]
    Decode(#[from] image::ImageError),

    #[error("invalid texture dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Device(#[from] DeviceError),
}

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font: {0}")]
    Parse(String),

    #[error("font has no printable glyphs")]
    EmptyAtlas,

    #[error("failed to create glyph atlas texture")]
    Texture(#[from] TextureError),
}
