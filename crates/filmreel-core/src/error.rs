use thiserror::Error;

use crate::container::frame::Plane;

/// Errors raised while reading, rewriting or rasterizing a planar container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("unsupported channel layout: expected 3 planar channels, found {channels}")]
    UnsupportedChannelLayout { channels: u8 },

    #[error("container header truncated: read {read} of {expected} bytes")]
    TruncatedHeader { read: usize, expected: usize },

    #[error("frame {frame} truncated in {plane} plane: read {read} of {expected} bytes")]
    TruncatedFrameData {
        frame: u64,
        plane: Plane,
        read: usize,
        expected: usize,
    },

    #[error("{frames} frames declared with zero-area geometry {width}x{height}")]
    EmptyFrameGeometry { frames: u64, height: u8, width: u8 },

    #[error("pixel data holds {actual} bytes, expected {expected} for {width}x{height} RGB")]
    PixelDataLength {
        width: u8,
        height: u8,
        expected: usize,
        actual: usize,
    },

    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
