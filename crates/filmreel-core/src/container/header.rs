use std::io::{Read, Write};

use tracing::{debug, error};

use crate::error::ContainerError;

use super::read_full;

/// Size of the packed header on disk: u64 frame count + three u8 fields.
pub const HEADER_LEN: usize = 11;

/// The only channel layout the container carries (planar R, G, B).
pub const RGB_CHANNELS: u8 = 3;

/// Fixed-layout container header.
///
/// | offset | size | field |
/// |--------|------|-------|
/// | 0      | 8    | `frame_count` (little-endian) |
/// | 8      | 1    | `channel_count` |
/// | 9      | 1    | `height` |
/// | 10     | 1    | `width` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Declared frame count. The decoder treats the last one as a sentinel.
    pub frame_count: u64,
    pub channel_count: u8,
    pub height: u8,
    pub width: u8,
}

impl ContainerHeader {
    /// Header for an RGB container of the given geometry.
    pub fn rgb(frame_count: u64, height: u8, width: u8) -> Self {
        Self {
            frame_count,
            channel_count: RGB_CHANNELS,
            height,
            width,
        }
    }

    pub fn from_bytes(bytes: &[u8; HEADER_LEN]) -> Self {
        let mut count = [0u8; 8];
        count.copy_from_slice(&bytes[0..8]);
        Self {
            frame_count: u64::from_le_bytes(count),
            channel_count: bytes[8],
            height: bytes[9],
            width: bytes[10],
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..8].copy_from_slice(&self.frame_count.to_le_bytes());
        bytes[8] = self.channel_count;
        bytes[9] = self.height;
        bytes[10] = self.width;
        bytes
    }

    /// Read the packed header without validating the channel layout.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, ContainerError> {
        let mut bytes = [0u8; HEADER_LEN];
        let read = read_full(reader, &mut bytes)?;
        if read < HEADER_LEN {
            error!(read, expected = HEADER_LEN, "container header truncated");
            return Err(ContainerError::TruncatedHeader {
                read,
                expected: HEADER_LEN,
            });
        }

        let header = Self::from_bytes(&bytes);
        debug!(
            frame_count = header.frame_count,
            channels = header.channel_count,
            height = header.height,
            width = header.width,
            "read container header"
        );
        Ok(header)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    /// Reject any layout other than 3-channel planar RGB, and zero-area
    /// frames when the decoder would have to produce any.
    pub fn validate(&self) -> Result<(), ContainerError> {
        if self.channel_count != RGB_CHANNELS {
            error!(channels = self.channel_count, "unsupported channel layout");
            return Err(ContainerError::UnsupportedChannelLayout {
                channels: self.channel_count,
            });
        }
        self.ensure_frame_area(self.decodable_frames())
    }

    /// Fail if `frames` frames are expected but each one holds no bytes.
    /// Zero-area frames consume no input, so the frame loop would be bounded
    /// only by the declared count.
    pub fn ensure_frame_area(&self, frames: u64) -> Result<(), ContainerError> {
        if frames > 0 && self.frame_len() == 0 {
            error!(
                frames,
                height = self.height,
                width = self.width,
                "zero-area frame geometry"
            );
            return Err(ContainerError::EmptyFrameGeometry {
                frames,
                height: self.height,
                width: self.width,
            });
        }
        Ok(())
    }

    /// Bytes in one color plane.
    pub fn plane_len(&self) -> usize {
        self.height as usize * self.width as usize
    }

    /// Bytes in one frame, all planes included.
    pub fn frame_len(&self) -> usize {
        self.plane_len() * self.channel_count as usize
    }

    /// Number of frames the decoder will yield: the declared count minus the
    /// trailing sentinel.
    pub fn decodable_frames(&self) -> u64 {
        self.frame_count.saturating_sub(1)
    }
}
