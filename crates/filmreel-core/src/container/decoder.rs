use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::error::ContainerError;

use super::frame::{DecodedFrame, PlanarFrame};
use super::header::ContainerHeader;

/// Decodes planar frames from a container into interleaved RGB frames.
///
/// The header is read and validated on construction. Frames are then pulled
/// one at a time with [`ContainerDecoder::next_frame`]; the decoder never
/// seeks or revisits consumed bytes.
pub struct ContainerDecoder<R> {
    reader: R,
    header: ContainerHeader,
    frames_decoded: u64,
}

impl<R: Read> ContainerDecoder<R> {
    pub fn new(mut reader: R) -> Result<Self, ContainerError> {
        let header = ContainerHeader::read_from(&mut reader)?;
        header.validate()?;

        info!(
            frame_count = header.frame_count,
            decodable_frames = header.decodable_frames(),
            height = header.height,
            width = header.width,
            frame_bytes = header.frame_len(),
            "container decoder opened"
        );

        Ok(Self {
            reader,
            header,
            frames_decoded: 0,
        })
    }

    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// Decode the next frame, or `None` once `frame_count - 1` frames have
    /// been produced.
    pub fn next_frame(&mut self) -> Result<Option<DecodedFrame>, ContainerError> {
        if self.frames_decoded >= self.header.decodable_frames() {
            return Ok(None);
        }

        let frame_number = self.frames_decoded;
        let planar =
            PlanarFrame::read_from(&mut self.reader, self.header.plane_len(), frame_number)?;
        self.frames_decoded += 1;

        debug!(frame_number, "decoded frame");

        Ok(Some(DecodedFrame {
            channel_count: self.header.channel_count,
            height: self.header.height,
            width: self.header.width,
            pixel_data: planar.interleave(),
        }))
    }

    /// Decode every remaining frame. Fails as a whole on the first error.
    pub fn decode_all(mut self) -> Result<Vec<DecodedFrame>, ContainerError> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        info!(total_frames = frames.len(), "container decoded");
        Ok(frames)
    }
}

/// Decode a whole container from any byte source.
pub fn decode<R: Read>(reader: R) -> Result<Vec<DecodedFrame>, ContainerError> {
    ContainerDecoder::new(reader)?.decode_all()
}

/// Decode the container stored at `path`.
pub fn decode_file(path: &Path) -> Result<Vec<DecodedFrame>> {
    info!(?path, "reading container");

    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    decode(BufReader::new(file))
        .with_context(|| format!("failed to decode {}", path.display()))
}
