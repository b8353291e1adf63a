use std::fmt;
use std::io::{Read, Write};

use image::RgbImage;
use tracing::error;

use crate::error::ContainerError;

use super::header::RGB_CHANNELS;
use super::read_full;

/// Color plane, in the order planes are stored inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Red,
    Green,
    Blue,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::Red, Plane::Green, Plane::Blue];

    pub fn index(self) -> usize {
        match self {
            Plane::Red => 0,
            Plane::Green => 1,
            Plane::Blue => 2,
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::Red => write!(f, "red"),
            Plane::Green => write!(f, "green"),
            Plane::Blue => write!(f, "blue"),
        }
    }
}

/// One frame as stored in the container: R, G and B planes of equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanarFrame {
    pub planes: [Vec<u8>; 3],
}

impl PlanarFrame {
    /// Read the three planes of frame `frame` in R, G, B order.
    /// Any short plane is fatal.
    pub fn read_from<R: Read>(
        reader: &mut R,
        plane_len: usize,
        frame: u64,
    ) -> Result<Self, ContainerError> {
        let mut planes: [Vec<u8>; 3] = Default::default();
        for plane in Plane::ALL {
            let buf = &mut planes[plane.index()];
            buf.resize(plane_len, 0);
            let read = read_full(reader, buf)?;
            if read < plane_len {
                error!(
                    frame,
                    %plane,
                    read_bytes = read,
                    expected_bytes = plane_len,
                    "container ended mid-plane"
                );
                return Err(ContainerError::TruncatedFrameData {
                    frame,
                    plane,
                    read,
                    expected: plane_len,
                });
            }
        }
        Ok(Self { planes })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for plane in &self.planes {
            writer.write_all(plane)?;
        }
        Ok(())
    }

    pub fn plane(&self, plane: Plane) -> &[u8] {
        &self.planes[plane.index()]
    }

    /// Reorder the planes into pixel-major R,G,B,R,G,B,... bytes.
    pub fn interleave(&self) -> Vec<u8> {
        let [red, green, blue] = &self.planes;
        let mut out = vec![0u8; red.len() * 3];
        for (i, pixel) in out.chunks_exact_mut(3).enumerate() {
            pixel[0] = red[i];
            pixel[1] = green[i];
            pixel[2] = blue[i];
        }
        out
    }
}

/// A frame converted to interleaved RGB, ready for an image encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub channel_count: u8,
    pub height: u8,
    pub width: u8,
    /// `height * width * channel_count` bytes, pixel-major.
    pub pixel_data: Vec<u8>,
}

impl DecodedFrame {
    /// Build an RGB raster of the declared geometry from the pixel data.
    pub fn to_rgb_image(&self) -> Result<RgbImage, ContainerError> {
        if self.channel_count != RGB_CHANNELS {
            return Err(ContainerError::UnsupportedChannelLayout {
                channels: self.channel_count,
            });
        }

        let expected = self.height as usize * self.width as usize * RGB_CHANNELS as usize;
        if self.pixel_data.len() != expected {
            return Err(ContainerError::PixelDataLength {
                width: self.width,
                height: self.height,
                expected,
                actual: self.pixel_data.len(),
            });
        }

        RgbImage::from_raw(
            self.width as u32,
            self.height as u32,
            self.pixel_data.clone(),
        )
        .ok_or(ContainerError::PixelDataLength {
            width: self.width,
            height: self.height,
            expected,
            actual: self.pixel_data.len(),
        })
    }
}
