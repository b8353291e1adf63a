use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, info};

use crate::container::frame::DecodedFrame;

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Where and how decoded frames are written.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory receiving `frame_NNNN.jpg` files. Created if missing.
    pub output_dir: PathBuf,
    /// JPEG quality, 1 (smallest) to 100 (best).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output_frames"),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Path of the image for the frame at `index`.
pub fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:04}.jpg"))
}

/// Write every frame as a numbered JPEG, in sequence order.
///
/// Existing files with the same names are overwritten. Returns the written
/// paths in frame order.
pub fn export_frames(frames: &[DecodedFrame], config: &ExportConfig) -> Result<Vec<PathBuf>> {
    if !(1..=100).contains(&config.jpeg_quality) {
        bail!("jpeg_quality must be within 1..=100, got {}", config.jpeg_quality);
    }

    let dir = &config.output_dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    info!(?dir, frame_count = frames.len(), "output directory ready");

    let mut written = Vec::with_capacity(frames.len());
    for (index, frame) in frames.iter().enumerate() {
        let path = frame_path(dir, index);
        write_jpeg(frame, &path, config.jpeg_quality)
            .with_context(|| format!("failed to save frame {index}"))?;
        info!(index, ?path, "saved frame");
        written.push(path);
    }

    Ok(written)
}

fn write_jpeg(frame: &DecodedFrame, path: &Path, quality: u8) -> Result<()> {
    let image = frame.to_rgb_image()?;

    // A frame the encoder rejects must not leave a file behind.
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality)
        .encode_image(&image)
        .with_context(|| format!("failed to encode {}", path.display()))?;
    std::fs::write(path, &encoded)
        .with_context(|| format!("failed to write {}", path.display()))?;

    debug!(
        ?path,
        width = frame.width,
        height = frame.height,
        bytes = encoded.len(),
        "jpeg written"
    );
    Ok(())
}
