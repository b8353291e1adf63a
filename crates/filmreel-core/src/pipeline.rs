use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::container::decoder::decode_file;
use crate::export::{export_frames, ExportConfig};

/// Decode the container at `input` and write its frames as JPEGs.
///
/// Decoding completes before anything is written, so a malformed container
/// leaves the output directory untouched. Returns the written paths.
pub fn run_export(input: &Path, config: &ExportConfig) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        bail!("input container does not exist: {}", input.display());
    }

    info!(
        ?input,
        output_dir = ?config.output_dir,
        jpeg_quality = config.jpeg_quality,
        "export starting"
    );

    let frames = decode_file(input).context("failed to decode container")?;
    if frames.is_empty() {
        warn!(?input, "container holds no decodable frames");
    }

    let written = export_frames(&frames, config).context("failed to export frames")?;
    info!(frame_count = written.len(), "export complete");

    Ok(written)
}
