//! Whole-container edits on the planar payload.
//!
//! Unlike the export decoder, editing treats the header's frame count
//! literally: a container declaring `n` frames must carry `n` frames.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::container::frame::PlanarFrame;
use crate::container::header::ContainerHeader;
use crate::error::ContainerError;

/// A container held fully in memory in its stored (planar) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanarContainer {
    pub header: ContainerHeader,
    pub frames: Vec<PlanarFrame>,
}

impl PlanarContainer {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, ContainerError> {
        let header = ContainerHeader::read_from(reader)?;
        header.validate()?;
        header.ensure_frame_area(header.frame_count)?;

        let plane_len = header.plane_len();
        let mut frames = Vec::new();
        for frame in 0..header.frame_count {
            frames.push(PlanarFrame::read_from(reader, plane_len, frame)?);
        }

        debug!(frame_count = frames.len(), "planar container loaded");
        Ok(Self { header, frames })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.header.write_to(writer)?;
        for frame in &self.frames {
            frame.write_to(writer)?;
        }
        Ok(())
    }

    fn check_channel(&self, channel: u8) -> Result<usize, ContainerError> {
        if channel >= self.header.channel_count {
            return Err(ContainerError::InvalidEdit(format!(
                "channel {channel} out of range for {} channels",
                self.header.channel_count
            )));
        }
        Ok(channel as usize)
    }
}

/// Target aspect ratio, written `WIDTH:HEIGHT` (e.g. `16:9`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn as_f32(self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl FromStr for AspectRatio {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ContainerError::InvalidEdit(format!(
                "invalid aspect ratio {s:?}, use WIDTH:HEIGHT (e.g. 16:9)"
            ))
        };
        let (w, h) = s.split_once(':').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// An edit applied to every frame of a container.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    /// Play the frames backwards.
    Reverse,
    /// Exchange two color planes (0 = red, 1 = green, 2 = blue).
    SwapChannel { first: u8, second: u8 },
    /// Limit a plane's values to `[min, max]`.
    ClipChannel { channel: u8, min: u8, max: u8 },
    /// Multiply a plane's values, saturating at 0 and 255.
    ScaleChannel { channel: u8, factor: f32 },
    /// Keep one frame in every `factor`.
    SpeedUp { factor: u32 },
    /// Center-crop every frame to an aspect ratio.
    CropAspect { ratio: AspectRatio },
}

impl EditOp {
    pub fn name(&self) -> &'static str {
        match self {
            EditOp::Reverse => "reverse",
            EditOp::SwapChannel { .. } => "swap_channel",
            EditOp::ClipChannel { .. } => "clip_channel",
            EditOp::ScaleChannel { .. } => "scale_channel",
            EditOp::SpeedUp { .. } => "speed_up",
            EditOp::CropAspect { .. } => "crop_aspect",
        }
    }

    pub fn apply(&self, container: &mut PlanarContainer) -> Result<(), ContainerError> {
        match *self {
            EditOp::Reverse => container.frames.reverse(),
            EditOp::SwapChannel { first, second } => {
                let a = container.check_channel(first)?;
                let b = container.check_channel(second)?;
                for frame in &mut container.frames {
                    frame.planes.swap(a, b);
                }
            }
            EditOp::ClipChannel { channel, min, max } => {
                let c = container.check_channel(channel)?;
                for frame in &mut container.frames {
                    for value in frame.planes[c].iter_mut() {
                        *value = clip(*value, min, max);
                    }
                }
            }
            EditOp::ScaleChannel { channel, factor } => {
                let c = container.check_channel(channel)?;
                for frame in &mut container.frames {
                    for value in frame.planes[c].iter_mut() {
                        *value = scale(*value, factor);
                    }
                }
            }
            EditOp::SpeedUp { factor } => speed_up(container, factor)?,
            EditOp::CropAspect { ratio } => crop_aspect(container, ratio)?,
        }
        Ok(())
    }
}

/// Values above `max` become `max`; otherwise values below `min` become `min`.
fn clip(value: u8, min: u8, max: u8) -> u8 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

fn scale(value: u8, factor: f32) -> u8 {
    let scaled = value as f32 * factor;
    if scaled > 255.0 {
        255
    } else if scaled < 0.0 || scaled.is_nan() {
        0
    } else {
        scaled as u8
    }
}

fn speed_up(container: &mut PlanarContainer, factor: u32) -> Result<(), ContainerError> {
    if factor <= 1 {
        return Err(ContainerError::InvalidEdit(format!(
            "speed factor must be greater than 1, got {factor}"
        )));
    }

    let step = factor as usize;
    let frames = std::mem::take(&mut container.frames);
    container.frames = frames.into_iter().step_by(step).collect();
    container.header.frame_count = container.frames.len() as u64;
    Ok(())
}

fn crop_aspect(container: &mut PlanarContainer, ratio: AspectRatio) -> Result<(), ContainerError> {
    let header = container.header;
    if header.width == 0 || header.height == 0 {
        return Err(ContainerError::InvalidEdit(
            "cannot crop a zero-sized frame".to_string(),
        ));
    }

    let target = ratio.as_f32();
    let source = header.width as f32 / header.height as f32;
    let (width, height) = if source > target {
        ((header.height as f32 * target) as u8, header.height)
    } else {
        (header.width, (header.width as f32 / target) as u8)
    };

    let top = header.height.saturating_sub(height) as usize / 2;
    let left = header.width.saturating_sub(width) as usize / 2;
    let (src_w, dst_w, dst_h) = (header.width as usize, width as usize, height as usize);

    debug!(
        %ratio,
        from_width = header.width,
        from_height = header.height,
        width,
        height,
        top,
        left,
        "cropping frames"
    );

    for frame in &mut container.frames {
        for plane in frame.planes.iter_mut() {
            let mut cropped = Vec::with_capacity(dst_w * dst_h);
            for row in top..top + dst_h {
                let start = row * src_w + left;
                cropped.extend_from_slice(&plane[start..start + dst_w]);
            }
            *plane = cropped;
        }
    }

    container.header.width = width;
    container.header.height = height;
    Ok(())
}

/// Apply `op` to the container at `input` and write the result to `output`.
pub fn run_edit(input: &Path, output: &Path, op: &EditOp) -> Result<ContainerHeader> {
    if !input.exists() {
        bail!("input container does not exist: {}", input.display());
    }

    let started = Instant::now();
    info!(?input, ?output, op = op.name(), "edit starting");

    let mut container = {
        let file =
            File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
        PlanarContainer::read_from(&mut BufReader::new(file))
            .with_context(|| format!("failed to read {}", input.display()))?
    };

    op.apply(&mut container)
        .with_context(|| format!("{} failed", op.name()))?;

    let file =
        File::create(output).with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    container
        .write_to(&mut writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        op = op.name(),
        frame_count = container.header.frame_count,
        height = container.header.height,
        width = container.header.width,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "edit complete"
    );

    Ok(container.header)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// 2x2 container whose frame `i` has every red byte `i`, green `10 + i`,
    /// blue `20 + i`.
    fn sample(frame_count: u8) -> PlanarContainer {
        let frames = (0..frame_count)
            .map(|i| PlanarFrame {
                planes: [vec![i; 4], vec![10 + i; 4], vec![20 + i; 4]],
            })
            .collect();
        PlanarContainer {
            header: ContainerHeader::rgb(frame_count as u64, 2, 2),
            frames,
        }
    }

    fn reds(container: &PlanarContainer) -> Vec<u8> {
        container.frames.iter().map(|f| f.planes[0][0]).collect()
    }

    #[test]
    fn read_uses_declared_frame_count() {
        let container = sample(3);
        let mut bytes = Vec::new();
        container.write_to(&mut bytes).unwrap();

        let parsed = PlanarContainer::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(parsed, container);

        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            PlanarContainer::read_from(&mut Cursor::new(&bytes)),
            Err(ContainerError::TruncatedFrameData { frame: 2, .. })
        ));
    }

    #[test]
    fn read_rejects_zero_area_frames() {
        let bytes = ContainerHeader::rgb(u64::MAX, 2, 0).to_bytes();
        assert!(matches!(
            PlanarContainer::read_from(&mut Cursor::new(&bytes[..])),
            Err(ContainerError::EmptyFrameGeometry { .. })
        ));
    }

    #[test]
    fn reverse_flips_frame_order() {
        let mut container = sample(4);
        EditOp::Reverse.apply(&mut container).unwrap();
        assert_eq!(reds(&container), vec![3, 2, 1, 0]);
        assert_eq!(container.header.frame_count, 4);
    }

    #[test]
    fn swap_channel_exchanges_planes() {
        let mut container = sample(2);
        EditOp::SwapChannel { first: 0, second: 2 }
            .apply(&mut container)
            .unwrap();
        assert_eq!(container.frames[1].planes[0], vec![21; 4]);
        assert_eq!(container.frames[1].planes[1], vec![11; 4]);
        assert_eq!(container.frames[1].planes[2], vec![1; 4]);
    }

    #[test]
    fn swap_channel_rejects_out_of_range() {
        let mut container = sample(1);
        let err = EditOp::SwapChannel { first: 0, second: 3 }
            .apply(&mut container)
            .unwrap_err();
        assert!(matches!(err, ContainerError::InvalidEdit(_)));
    }

    #[test]
    fn clip_channel_limits_one_plane() {
        let mut container = sample(1);
        container.frames[0].planes[1] = vec![0, 50, 100, 255];
        EditOp::ClipChannel { channel: 1, min: 40, max: 200 }
            .apply(&mut container)
            .unwrap();
        assert_eq!(container.frames[0].planes[1], vec![40, 50, 100, 200]);
        assert_eq!(container.frames[0].planes[0], vec![0; 4]);
    }

    #[test]
    fn clip_prefers_max_when_bounds_cross() {
        assert_eq!(clip(150, 200, 100), 100);
        assert_eq!(clip(50, 200, 100), 200);
    }

    #[test]
    fn scale_channel_saturates() {
        let mut container = sample(1);
        container.frames[0].planes[2] = vec![0, 10, 100, 200];
        EditOp::ScaleChannel { channel: 2, factor: 1.5 }
            .apply(&mut container)
            .unwrap();
        assert_eq!(container.frames[0].planes[2], vec![0, 15, 150, 255]);
    }

    #[test]
    fn scale_truncates_and_clamps_negative() {
        assert_eq!(scale(3, 0.5), 1);
        assert_eq!(scale(100, -2.0), 0);
    }

    #[test]
    fn speed_up_keeps_every_nth_frame() {
        let mut container = sample(5);
        EditOp::SpeedUp { factor: 2 }.apply(&mut container).unwrap();
        assert_eq!(reds(&container), vec![0, 2, 4]);
        assert_eq!(container.header.frame_count, 3);
    }

    #[test]
    fn speed_up_requires_factor_above_one() {
        let mut container = sample(2);
        assert!(EditOp::SpeedUp { factor: 1 }.apply(&mut container).is_err());
        assert_eq!(container.frames.len(), 2);
    }

    #[test]
    fn crop_to_wider_target_trims_rows() {
        // 4 rows x 4 cols, pixel value = row * 4 + col.
        let plane: Vec<u8> = (0..16).collect();
        let mut container = PlanarContainer {
            header: ContainerHeader::rgb(1, 4, 4),
            frames: vec![PlanarFrame {
                planes: [plane.clone(), plane.clone(), plane],
            }],
        };
        let ratio: AspectRatio = "2:1".parse().unwrap();
        EditOp::CropAspect { ratio }.apply(&mut container).unwrap();

        assert_eq!((container.header.width, container.header.height), (4, 2));
        assert_eq!(container.frames[0].planes[0], vec![4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn crop_to_narrower_target_trims_columns() {
        let plane: Vec<u8> = (0..16).collect();
        let mut container = PlanarContainer {
            header: ContainerHeader::rgb(1, 4, 4),
            frames: vec![PlanarFrame {
                planes: [plane.clone(), plane.clone(), plane],
            }],
        };
        let ratio: AspectRatio = "1:2".parse().unwrap();
        EditOp::CropAspect { ratio }.apply(&mut container).unwrap();

        assert_eq!((container.header.width, container.header.height), (2, 4));
        assert_eq!(container.frames[0].planes[2], vec![1, 2, 5, 6, 9, 10, 13, 14]);
    }

    #[test]
    fn aspect_ratio_parsing() {
        assert_eq!(
            "16:9".parse::<AspectRatio>().unwrap(),
            AspectRatio { width: 16, height: 9 }
        );
        assert!("16x9".parse::<AspectRatio>().is_err());
        assert!("0:9".parse::<AspectRatio>().is_err());
        assert!("a:b".parse::<AspectRatio>().is_err());
        assert_eq!(AspectRatio { width: 4, height: 3 }.to_string(), "4:3");
    }
}
