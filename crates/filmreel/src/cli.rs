use std::path::PathBuf;

use clap::{Parser, Subcommand};

use filmreel_core::edit::AspectRatio;

#[derive(Parser)]
#[command(name = "filmreel", about = "Planar RGB video container tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode a container and save each frame as a numbered JPEG.
    Export {
        /// Path to the input container.
        #[arg(short, long, default_value = "rose_s.bin")]
        input: PathBuf,

        /// Directory to write frame_NNNN.jpg files into.
        #[arg(short, long, default_value = "output_frames")]
        output: PathBuf,

        /// JPEG quality (1-100).
        #[arg(short, long, default_value_t = 75, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,
    },

    /// Check whether two files are byte-for-byte identical.
    Compare {
        left: PathBuf,
        right: PathBuf,
    },

    /// Print the header of a container.
    Info {
        #[arg(short, long, default_value = "rose_s.bin")]
        input: PathBuf,
    },

    /// Apply an edit to a container and write the result to a new container.
    Edit {
        /// Path to the input container.
        #[arg(short, long)]
        input: PathBuf,

        /// Path to write the edited container.
        #[arg(short, long)]
        output: PathBuf,

        #[command(subcommand)]
        op: EditCommand,
    },
}

#[derive(Subcommand)]
pub enum EditCommand {
    /// Reverse frame order.
    Reverse,

    /// Swap two channels (0 = red, 1 = green, 2 = blue).
    SwapChannel { first: u8, second: u8 },

    /// Clamp a channel's values to [min, max].
    ClipChannel { channel: u8, min: u8, max: u8 },

    /// Multiply a channel's values by a factor.
    ScaleChannel {
        channel: u8,
        #[arg(allow_negative_numbers = true)]
        factor: f32,
    },

    /// Keep one frame in every N.
    SpeedUp { factor: u32 },

    /// Center-crop frames to an aspect ratio such as 16:9.
    CropAspect { ratio: AspectRatio },
}
