mod cli;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use filmreel_core::compare::compare_files;
use filmreel_core::edit::{run_edit, EditOp};
use filmreel_core::export::ExportConfig;
use filmreel_core::pipeline::run_export;
use filmreel_core::ContainerHeader;

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Export {
            input,
            output,
            quality,
        } => {
            let config = ExportConfig {
                output_dir: output,
                jpeg_quality: quality,
            };

            let written = run_export(&input, &config).context("export failed")?;
            if written.is_empty() {
                warn!(?input, "no frames exported");
            }

            info!(
                frame_count = written.len(),
                output_dir = ?config.output_dir,
                "done"
            );
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Compare { left, right } => {
            if compare_files(&left, &right) {
                println!("The files are identical.");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("The files are not identical.");
                Ok(ExitCode::FAILURE)
            }
        }
        cli::Command::Info { input } => {
            let header = read_header(&input)?;
            println!("Number of frames: {}", header.frame_count);
            println!("Channels: {}", header.channel_count);
            println!("Height: {}", header.height);
            println!("Width: {}", header.width);
            if let Err(e) = header.validate() {
                warn!(?input, error = %e, "container cannot be decoded");
            }
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Edit { input, output, op } => {
            let op = edit_op(op);
            let header = run_edit(&input, &output, &op).context("edit failed")?;
            info!(
                op = op.name(),
                ?output,
                frame_count = header.frame_count,
                height = header.height,
                width = header.width,
                "done"
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn edit_op(command: cli::EditCommand) -> EditOp {
    match command {
        cli::EditCommand::Reverse => EditOp::Reverse,
        cli::EditCommand::SwapChannel { first, second } => EditOp::SwapChannel { first, second },
        cli::EditCommand::ClipChannel { channel, min, max } => {
            EditOp::ClipChannel { channel, min, max }
        }
        cli::EditCommand::ScaleChannel { channel, factor } => {
            EditOp::ScaleChannel { channel, factor }
        }
        cli::EditCommand::SpeedUp { factor } => EditOp::SpeedUp { factor },
        cli::EditCommand::CropAspect { ratio } => EditOp::CropAspect { ratio },
    }
}

fn read_header(path: &Path) -> Result<ContainerHeader> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    ContainerHeader::read_from(&mut BufReader::new(file))
        .with_context(|| format!("failed to read header of {}", path.display()))
}
