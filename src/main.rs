//! lif-meta - Extract ROI finder metadata from Leica LIF files.
//!
//! This binary parses its configuration, walks each file and prints the
//! extracted metadata.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lif_meta::{Config, ErrorKind, LifContainer, LifError, LifMetadata, OutputFormat};

/// Failure while inspecting a single file.
#[derive(Debug, Error)]
enum InspectError {
    /// The file could not be parsed
    #[error(transparent)]
    Lif(#[from] LifError),

    /// The extracted metadata could not be written as JSON
    #[error("Failed to serialize metadata: {0}")]
    Output(#[from] serde_json::Error),
}

impl InspectError {
    fn kind(&self) -> Option<ErrorKind> {
        match self {
            InspectError::Lif(err) => Some(err.kind()),
            InspectError::Output(_) => None,
        }
    }
}

fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(&config);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut failures = 0usize;
    for path in &config.files {
        if let Err(e) = inspect(path, &config) {
            error!(kind = ?e.kind(), "{}: {}", path.display(), e);
            failures += 1;
            if config.fail_fast {
                break;
            }
        }
    }

    if failures > 0 {
        info!("{} of {} file(s) failed", failures, config.files.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so stdout carries only the extracted metadata.
fn init_logging(config: &Config) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Walk one file and print its metadata.
fn inspect(path: &Path, config: &Config) -> Result<(), InspectError> {
    let container = LifContainer::open(path).map_err(LifError::from)?;

    if config.offset_only {
        match config.format {
            OutputFormat::Text => println!("{}\t{}", path.display(), container.data_offset),
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "File": path.display().to_string(),
                    "Offset": container.data_offset,
                });
                println!("{}", render_json(&json)?);
            }
        }
        return Ok(());
    }

    let metadata = LifMetadata::from_container(&container).map_err(LifError::from)?;
    match config.format {
        OutputFormat::Text => print_text(path, &container, &metadata),
        OutputFormat::Json => println!("{}", render_json(&metadata)?),
    }

    Ok(())
}

fn render_json<T: Serialize>(value: &T) -> Result<String, InspectError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn print_text(path: &Path, container: &LifContainer, metadata: &LifMetadata) {
    println!("{}", path.display());
    println!("  MicroscopeModel: {}", metadata.microscope_model);
    println!("  BitSize:         {}", metadata.bit_size);
    println!("  FlipX/FlipY:     {}/{}", metadata.flip_x, metadata.flip_y);
    println!("  SwapXY:          {}", metadata.swap_xy);
    println!("  XDim x YDim:     {} x {}", metadata.x_dim, metadata.y_dim);
    println!("  XRes x YRes:     {} x {}", metadata.x_res, metadata.y_res);
    println!("  PosX, PosY:      {}, {}", metadata.pos_x, metadata.pos_y);
    println!(
        "  Offset:          {} ({} header block(s))",
        metadata.offset,
        container.blocks.len()
    );
}
