//! Configuration for the `lif-meta` command.
//!
//! Options come from command-line arguments via clap, with environment
//! variable fallbacks using the `LIF_` prefix:
//!
//! - `LIF_FORMAT` - Output format, `text` or `json` (default: text)
//! - `LIF_OFFSET_ONLY` - Print only the data offset (default: false)
//! - `LIF_FAIL_FAST` - Stop at the first file that fails (default: false)

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Output format for extracted metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `Key: value` line per field
    #[default]
    Text,
    /// Pretty-printed JSON object per file
    Json,
}

/// lif-meta - Extract ROI finder metadata from Leica LIF files.
///
/// Reads the XML description embedded in each file, locates the start of
/// the raw image data and prints the orientation, geometry and stage
/// position needed to locate regions of interest.
#[derive(Parser, Debug, Clone)]
#[command(name = "lif-meta")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// LIF files to inspect.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "LIF_FORMAT")]
    pub format: OutputFormat,

    /// Print only the byte offset of the raw image data.
    ///
    /// Skips XML metadata extraction entirely.
    #[arg(long, default_value_t = false, env = "LIF_OFFSET_ONLY")]
    pub offset_only: bool,

    /// Stop at the first file that fails instead of continuing.
    #[arg(long, default_value_t = false, env = "LIF_FAIL_FAST")]
    pub fail_fast: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.files.is_empty() {
            return Err("At least one LIF file is required".to_string());
        }

        let missing: Vec<String> = self
            .files
            .iter()
            .filter(|path| !path.is_file())
            .map(|path| path.display().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(format!("File(s) not found: {}", missing.join(", ")));
        }

        Ok(())
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "lif_meta=debug"
        } else {
            "lif_meta=info"
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
