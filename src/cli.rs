//! CLI argument parsing and validation.

use clap::Parser;
use image::Rgba;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ReprojectError, Result};
use crate::logger::VerbosityLevel;
use crate::projection::{ProjectionConfig, ProjectionKind};
use crate::reproject::{ReprojectOptions, ROUND_TRIP_TOLERANCE};

/// Command line arguments for reproject-png.
#[derive(Parser, Debug)]
#[command(name = "reproject-png")]
#[command(version, about = "Reproject a Web Mercator PNG into another map projection", long_about = None)]
pub struct Args {
    /// Path to the source image (Web Mercator, full 360° of longitude).
    pub input: PathBuf,

    /// Target projection.
    #[arg(short, long, value_enum)]
    pub projection: ProjectionKind,

    /// Output directory.
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Output PNG filename without extension (default: "<input>-<projection>").
    #[arg(long)]
    pub output_name: Option<String>,

    /// Longitude in degrees by which to re-center the source, in [-180, 180].
    #[arg(long, allow_hyphen_values = true)]
    pub lon_offset: Option<f64>,

    /// Background color RGBA hex for unmapped pixels (e.g., "00000000").
    #[arg(long, default_value = "00000000")]
    pub background: String,

    /// Round-trip tolerance in pixels for the seam check.
    #[arg(long, default_value_t = ROUND_TRIP_TOLERANCE)]
    pub tolerance: f64,

    /// Minimum interval between progress updates, in milliseconds.
    #[arg(long, default_value = "1000")]
    pub yield_interval_ms: u64,

    /// Verbose output with timestamps.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print the written file path.
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,
}

/// Fully validated configuration object.
#[derive(Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Output filename without extension.
    pub output_name: String,
    pub projection: ProjectionKind,
    /// Longitude offset in degrees (table value unless overridden).
    pub lon_offset: f64,
    pub options: ReprojectOptions,
    pub verbosity: VerbosityLevel,
    pub no_color: bool,
}

impl Config {
    /// The target projection with this run's longitude offset applied.
    pub fn projection_config(&self) -> ProjectionConfig {
        self.projection.config().with_lon_offset(self.lon_offset)
    }

    /// Path of the PNG to write.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.png", self.output_name))
    }
}

impl Args {
    /// Validates arguments and converts them to a structured `Config`.
    pub fn validate(self) -> Result<Config> {
        let lon_offset = self
            .lon_offset
            .unwrap_or_else(|| self.projection.lon_offset());
        if !(-180.0..=180.0).contains(&lon_offset) {
            return Err(ReprojectError::InvalidOffset(lon_offset));
        }

        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ReprojectError::InvalidTolerance(self.tolerance));
        }

        let background = parse_rgba(&self.background)?;

        let output_name = self.output_name.clone().unwrap_or_else(|| {
            let stem = self
                .input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            format!("{}-{}", stem, self.projection)
        });

        let verbosity = if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        };

        Ok(Config {
            input: self.input,
            output_dir: self.output_dir,
            output_name,
            projection: self.projection,
            lon_offset,
            options: ReprojectOptions {
                round_trip_tolerance: self.tolerance,
                yield_interval: Duration::from_millis(self.yield_interval_ms),
                background: Rgba(background),
            },
            verbosity,
            no_color: self.no_color,
        })
    }
}

fn parse_rgba(s: &str) -> Result<[u8; 4]> {
    let bytes = hex::decode(s).map_err(|_| ReprojectError::InvalidColor(s.to_string()))?;
    if bytes.len() != 4 {
        return Err(ReprojectError::InvalidColor(format!(
            "RGBA color must be 8 hex digits, got {}",
            s.len()
        )));
    }
    Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
}
