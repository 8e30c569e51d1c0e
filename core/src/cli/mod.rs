pub mod report;

use crate::error::Result;
use crate::types::{
    BScanOrientation, ExtractConfig, VolumeShape, DEFAULT_PATTERN, DEFAULT_SCAN_TOKEN,
    DEFAULT_VERSION,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for cirrusvol
///
/// `--version` selects the visit folder, so clap's automatic version flag
/// is not enabled.
#[derive(Parser, Debug)]
#[command(name = "cirrusvol")]
#[command(about = "Convert Zeiss Cirrus Macular Cube .img exports into volume arrays")]
pub struct Cli {
    /// Root of the exported image tree
    #[arg(long, alias = "input", value_name = "DIR")]
    pub base: PathBuf,

    /// Root of the mirrored output tree
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Site directory to process ("all" for every site)
    #[arg(long, default_value = "all")]
    pub site: String,

    /// Visit folder directly above sdoct_cirrus
    #[arg(long = "version", default_value = DEFAULT_VERSION)]
    pub visit_version: String,

    /// Filename glob (case-insensitive)
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Filename token identifying the scan protocol ("any" disables the check)
    #[arg(long, default_value = DEFAULT_SCAN_TOKEN)]
    pub scan_token: String,

    /// Stop after this many accepted files (0 for no limit)
    #[arg(long, default_value_t = 0)]
    pub max: usize,

    /// Report planned conversions without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Override the volume shape as depth,height,width
    #[arg(long, value_name = "D,H,W")]
    pub force_shape: Option<String>,

    /// Reprocess files that already have complete outputs
    #[arg(long)]
    pub overwrite: bool,

    /// Skip the medical-imaging container
    #[arg(long)]
    pub no_medical: bool,

    /// Keep B-scans in file order instead of flipping them
    #[arg(long)]
    pub raw_orientation: bool,

    /// Summary output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

impl Cli {
    /// Builds the run configuration from the parsed flags
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationInvalid` if `--force-shape` does not parse
    pub fn to_config(&self) -> Result<ExtractConfig> {
        let mut config = ExtractConfig::new(&self.base, &self.out)
            .with_version(self.visit_version.clone())
            .with_pattern(self.pattern.clone())
            .dry_run(self.dry_run)
            .overwrite(self.overwrite)
            .write_medical_format(!self.no_medical);

        if !self.site.eq_ignore_ascii_case("all") {
            config = config.with_site(self.site.clone());
        }

        let token = self.scan_token.trim();
        config = if token.is_empty() || token.eq_ignore_ascii_case("any") {
            config.with_scan_token(None)
        } else {
            config.with_scan_token(Some(token.to_string()))
        };

        if self.max > 0 {
            config = config.with_max_files(self.max);
        }

        if let Some(shape) = &self.force_shape {
            config = config.with_forced_shape(VolumeShape::parse(shape)?);
        }

        if self.raw_orientation {
            config = config.with_orientation(BScanOrientation::Raw);
        }

        Ok(config)
    }
}
