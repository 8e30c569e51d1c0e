pub mod classification;
pub mod cli;
pub mod error;
pub mod materialize;
pub mod pipeline;
pub mod resolve;
pub mod storage;
pub mod types;

pub use cli::report::TextReport;
pub use error::{CirrusError, Result};
pub use materialize::Materializer;
pub use pipeline::{ConversionRecord, Converter, RunSummary, VolumeMetadata};
pub use resolve::{ResolvedGeometry, ShapeResolver};
pub use types::*;

/// Runs a conversion over `config` with the default registry, codec and storage
///
/// # Errors
///
/// Returns `ConfigurationInvalid` if the run cannot start; per-file
/// problems are reported in the summary instead.
pub fn extract_volumes(config: ExtractConfig) -> Result<RunSummary> {
    Ok(Converter::new(config)?.run())
}
