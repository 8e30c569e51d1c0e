//! Conversion orchestration
//!
//! Walks the input tree and drives every candidate file through
//! classification, geometry resolution, the completion check and
//! materialization. Per-file problems become [`ConversionRecord`]s; only an
//! invalid configuration stops a run from starting.

mod discover;
mod record;
mod summary;

pub use discover::discover_files;
pub use record::{ConversionRecord, VolumeMetadata, ERROR_FILE, METADATA_FILE};
pub use summary::RunSummary;

use crate::classification::{MirroredPath, PathClassifier};
use crate::error::{CirrusError, Result};
use crate::materialize::{default_codec, Materializer, SPACING_FILE, VOLUME_FILE};
use crate::resolve::{ResolvedGeometry, ShapeResolver};
use crate::storage::{FsStorage, Storage};
use crate::types::{ConversionStatus, ExtractConfig, ScanTypeRegistry};
use globset::GlobMatcher;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A file that passed classification, resolution and the collision check
struct Admitted {
    record: ConversionRecord,
    mirrored: MirroredPath,
    geometry: ResolvedGeometry,
    out_dir: PathBuf,
    byte_len: u64,
}

/// Runs extraction over an input tree
///
/// # Example
///
/// ```no_run
/// use cirrusvol_core::{Converter, ExtractConfig};
///
/// let config = ExtractConfig::new("/data/images", "/data/volumes").with_site("003");
/// let summary = Converter::new(config).unwrap().run();
/// println!("converted {} volumes", summary.converted);
/// ```
pub struct Converter<S: Storage = FsStorage> {
    config: ExtractConfig,
    registry: ScanTypeRegistry,
    classifier: PathClassifier,
    matcher: GlobMatcher,
    materializer: Materializer,
    storage: S,
}

impl Converter<FsStorage> {
    /// Creates a converter with the built-in scan types, the best available
    /// codec and filesystem storage
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationInvalid` if the configuration cannot be used
    pub fn new(config: ExtractConfig) -> Result<Self> {
        let materializer = Materializer::new(default_codec(), config.orientation);
        Self::with_parts(config, ScanTypeRegistry::default(), materializer, FsStorage)
    }
}

impl<S: Storage> Converter<S> {
    /// Creates a converter from explicit collaborators
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationInvalid` if the configuration cannot be used
    pub fn with_parts(
        mut config: ExtractConfig,
        registry: ScanTypeRegistry,
        materializer: Materializer,
        storage: S,
    ) -> Result<Self> {
        config.validate()?;
        config.input_root = config.input_root.canonicalize().map_err(|e| {
            CirrusError::ConfigurationInvalid(format!(
                "cannot resolve input root {}: {}",
                config.input_root.display(),
                e
            ))
        })?;

        Ok(Self {
            classifier: PathClassifier::from_config(&config)?,
            matcher: config.filename_matcher()?,
            config,
            registry,
            materializer,
            storage,
        })
    }

    /// Processes every candidate file and returns the run summary
    pub fn run(&self) -> RunSummary {
        let mut summary = RunSummary::new(self.config.dry_run);

        if self.config.write_medical_format
            && !self.config.dry_run
            && !self.materializer.has_codec()
        {
            warn!(
                "No medical-imaging codec available ({}); only .npy artifacts will be written",
                self.materializer.codec_name()
            );
        }

        let files = discover_files(&self.config.input_root, &self.matcher);
        info!(
            "Found {} files matching '{}' under {}",
            files.len(),
            self.config.pattern,
            self.config.input_root.display()
        );

        let mut claimed = HashMap::new();
        let mut admitted_count = 0;
        let total = files.len();
        for (i, path) in files.iter().enumerate() {
            let record = match self.admit(path, &mut claimed) {
                Ok(admitted) => {
                    if let Some(max) = self.config.max_files {
                        if admitted_count >= max {
                            info!("Hit file limit {}, stopping early", max);
                            summary.hit_limit = true;
                            break;
                        }
                    }
                    admitted_count += 1;
                    self.complete(admitted)
                }
                Err(record) => record,
            };
            log_record(i + 1, total, &record);
            summary.push(record);
        }

        info!(
            "Done: converted={} skipped={} rejected={} failed={} planned={} total={}",
            summary.converted,
            summary.skipped,
            summary.rejected,
            summary.failed,
            summary.planned,
            summary.total()
        );
        summary
    }

    /// Drives one file through the pipeline
    ///
    /// `claimed` maps output directories already used in this run to their
    /// source file.
    pub fn process_file(
        &self,
        path: &Path,
        claimed: &mut HashMap<PathBuf, PathBuf>,
    ) -> ConversionRecord {
        match self.admit(path, claimed) {
            Ok(admitted) => self.complete(admitted),
            Err(record) => record,
        }
    }

    /// Classifies, resolves and claims an output directory for `path`
    ///
    /// Returns the final record for files that stop here.
    fn admit(
        &self,
        path: &Path,
        claimed: &mut HashMap<PathBuf, PathBuf>,
    ) -> std::result::Result<Admitted, ConversionRecord> {
        let record = ConversionRecord::new(path.to_path_buf(), ConversionStatus::Rejected);

        let mirrored = match self.classifier.classify(path) {
            Ok(mirrored) => mirrored,
            Err(rejection) => {
                return Err(record.with_reason(CirrusError::from(rejection).to_string()))
            }
        };
        let record = record.with_relative_path(mirrored.to_string());

        let byte_len = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                return Err(record.finish(
                    ConversionStatus::Failed,
                    Some(format!("cannot stat source: {}", e)),
                ))
            }
        };

        let scan_type = self
            .registry
            .identify(mirrored.filename())
            .map(|spec| spec.key.as_str());
        let geometry = match ShapeResolver::new(&self.registry).resolve(
            byte_len,
            scan_type,
            self.config.forced_shape,
        ) {
            Ok(geometry) => geometry,
            Err(e) => return Err(record.with_reason(e.to_string())),
        };

        let out_dir = mirrored.output_dir(&self.config.output_root);
        let record = record
            .with_output_dir(out_dir.clone())
            .with_geometry(geometry.clone());

        if let Some(first) = claimed.get(&out_dir) {
            return Err(record.with_reason(format!(
                "output collision: {} already claimed by {}",
                out_dir.display(),
                first.display()
            )));
        }
        claimed.insert(out_dir.clone(), path.to_path_buf());

        Ok(Admitted {
            record,
            mirrored,
            geometry,
            out_dir,
            byte_len,
        })
    }

    /// Plans, skips or materializes an admitted file
    fn complete(&self, admitted: Admitted) -> ConversionRecord {
        let Admitted {
            record,
            mirrored,
            geometry,
            out_dir,
            byte_len,
        } = admitted;

        if self.config.dry_run {
            return record.finish(
                ConversionStatus::Planned,
                Some(format!("would convert to {}", out_dir.display())),
            );
        }

        if !self.config.overwrite && self.is_complete(&out_dir) {
            return record.finish(
                ConversionStatus::Skipped,
                Some("already converted".to_string()),
            );
        }

        match self.convert(&record.input_path, &out_dir, &mirrored, &geometry, byte_len) {
            Ok(metadata) => {
                let mut record = record.finish(ConversionStatus::Converted, None);
                record.wrote_medical_format = metadata.wrote_medical_format;
                record
            }
            Err(e) => {
                self.write_error_note(&out_dir, &e);
                record.finish(ConversionStatus::Failed, Some(e.to_string()))
            }
        }
    }

    /// Whether `out_dir` holds a finished conversion from an earlier run
    ///
    /// Requires both arrays and a `meta.json` that parses with status
    /// `converted`.
    pub fn is_complete(&self, out_dir: &Path) -> bool {
        let meta_path = out_dir.join(METADATA_FILE);
        let present = [meta_path.clone(), out_dir.join(VOLUME_FILE), out_dir.join(SPACING_FILE)]
            .iter()
            .all(|p| self.storage.exists(p));
        if !present {
            return false;
        }

        match self
            .storage
            .read(&meta_path)
            .map_err(CirrusError::from)
            .and_then(|bytes| VolumeMetadata::from_json(&bytes).map_err(CirrusError::from))
        {
            Ok(metadata) => metadata.is_complete(),
            Err(e) => {
                debug!("Treating {} as incomplete: {}", out_dir.display(), e);
                false
            }
        }
    }

    fn convert(
        &self,
        source: &Path,
        out_dir: &Path,
        mirrored: &MirroredPath,
        geometry: &ResolvedGeometry,
        byte_len: u64,
    ) -> Result<VolumeMetadata> {
        // meta.json must not outlive a partial overwrite
        let meta_path = out_dir.join(METADATA_FILE);
        self.storage.remove_file(&meta_path)?;

        let written = self.materializer.materialize(
            source,
            out_dir,
            geometry,
            self.config.write_medical_format,
        )?;

        let metadata = VolumeMetadata {
            input_path: source.to_path_buf(),
            output_dir: out_dir.to_path_buf(),
            relative_path: mirrored.to_string(),
            scan_type: geometry.scan_type.clone(),
            shape: geometry.shape,
            spacing_zyx: geometry.spacing,
            file_size_bytes: byte_len,
            wrote_medical_format: written.medical_path.is_some(),
            medical_format_note: written.medical_note,
            status: ConversionStatus::Converted,
        };
        self.storage
            .write(&meta_path, metadata.to_json()?.as_bytes())?;
        self.storage.remove_file(&out_dir.join(ERROR_FILE))?;

        Ok(metadata)
    }

    /// Leaves `error.txt` next to the partial outputs; failures here are only logged
    fn write_error_note(&self, out_dir: &Path, err: &CirrusError) {
        let result = self
            .storage
            .create_dir_all(out_dir)
            .and_then(|_| {
                self.storage
                    .write(&out_dir.join(ERROR_FILE), format!("{}\n", err).as_bytes())
            });
        if let Err(e) = result {
            warn!("Could not write error note in {}: {}", out_dir.display(), e);
        }
    }
}

fn log_record(index: usize, total: usize, record: &ConversionRecord) {
    let reason = record.reason.as_deref().unwrap_or_default();
    let path = record.input_path.display();
    match record.status {
        ConversionStatus::Converted => info!("[{}/{}] converted: {}", index, total, path),
        ConversionStatus::Skipped => info!("[{}/{}] skipped: {} ({})", index, total, path, reason),
        ConversionStatus::Planned => info!("[{}/{}] planned: {} ({})", index, total, path, reason),
        ConversionStatus::Failed => error!("[{}/{}] failed: {} :: {}", index, total, path, reason),
        // classification rejection
        ConversionStatus::Rejected if record.relative_path.is_none() => {
            debug!("[{}/{}] rejected: {} ({})", index, total, path, reason)
        }
        ConversionStatus::Rejected => {
            warn!("[{}/{}] rejected: {} ({})", index, total, path, reason)
        }
    }
}
