//! Volume materialization
//!
//! Reads a raw Cirrus dump, reshapes it into a `u8` volume and writes the
//! array artifacts (`vol.npy`, `spacing_zyx.npy`) plus, when a codec is
//! available, a medical-imaging container.

mod codec;
mod volume;

pub use codec::{default_codec, CodecOutcome, NullCodec, VolumeCodec};
#[cfg(feature = "nifti")]
pub use codec::NiftiCodec;
pub use volume::reshape_volume;

use crate::error::Result;
use crate::resolve::ResolvedGeometry;
use crate::types::{BScanOrientation, VoxelSpacing};
use log::debug;
use ndarray::{arr1, Array1, Array3};
use ndarray_npy::{read_npy, write_npy};
use std::fs;
use std::path::{Path, PathBuf};

/// Volume array artifact
pub const VOLUME_FILE: &str = "vol.npy";

/// Spacing array artifact
pub const SPACING_FILE: &str = "spacing_zyx.npy";

/// Paths written for one volume
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedVolume {
    pub volume_path: PathBuf,
    pub spacing_path: PathBuf,
    /// Medical container, if one was written
    pub medical_path: Option<PathBuf>,
    /// Why the medical container was not written
    pub medical_note: Option<String>,
}

/// Writes volume artifacts for resolved files
pub struct Materializer {
    codec: Box<dyn VolumeCodec>,
    orientation: BScanOrientation,
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new(default_codec(), BScanOrientation::default())
    }
}

impl Materializer {
    pub fn new(codec: Box<dyn VolumeCodec>, orientation: BScanOrientation) -> Self {
        Self { codec, orientation }
    }

    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    pub fn has_codec(&self) -> bool {
        self.codec.is_available()
    }

    /// Materializes `source` into `out_dir`
    ///
    /// Creates `out_dir` and its parents when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the source cannot be read
    /// - the byte count does not fit the geometry (`CorruptInput`)
    /// - an artifact cannot be written
    pub fn materialize(
        &self,
        source: &Path,
        out_dir: &Path,
        geometry: &ResolvedGeometry,
        write_medical_format: bool,
    ) -> Result<MaterializedVolume> {
        let bytes = fs::read(source)?;
        let volume = reshape_volume(bytes, geometry.shape, self.orientation)?;

        fs::create_dir_all(out_dir)?;

        let volume_path = out_dir.join(VOLUME_FILE);
        let spacing_path = out_dir.join(SPACING_FILE);
        write_npy(&volume_path, &volume)?;
        write_npy(&spacing_path, &arr1(&geometry.spacing.to_zyx()))?;
        debug!("Wrote {} and {}", volume_path.display(), spacing_path.display());

        let (medical_path, medical_note) = if write_medical_format {
            let path = out_dir.join(self.codec.file_name());
            match self.codec.write(&path, &volume, geometry.spacing)? {
                CodecOutcome::Written(path) => (Some(path), None),
                CodecOutcome::CapabilityAbsent(reason) => {
                    debug!("{}: {}", source.display(), reason);
                    (None, Some(reason))
                }
            }
        } else {
            (None, Some("not requested".to_string()))
        };

        Ok(MaterializedVolume {
            volume_path,
            spacing_path,
            medical_path,
            medical_note,
        })
    }
}

/// Reads the array artifacts of a converted output directory back
pub fn read_artifacts(out_dir: &Path) -> Result<(Array3<u8>, VoxelSpacing)> {
    let volume: Array3<u8> = read_npy(out_dir.join(VOLUME_FILE))?;
    let spacing: Array1<f32> = read_npy(out_dir.join(SPACING_FILE))?;
    let spacing = match spacing.as_slice() {
        Some(&[z, y, x]) => VoxelSpacing::new(z, y, x),
        _ => {
            return Err(crate::error::CirrusError::CorruptInput {
                expected: 3,
                actual: spacing.len(),
            })
        }
    };
    Ok((volume, spacing))
}
