use crate::error::Result;
use crate::types::VoxelSpacing;
use ndarray::Array3;
use std::path::{Path, PathBuf};

/// Result of asking a codec to write the medical-imaging container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecOutcome {
    /// Container written at this path
    Written(PathBuf),
    /// No codec available in this build; the reason is recorded per file
    CapabilityAbsent(String),
}

/// Encodes a volume plus spacing into a medical-imaging container
pub trait VolumeCodec {
    /// Short codec name for logs
    fn name(&self) -> &'static str;

    /// File name of the container inside the output directory
    fn file_name(&self) -> &'static str;

    /// Whether this codec can actually produce a container
    fn is_available(&self) -> bool {
        true
    }

    /// Writes `volume` (z, y, x) with `spacing` to `path`
    fn write(&self, path: &Path, volume: &Array3<u8>, spacing: VoxelSpacing)
        -> Result<CodecOutcome>;
}

/// Codec used when no medical-imaging library is compiled in
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCodec;

impl VolumeCodec for NullCodec {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn file_name(&self) -> &'static str {
        "vol.nii.gz"
    }

    fn write(
        &self,
        _path: &Path,
        _volume: &Array3<u8>,
        _spacing: VoxelSpacing,
    ) -> Result<CodecOutcome> {
        Ok(CodecOutcome::CapabilityAbsent(
            "capability absent: built without the 'nifti' feature".to_string(),
        ))
    }
}

/// Gzipped NIfTI-1 writer
///
/// NIfTI indexes voxels as (x, y, z), so the array axes and the spacing are
/// reversed on the way out.
#[cfg(feature = "nifti")]
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiCodec;

#[cfg(feature = "nifti")]
impl VolumeCodec for NiftiCodec {
    fn name(&self) -> &'static str {
        "nifti"
    }

    fn file_name(&self) -> &'static str {
        "vol.nii.gz"
    }

    fn write(
        &self,
        path: &Path,
        volume: &Array3<u8>,
        spacing: VoxelSpacing,
    ) -> Result<CodecOutcome> {
        use crate::error::CirrusError;
        use nifti::writer::WriterOptions;
        use nifti::NiftiHeader;

        let [x, y, z] = spacing.to_xyz();
        let header = NiftiHeader {
            pixdim: [1.0, x, y, z, 1.0, 1.0, 1.0, 1.0],
            // NIFTI_UNITS_MM
            xyzt_units: 2,
            ..NiftiHeader::default()
        };

        WriterOptions::new(path)
            .reference_header(&header)
            .write_nifti(&volume.view().reversed_axes())
            .map_err(|e| CirrusError::MaterializationFailed(format!("NIfTI write: {}", e)))?;

        Ok(CodecOutcome::Written(path.to_path_buf()))
    }
}

/// Best codec compiled into this build
pub fn default_codec() -> Box<dyn VolumeCodec> {
    #[cfg(feature = "nifti")]
    {
        Box::new(NiftiCodec)
    }
    #[cfg(not(feature = "nifti"))]
    {
        Box::new(NullCodec)
    }
}
