use crate::resolve::ResolvedGeometry;
use crate::types::{ConversionStatus, VolumeShape, VoxelSpacing};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata document name inside each output directory
pub const METADATA_FILE: &str = "meta.json";

/// Error note written when materialization fails
pub const ERROR_FILE: &str = "error.txt";

/// Outcome of one candidate file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRecord {
    /// Source file as discovered
    pub input_path: PathBuf,

    /// Mirrored path below the `images` anchor, once classified
    pub relative_path: Option<String>,

    /// Output directory, once geometry is resolved
    pub output_dir: Option<PathBuf>,

    /// Resolved geometry and spacing
    pub geometry: Option<ResolvedGeometry>,

    /// Whether the medical-imaging container was written
    pub wrote_medical_format: bool,

    pub status: ConversionStatus,

    /// Human-readable reason for any status other than `converted`
    pub reason: Option<String>,
}

impl ConversionRecord {
    /// Creates a record in the given status
    pub fn new(input_path: PathBuf, status: ConversionStatus) -> Self {
        Self {
            input_path,
            relative_path: None,
            output_dir: None,
            geometry: None,
            wrote_medical_format: false,
            status,
            reason: None,
        }
    }

    /// Builder: attach a reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Builder: attach the mirrored relative path
    pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
        self.relative_path = Some(relative_path.into());
        self
    }

    /// Builder: attach the output directory
    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = Some(output_dir);
        self
    }

    /// Builder: attach the resolved geometry
    pub fn with_geometry(mut self, geometry: ResolvedGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Moves the record to another status with a reason
    pub fn finish(mut self, status: ConversionStatus, reason: Option<String>) -> Self {
        self.status = status;
        self.reason = reason;
        self
    }
}

/// Contents of `meta.json`, written last for each converted file
///
/// Its presence (with status `converted`) marks the directory as complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetadata {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub relative_path: String,
    pub scan_type: Option<String>,
    pub shape: VolumeShape,
    pub spacing_zyx: VoxelSpacing,
    pub file_size_bytes: u64,
    pub wrote_medical_format: bool,
    pub medical_format_note: Option<String>,
    pub status: ConversionStatus,
}

impl VolumeMetadata {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Whether this document describes a finished conversion
    pub fn is_complete(&self) -> bool {
        self.status == ConversionStatus::Converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> VolumeMetadata {
        VolumeMetadata {
            input_path: PathBuf::from("/data/images/003/P1/V3/sdoct_cirrus/E1/scan_200x200.img"),
            output_dir: PathBuf::from("/out/003/P1/V3/sdoct_cirrus/E1/scan_200x200.img"),
            relative_path: "003/P1/V3/sdoct_cirrus/E1/scan_200x200.img".to_string(),
            scan_type: Some("macular_cube_200x200".to_string()),
            shape: VolumeShape::new(200, 1024, 200),
            spacing_zyx: VoxelSpacing::new(0.03, 0.001953125, 0.03),
            file_size_bytes: 40_960_000,
            wrote_medical_format: false,
            medical_format_note: Some("capability absent".to_string()),
            status: ConversionStatus::Converted,
        }
    }

    #[test]
    fn test_metadata_document_fields() {
        let json = metadata().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["shape"], serde_json::json!([200, 1024, 200]));
        assert_eq!(value["spacing_zyx"].as_array().unwrap().len(), 3);
        assert_eq!(value["wrote_medical_format"], false);
        assert_eq!(value["status"], "converted");
        assert!(value["input_path"].as_str().unwrap().ends_with("scan_200x200.img"));
        assert!(value["output_dir"].is_string());
    }

    #[test]
    fn test_metadata_reads_back() {
        let json = metadata().to_json().unwrap();
        let parsed = VolumeMetadata::from_json(json.as_bytes()).unwrap();
        assert_eq!(parsed, metadata());
        assert!(parsed.is_complete());
    }

    #[test]
    fn test_truncated_metadata_is_rejected() {
        let json = metadata().to_json().unwrap();
        assert!(VolumeMetadata::from_json(&json.as_bytes()[..json.len() / 2]).is_err());
    }

    #[test]
    fn test_record_builders() {
        let record = ConversionRecord::new(PathBuf::from("a.img"), ConversionStatus::Rejected)
            .with_reason("nope");
        assert_eq!(record.reason.as_deref(), Some("nope"));
        assert!(record.geometry.is_none());

        let record = record.finish(ConversionStatus::Converted, None);
        assert_eq!(record.status, ConversionStatus::Converted);
        assert!(record.reason.is_none());
    }
}
