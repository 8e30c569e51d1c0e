use super::{VolumeShape, VoxelSpacing};

/// Registry key of the Cirrus Macular Cube 200x200 protocol
pub const MACULAR_CUBE_200X200: &str = "macular_cube_200x200";

/// Expected geometry and calibration of one acquisition protocol
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTypeSpec {
    /// Registry key, e.g. "macular_cube_200x200"
    pub key: String,

    /// Token identifying the protocol in export filenames, e.g. "200x200"
    pub filename_token: String,

    /// Volume geometry (z, y, x)
    pub geometry: VolumeShape,

    /// Physical voxel spacing (z, y, x) in mm
    pub spacing: VoxelSpacing,
}

impl ScanTypeSpec {
    /// Creates a spec, deriving spacing from the scanned field of view in mm
    pub fn from_field_of_view(
        key: impl Into<String>,
        filename_token: impl Into<String>,
        geometry: VolumeShape,
        fov_mm: [f32; 3],
    ) -> Self {
        Self {
            key: key.into(),
            filename_token: filename_token.into(),
            geometry,
            spacing: VoxelSpacing::from_field_of_view(fov_mm, geometry),
        }
    }

    /// Macular Cube 200x200: 200 B-scans of 1024x200 over 6 x 2 x 6 mm
    pub fn macular_cube_200x200() -> Self {
        Self::from_field_of_view(
            MACULAR_CUBE_200X200,
            "200x200",
            VolumeShape::new(200, 1024, 200),
            [6.0, 2.0, 6.0],
        )
    }

    /// Checks whether a filename carries this protocol's token (case-insensitive)
    pub fn matches_filename(&self, filename: &str) -> bool {
        filename
            .to_lowercase()
            .contains(&self.filename_token.to_lowercase())
    }
}

/// Immutable table of known scan types
///
/// Built once at startup and passed explicitly to the resolver.
///
/// # Example
///
/// ```
/// use cirrusvol_core::{ScanTypeRegistry, VolumeShape};
///
/// let registry = ScanTypeRegistry::default();
/// let spec = registry.lookup("macular_cube_200x200").unwrap();
/// assert_eq!(spec.geometry, VolumeShape::new(200, 1024, 200));
///
/// let found = registry.identify("Macula_Cube_200X200_OD.img").unwrap();
/// assert_eq!(found.key, "macular_cube_200x200");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTypeRegistry {
    specs: Vec<ScanTypeSpec>,
}

impl Default for ScanTypeRegistry {
    fn default() -> Self {
        Self::empty().with_spec(ScanTypeSpec::macular_cube_200x200())
    }
}

impl ScanTypeRegistry {
    /// Creates a registry without any entries
    pub fn empty() -> Self {
        Self { specs: Vec::new() }
    }

    /// Builder: add a scan type, replacing any entry with the same key
    pub fn with_spec(mut self, spec: ScanTypeSpec) -> Self {
        self.specs.retain(|s| s.key != spec.key);
        self.specs.push(spec);
        self
    }

    pub fn lookup(&self, key: &str) -> Option<&ScanTypeSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// Finds the scan type whose filename token appears in `filename`
    pub fn identify(&self, filename: &str) -> Option<&ScanTypeSpec> {
        self.specs.iter().find(|s| s.matches_filename(filename))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
