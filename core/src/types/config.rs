use super::{BScanOrientation, VolumeShape};
use crate::error::{CirrusError, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};

/// Default visit folder
pub const DEFAULT_VERSION: &str = "V3";

/// Default filename glob
pub const DEFAULT_PATTERN: &str = "*.img";

/// Default filename token required for a file to be considered
pub const DEFAULT_SCAN_TOKEN: &str = "200x200";

/// Configuration for one extraction run
///
/// # Example
///
/// ```
/// use cirrusvol_core::{ExtractConfig, VolumeShape};
///
/// let config = ExtractConfig::new("/data/images", "/data/volumes")
///     .with_site("003")
///     .with_forced_shape(VolumeShape::new(100, 1024, 100))
///     .overwrite(true);
///
/// assert_eq!(config.version, "V3");
/// assert_eq!(config.pattern, "*.img");
/// assert!(config.overwrite);
/// assert!(!config.dry_run);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractConfig {
    /// Root searched recursively for candidate files
    pub input_root: PathBuf,

    /// Root under which the mirrored tree is written
    pub output_root: PathBuf,

    /// Only accept files below this site directory (first segment after `images`)
    pub site: Option<String>,

    /// Visit folder that must be directly followed by `sdoct_cirrus`
    pub version: String,

    /// Filename glob, matched case-insensitively
    pub pattern: String,

    /// Substring the filename must contain (case-insensitive); None disables the check
    pub scan_token: Option<String>,

    /// Report what would happen without writing anything
    pub dry_run: bool,

    /// Geometry override, still validated against the file size
    pub forced_shape: Option<VolumeShape>,

    /// Reprocess files that already have complete outputs
    pub overwrite: bool,

    /// Attempt the medical-imaging container in addition to the arrays
    pub write_medical_format: bool,

    /// Stop after this many accepted files
    pub max_files: Option<usize>,

    /// B-scan orientation applied during reshaping
    pub orientation: BScanOrientation,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::new(),
            output_root: PathBuf::new(),
            site: None,
            version: DEFAULT_VERSION.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            scan_token: Some(DEFAULT_SCAN_TOKEN.to_string()),
            dry_run: false,
            forced_shape: None,
            overwrite: false,
            write_medical_format: true,
            max_files: None,
            orientation: BScanOrientation::default(),
        }
    }
}

impl ExtractConfig {
    /// Creates a config with default settings for the given roots
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    /// Builder: restrict to one site
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Builder: set visit folder name
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Builder: set filename glob
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Builder: set or clear the required filename token
    pub fn with_scan_token(mut self, token: Option<String>) -> Self {
        self.scan_token = token;
        self
    }

    /// Builder: force a geometry
    pub fn with_forced_shape(mut self, shape: VolumeShape) -> Self {
        self.forced_shape = Some(shape);
        self
    }

    /// Builder: cap the number of accepted files
    pub fn with_max_files(mut self, max: usize) -> Self {
        self.max_files = Some(max);
        self
    }

    /// Builder: set B-scan orientation
    pub fn with_orientation(mut self, orientation: BScanOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Builder: dry run
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Builder: overwrite completed outputs
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Builder: write the medical-imaging container when available
    pub fn write_medical_format(mut self, write: bool) -> Self {
        self.write_medical_format = write;
        self
    }

    /// Compiles the filename glob (case-insensitive)
    pub fn filename_matcher(&self) -> Result<GlobMatcher> {
        let glob = GlobBuilder::new(&self.pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()?;
        Ok(glob.compile_matcher())
    }

    /// Checks that a run can start with this configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationInvalid` if:
    /// - the input root is missing, not a directory or unreadable
    /// - the output root is empty, is an existing file, or lies inside the input root
    /// - the version folder name is empty
    /// - the glob pattern does not compile
    /// - the forced shape has a zero axis
    pub fn validate(&self) -> Result<()> {
        if !self.input_root.is_dir() {
            return Err(invalid(format!(
                "input root {} is not a directory",
                self.input_root.display()
            )));
        }
        std::fs::read_dir(&self.input_root).map_err(|e| {
            invalid(format!(
                "input root {} is not readable: {}",
                self.input_root.display(),
                e
            ))
        })?;

        if self.output_root.as_os_str().is_empty() {
            return Err(invalid("output root is empty".to_string()));
        }
        if self.output_root.exists() && !self.output_root.is_dir() {
            return Err(invalid(format!(
                "output root {} exists and is not a directory",
                self.output_root.display()
            )));
        }
        if is_nested(&self.output_root, &self.input_root) {
            return Err(invalid(format!(
                "output root {} lies inside input root {}",
                self.output_root.display(),
                self.input_root.display()
            )));
        }

        if self.version.trim().is_empty() {
            return Err(invalid("version folder name is empty".to_string()));
        }

        if let Some(shape) = self.forced_shape {
            if !shape.is_positive() {
                return Err(invalid(format!(
                    "forced shape {} must be strictly positive",
                    shape
                )));
            }
        }

        self.filename_matcher()?;
        Ok(())
    }
}

fn invalid(msg: String) -> CirrusError {
    CirrusError::ConfigurationInvalid(msg)
}

/// Whether `inner` is `outer` or lies below it, comparing canonical paths where possible
fn is_nested(inner: &Path, outer: &Path) -> bool {
    let outer = resolve_path(outer);
    let inner = resolve_path(inner);
    inner.starts_with(&outer)
}

/// Canonical form of `path`; a missing path resolves through its nearest existing ancestor
fn resolve_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ExtractConfig::default();
        assert_eq!(config.version, "V3");
        assert_eq!(config.pattern, "*.img");
        assert_eq!(config.scan_token.as_deref(), Some("200x200"));
        assert!(config.site.is_none());
        assert!(config.forced_shape.is_none());
        assert!(!config.dry_run);
        assert!(!config.overwrite);
        assert!(config.write_medical_format);
        assert!(config.max_files.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = ExtractConfig::new("in", "out")
            .with_version("V1")
            .with_pattern("*200x200*.img")
            .with_scan_token(None)
            .with_max_files(5)
            .with_orientation(BScanOrientation::Raw)
            .write_medical_format(false)
            .dry_run(true);

        assert_eq!(config.input_root, PathBuf::from("in"));
        assert_eq!(config.version, "V1");
        assert!(config.scan_token.is_none());
        assert_eq!(config.max_files, Some(5));
        assert_eq!(config.orientation, BScanOrientation::Raw);
        assert!(!config.write_medical_format);
        assert!(config.dry_run);
    }

    #[test]
    fn test_filename_matcher_case_insensitive() {
        let matcher = ExtractConfig::default().filename_matcher().unwrap();
        assert!(matcher.is_match("scan_200x200.img"));
        assert!(matcher.is_match("SCAN_200X200.IMG"));
        assert!(!matcher.is_match("scan_200x200.bin"));
    }

    #[test]
    fn test_validate_ok() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let config = ExtractConfig::new(input.path(), output.path().join("volumes"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_input_root() {
        let output = TempDir::new().unwrap();
        let config = ExtractConfig::new("/definitely/not/here", output.path());
        assert!(config.validate().unwrap_err().is_fatal());
    }

    #[test]
    fn test_validate_output_is_file() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let file = output.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        let config = ExtractConfig::new(input.path(), file);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_output_inside_input() {
        let input = TempDir::new().unwrap();
        let config = ExtractConfig::new(input.path(), input.path().join("out"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_relative_missing_output_inside_input() {
        let config = ExtractConfig::new(".", "cirrusvol-not-created/out");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("lies inside input root"));
    }

    #[test]
    fn test_nesting_resolves_relative_paths() {
        let cwd = std::env::current_dir().unwrap();
        assert!(is_nested(Path::new("cirrusvol-not-created"), &cwd));
        assert!(is_nested(Path::new("."), Path::new(".")));

        let other = TempDir::new().unwrap();
        assert!(!is_nested(&other.path().join("missing"), Path::new(".")));
    }

    #[test]
    fn test_validate_bad_pattern_and_shape() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let config = ExtractConfig::new(input.path(), output.path()).with_pattern("[*.img");
        assert!(config.validate().unwrap_err().is_fatal());

        let config = ExtractConfig::new(input.path(), output.path())
            .with_forced_shape(VolumeShape::new(0, 1024, 200));
        assert!(config.validate().unwrap_err().is_fatal());

        let config = ExtractConfig::new(input.path(), output.path()).with_version(" ");
        assert!(config.validate().is_err());
    }
}
