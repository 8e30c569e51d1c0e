use super::sanitize_filename;
use crate::error::Result;
use crate::types::ExtractConfig;
use globset::GlobMatcher;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Anchor directory the mirrored tree is rooted at
pub const IMAGES_ANCHOR: &str = "images";

/// Device folder that must follow the visit folder
pub const CIRRUS_SEGMENT: &str = "sdoct_cirrus";

/// Reason a file was not accepted as an input volume
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No `<version>/sdoct_cirrus` directory pair in the path
    #[error("path has no '{version}/sdoct_cirrus' directory pair")]
    NotUnderVersion { version: String },

    /// Filename does not match the configured glob
    #[error("filename '{filename}' does not match filename pattern '{pattern}'")]
    PatternMismatch { filename: String, pattern: String },

    /// Filename lacks the scan-type token
    #[error("filename '{filename}' does not match filename pattern: missing '{token}'")]
    MissingScanToken { filename: String, token: String },

    /// No `images` directory to mirror from
    #[error("path has no 'images' anchor directory")]
    MissingImagesAnchor,

    /// File belongs to a different site than requested
    #[error("site '{found}' excluded, only '{site}' requested")]
    SiteExcluded { site: String, found: String },

    /// Path has no usable filename
    #[error("path has no filename")]
    NoFilename,
}

/// Path of an accepted file relative to the `images` anchor
///
/// Holds every segment after `images`, filename included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirroredPath {
    segments: Vec<String>,
}

impl MirroredPath {
    /// Creates a mirrored path; the last segment is the filename
    ///
    /// Returns None when `segments` is empty.
    pub fn new(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn filename(&self) -> &str {
        // Never empty, see `new`
        &self.segments[self.segments.len() - 1]
    }

    /// Directory segments between the anchor and the file
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// First segment below the anchor, i.e. the site id for Cirrus exports
    pub fn site(&self) -> Option<&str> {
        self.parent_segments().first().map(String::as_str)
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.segments.iter().collect()
    }

    /// Output directory for this file under `output_root`
    ///
    /// Parent segments are mirrored verbatim; the leaf directory is the
    /// sanitized filename.
    ///
    /// # Example
    ///
    /// ```
    /// use cirrusvol_core::classification::MirroredPath;
    /// use std::path::Path;
    ///
    /// let rel = MirroredPath::new(
    ///     ["003", "0015", "V3", "sdoct_cirrus", "x", "DATAFILES", "E799", "example.img"]
    ///         .iter()
    ///         .map(|s| s.to_string())
    ///         .collect(),
    /// )
    /// .unwrap();
    /// assert_eq!(
    ///     rel.output_dir(Path::new("/out")),
    ///     Path::new("/out/003/0015/V3/sdoct_cirrus/x/DATAFILES/E799/example.img")
    /// );
    /// ```
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        let mut dir = output_root.to_path_buf();
        dir.extend(self.parent_segments());
        dir.push(sanitize_filename(self.filename()));
        dir
    }
}

impl fmt::Display for MirroredPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Decides which files are Cirrus volume exports
///
/// All rules must hold, checked in this order:
/// 1. a directory equal to the visit folder is directly followed by `sdoct_cirrus`
/// 2. the filename matches the glob (case-insensitive)
/// 3. the filename contains the scan token (case-insensitive)
/// 4. an `images` directory exists; everything after it is mirrored
/// 5. if a site is configured, the first mirrored directory equals it
#[derive(Debug, Clone)]
pub struct PathClassifier {
    version: String,
    pattern: String,
    matcher: GlobMatcher,
    scan_token: Option<String>,
    site: Option<String>,
}

impl PathClassifier {
    /// Builds a classifier from the run configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationInvalid` if the glob pattern does not compile
    pub fn from_config(config: &ExtractConfig) -> Result<Self> {
        Ok(Self {
            version: config.version.clone(),
            pattern: config.pattern.clone(),
            matcher: config.filename_matcher()?,
            scan_token: config.scan_token.clone(),
            site: config.site.clone(),
        })
    }

    /// Classifies one path
    ///
    /// # Example
    ///
    /// ```
    /// use cirrusvol_core::classification::{PathClassifier, Rejection};
    /// use cirrusvol_core::ExtractConfig;
    /// use std::path::Path;
    ///
    /// let classifier = PathClassifier::from_config(&ExtractConfig::default()).unwrap();
    ///
    /// let ok = classifier
    ///     .classify(Path::new("/d/images/001/P1/V3/sdoct_cirrus/DATAFILES/E1/cube_200x200.img"))
    ///     .unwrap();
    /// assert_eq!(ok.to_string(), "001/P1/V3/sdoct_cirrus/DATAFILES/E1/cube_200x200.img");
    ///
    /// let err = classifier
    ///     .classify(Path::new("/d/images/001/P1/V1/sdoct_cirrus/cube_200x200.img"))
    ///     .unwrap_err();
    /// assert!(matches!(err, Rejection::NotUnderVersion { .. }));
    /// ```
    pub fn classify(&self, path: &Path) -> std::result::Result<MirroredPath, Rejection> {
        let segments = path_segments(path);
        let (filename, dirs) = match segments.split_last() {
            Some((f, d)) if !f.is_empty() => (f, d),
            _ => return Err(Rejection::NoFilename),
        };

        if !has_version_pair(dirs, &self.version) {
            return Err(Rejection::NotUnderVersion {
                version: self.version.clone(),
            });
        }

        if !self.matcher.is_match(filename) {
            return Err(Rejection::PatternMismatch {
                filename: filename.clone(),
                pattern: self.pattern.clone(),
            });
        }

        if let Some(token) = &self.scan_token {
            if !filename.to_lowercase().contains(&token.to_lowercase()) {
                return Err(Rejection::MissingScanToken {
                    filename: filename.clone(),
                    token: token.clone(),
                });
            }
        }

        let anchor = dirs
            .iter()
            .position(|s| s == IMAGES_ANCHOR)
            .ok_or(Rejection::MissingImagesAnchor)?;
        let mirrored = MirroredPath::new(segments[anchor + 1..].to_vec())
            .ok_or(Rejection::MissingImagesAnchor)?;

        if let Some(site) = &self.site {
            let found = mirrored.site().unwrap_or_default();
            if found != site.as_str() {
                return Err(Rejection::SiteExcluded {
                    site: site.clone(),
                    found: found.to_string(),
                });
            }
        }

        Ok(mirrored)
    }
}

/// Normal path components as strings, separator independent
fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn has_version_pair(dirs: &[String], version: &str) -> bool {
    dirs.windows(2)
        .any(|w| w[0] == version && w[1] == CIRRUS_SEGMENT)
}
