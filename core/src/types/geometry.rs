use crate::error::{CirrusError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Volume geometry in voxels, axis order (z, y, x)
///
/// For OCT cubes `depth` is the number of B-scans, `height` the A-scan
/// length and `width` the number of A-scans per B-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 3]", into = "[usize; 3]")]
pub struct VolumeShape {
    pub depth: usize,
    pub height: usize,
    pub width: usize,
}

impl VolumeShape {
    /// Creates a new VolumeShape
    pub const fn new(depth: usize, height: usize, width: usize) -> Self {
        Self {
            depth,
            height,
            width,
        }
    }

    /// Number of voxels, or None if the product overflows
    pub fn voxel_count(&self) -> Option<u64> {
        (self.depth as u64)
            .checked_mul(self.height as u64)?
            .checked_mul(self.width as u64)
    }

    /// Checks that every axis is strictly positive
    pub fn is_positive(&self) -> bool {
        self.depth > 0 && self.height > 0 && self.width > 0
    }

    pub fn as_tuple(&self) -> (usize, usize, usize) {
        (self.depth, self.height, self.width)
    }

    /// Parses a forced shape given as `d,h,w`
    ///
    /// Whitespace around the numbers is tolerated. Zero, negative or
    /// non-numeric values are malformed input.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationInvalid` if the string is not three strictly
    /// positive integers.
    ///
    /// # Example
    ///
    /// ```
    /// use cirrusvol_core::VolumeShape;
    ///
    /// let shape = VolumeShape::parse("200, 1024, 200").unwrap();
    /// assert_eq!(shape, VolumeShape::new(200, 1024, 200));
    /// assert!(VolumeShape::parse("0,1024,200").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"^\s*(-?\d+)\s*,\s*(-?\d+)\s*,\s*(-?\d+)\s*$")
                .expect("Failed to compile regex")
        });

        let caps = re.captures(s).ok_or_else(|| {
            CirrusError::ConfigurationInvalid(format!(
                "forced shape '{}' is not of the form d,h,w",
                s
            ))
        })?;

        let mut dims = [0usize; 3];
        for (i, dim) in dims.iter_mut().enumerate() {
            let raw = &caps[i + 1];
            let value: i64 = raw.parse().map_err(|e| {
                CirrusError::ConfigurationInvalid(format!(
                    "forced shape value '{}' is not an integer: {}",
                    raw, e
                ))
            })?;
            if value <= 0 {
                return Err(CirrusError::ConfigurationInvalid(format!(
                    "forced shape values must be positive, got {}",
                    value
                )));
            }
            *dim = usize::try_from(value).map_err(|_| {
                CirrusError::ConfigurationInvalid(format!("forced shape value {} too large", value))
            })?;
        }

        Ok(Self::from(dims))
    }
}

impl From<[usize; 3]> for VolumeShape {
    fn from(d: [usize; 3]) -> Self {
        Self::new(d[0], d[1], d[2])
    }
}

impl From<VolumeShape> for [usize; 3] {
    fn from(s: VolumeShape) -> Self {
        [s.depth, s.height, s.width]
    }
}

impl fmt::Display for VolumeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.depth, self.height, self.width)
    }
}

/// Physical voxel spacing in millimeters, axis order (z, y, x)
///
/// All zeros means no calibrated spacing is available.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct VoxelSpacing {
    pub z: f32,
    pub y: f32,
    pub x: f32,
}

impl VoxelSpacing {
    /// Creates a new VoxelSpacing
    pub const fn new(z: f32, y: f32, x: f32) -> Self {
        Self { z, y, x }
    }

    /// Spacing marker for volumes without calibration
    pub const fn unknown() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Derives spacing from the scanned field of view (mm) and the geometry
    pub fn from_field_of_view(fov_mm: [f32; 3], shape: VolumeShape) -> Self {
        Self::new(
            fov_mm[0] / shape.depth as f32,
            fov_mm[1] / shape.height as f32,
            fov_mm[2] / shape.width as f32,
        )
    }

    /// Checks whether this spacing carries real calibration
    pub fn is_calibrated(&self) -> bool {
        self.z > 0.0 && self.y > 0.0 && self.x > 0.0
    }

    pub fn to_zyx(&self) -> [f32; 3] {
        [self.z, self.y, self.x]
    }

    /// Spacing in (x, y, z) order, as image containers expect it
    pub fn to_xyz(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for VoxelSpacing {
    fn from(s: [f32; 3]) -> Self {
        Self::new(s[0], s[1], s[2])
    }
}

impl From<VoxelSpacing> for [f32; 3] {
    fn from(s: VoxelSpacing) -> Self {
        s.to_zyx()
    }
}

impl fmt::Display for VoxelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} x {} mm", self.z, self.y, self.x)
    }
}
