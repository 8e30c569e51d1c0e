//! Shape resolution
//!
//! Turns a file's byte length into a volume geometry. Cirrus `.img` exports
//! are headerless `u8` dumps, so the only accepted geometry is one whose
//! voxel count equals the byte length exactly.

use crate::error::{CirrusError, Result};
use crate::types::{ScanTypeRegistry, VolumeShape, VoxelSpacing};
use serde::Serialize;

/// Geometry and spacing assigned to a candidate file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedGeometry {
    pub shape: VolumeShape,
    pub spacing: VoxelSpacing,
    /// Registry key of the matching scan type, if any
    pub scan_type: Option<String>,
    /// Whether the shape came from a user override
    pub forced: bool,
}

/// Resolves geometry from the scan-type registry or a forced override
#[derive(Debug, Clone)]
pub struct ShapeResolver<'a> {
    registry: &'a ScanTypeRegistry,
}

impl<'a> ShapeResolver<'a> {
    pub fn new(registry: &'a ScanTypeRegistry) -> Self {
        Self { registry }
    }

    /// Resolves the geometry of a file
    ///
    /// A forced shape always wins over inference, but must still account
    /// for every byte. Spacing comes from the registry when `scan_type_key`
    /// is known, otherwise it is all zeros.
    ///
    /// # Errors
    ///
    /// Returns `GeometryRejected` if:
    /// - the forced shape has a zero axis
    /// - no forced shape is given and the scan type is unknown
    /// - the expected byte count differs from `byte_len`
    ///
    /// # Example
    ///
    /// ```
    /// use cirrusvol_core::resolve::ShapeResolver;
    /// use cirrusvol_core::{ScanTypeRegistry, VolumeShape};
    ///
    /// let registry = ScanTypeRegistry::default();
    /// let resolver = ShapeResolver::new(&registry);
    ///
    /// let geometry = resolver
    ///     .resolve(40_960_000, Some("macular_cube_200x200"), None)
    ///     .unwrap();
    /// assert_eq!(geometry.shape, VolumeShape::new(200, 1024, 200));
    ///
    /// assert!(resolver
    ///     .resolve(40_960_001, Some("macular_cube_200x200"), None)
    ///     .is_err());
    /// ```
    pub fn resolve(
        &self,
        byte_len: u64,
        scan_type_key: Option<&str>,
        forced_shape: Option<VolumeShape>,
    ) -> Result<ResolvedGeometry> {
        let spec = scan_type_key.and_then(|key| self.registry.lookup(key));

        if let Some(shape) = forced_shape {
            if !shape.is_positive() {
                return Err(CirrusError::GeometryRejected(format!(
                    "forced shape {} is malformed: every axis must be positive",
                    shape
                )));
            }
            check_size(shape, byte_len, "forced shape")?;
            return Ok(ResolvedGeometry {
                shape,
                spacing: spec.map(|s| s.spacing).unwrap_or_else(VoxelSpacing::unknown),
                scan_type: spec.map(|s| s.key.clone()),
                forced: true,
            });
        }

        let spec = spec.ok_or_else(|| {
            CirrusError::GeometryRejected(format!(
                "unknown scan type{}, supply forced shape",
                scan_type_key
                    .map(|k| format!(" '{}'", k))
                    .unwrap_or_default()
            ))
        })?;
        check_size(spec.geometry, byte_len, &spec.key)?;

        Ok(ResolvedGeometry {
            shape: spec.geometry,
            spacing: spec.spacing,
            scan_type: Some(spec.key.clone()),
            forced: false,
        })
    }
}

fn check_size(shape: VolumeShape, byte_len: u64, source: &str) -> Result<()> {
    match shape.voxel_count() {
        Some(expected) if expected == byte_len => Ok(()),
        Some(expected) => Err(CirrusError::GeometryRejected(format!(
            "size mismatch: file has {} bytes, {} {} expects {} bytes",
            byte_len, source, shape, expected
        ))),
        None => Err(CirrusError::GeometryRejected(format!(
            "size mismatch: {} {} overflows, file has {} bytes",
            source, shape, byte_len
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MACULAR_CUBE_200X200;

    fn rejection_message(result: Result<ResolvedGeometry>) -> String {
        match result {
            Err(CirrusError::GeometryRejected(msg)) => msg,
            other => panic!("expected GeometryRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_resolves_macular_cube() {
        let registry = ScanTypeRegistry::default();
        let resolver = ShapeResolver::new(&registry);
        let geometry = resolver
            .resolve(40_960_000, Some(MACULAR_CUBE_200X200), None)
            .unwrap();

        assert_eq!(geometry.shape, VolumeShape::new(200, 1024, 200));
        assert_eq!(geometry.spacing, VoxelSpacing::new(0.03, 0.001953125, 0.03));
        assert_eq!(geometry.scan_type.as_deref(), Some(MACULAR_CUBE_200X200));
        assert!(!geometry.forced);
    }

    #[test]
    fn test_off_by_one_is_rejected() {
        let registry = ScanTypeRegistry::default();
        let resolver = ShapeResolver::new(&registry);
        let msg = rejection_message(resolver.resolve(
            40_960_001,
            Some(MACULAR_CUBE_200X200),
            None,
        ));
        assert!(msg.contains("size mismatch"));
        assert!(msg.contains("40960001"));
        assert!(msg.contains("40960000"));
    }

    #[test]
    fn test_unknown_scan_type_needs_forced_shape() {
        let registry = ScanTypeRegistry::default();
        let resolver = ShapeResolver::new(&registry);
        let msg = rejection_message(resolver.resolve(40_960_000, None, None));
        assert!(msg.contains("unknown scan type"));
        assert!(msg.contains("supply forced shape"));

        let msg = rejection_message(resolver.resolve(40_960_000, Some("optic_disc"), None));
        assert!(msg.contains("'optic_disc'"));
    }

    #[test]
    fn test_forced_shape_unknown_scan_type() {
        let registry = ScanTypeRegistry::default();
        let resolver = ShapeResolver::new(&registry);
        let forced = VolumeShape::new(100, 1024, 100);
        let geometry = resolver.resolve(10_240_000, None, Some(forced)).unwrap();

        assert_eq!(geometry.shape, forced);
        assert_eq!(geometry.spacing, VoxelSpacing::unknown());
        assert!(geometry.scan_type.is_none());
        assert!(geometry.forced);
    }

    #[test]
    fn test_forced_shape_overrides_registry() {
        let registry = ScanTypeRegistry::default();
        let resolver = ShapeResolver::new(&registry);
        let forced = VolumeShape::new(100, 1024, 100);
        let geometry = resolver
            .resolve(10_240_000, Some(MACULAR_CUBE_200X200), Some(forced))
            .unwrap();

        assert_eq!(geometry.shape, forced);
        assert_eq!(geometry.spacing, VoxelSpacing::new(0.03, 0.001953125, 0.03));
    }

    #[test]
    fn test_forced_shape_must_match_size() {
        let registry = ScanTypeRegistry::default();
        let resolver = ShapeResolver::new(&registry);
        let msg = rejection_message(resolver.resolve(
            40_960_000,
            Some(MACULAR_CUBE_200X200),
            Some(VolumeShape::new(100, 1024, 100)),
        ));
        assert!(msg.contains("forced shape"));
        assert!(msg.contains("10240000"));
    }

    #[test]
    fn test_forced_shape_zero_axis() {
        let registry = ScanTypeRegistry::default();
        let resolver = ShapeResolver::new(&registry);
        let msg = rejection_message(resolver.resolve(0, None, Some(VolumeShape::new(0, 1, 1))));
        assert!(msg.contains("malformed"));
    }
}
