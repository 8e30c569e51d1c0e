//! Core type definitions for OCT volume extraction
//!
//! This module provides the fundamental types used throughout the cirrusvol library:
//! - [`VolumeShape`]: Volume geometry in (z, y, x) order
//! - [`VoxelSpacing`]: Physical voxel spacing in millimeters
//! - [`ScanTypeSpec`] / [`ScanTypeRegistry`]: Known acquisition protocols
//! - [`ConversionStatus`]: Per-file outcome of a run
//! - [`BScanOrientation`]: How B-scans are laid out after reshaping
//! - [`ExtractConfig`]: Configuration for one extraction run

mod config;
mod enums;
mod geometry;
mod scan_type;

pub use config::{ExtractConfig, DEFAULT_PATTERN, DEFAULT_SCAN_TOKEN, DEFAULT_VERSION};
pub use enums::{BScanOrientation, ConversionStatus};
pub use geometry::{VolumeShape, VoxelSpacing};
pub use scan_type::{ScanTypeRegistry, ScanTypeSpec, MACULAR_CUBE_200X200};
