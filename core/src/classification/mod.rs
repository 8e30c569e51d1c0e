//! Input file classification
//!
//! Decides which discovered files are Cirrus cube exports and where their
//! outputs go in the mirrored tree.

pub mod path;
pub mod sanitize;

pub use path::{MirroredPath, PathClassifier, Rejection, CIRRUS_SEGMENT, IMAGES_ANCHOR};
pub use sanitize::sanitize_filename;
