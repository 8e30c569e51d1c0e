use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one candidate file within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    /// Volume, spacing and metadata were written
    Converted,
    /// Outputs from a previous run were found and left untouched
    Skipped,
    /// File failed classification, geometry resolution or collided with another output
    Rejected,
    /// Reading or writing failed for an otherwise valid file
    Failed,
    /// Dry run only: the file would be converted
    Planned,
}

impl ConversionStatus {
    /// All statuses in report order
    pub const ALL: [ConversionStatus; 5] = [
        ConversionStatus::Converted,
        ConversionStatus::Skipped,
        ConversionStatus::Rejected,
        ConversionStatus::Failed,
        ConversionStatus::Planned,
    ];

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            ConversionStatus::Converted => "converted",
            ConversionStatus::Skipped => "skipped",
            ConversionStatus::Rejected => "rejected",
            ConversionStatus::Failed => "failed",
            ConversionStatus::Planned => "planned",
        }
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Orientation applied to each B-scan while reshaping the raw dump
///
/// Cirrus stores every B-scan bottom-up and mirrored; `Flipped` reverses
/// both in-plane axes so row 0 is the top of the retina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BScanOrientation {
    #[default]
    Flipped,
    /// Keep file order
    Raw,
}

impl BScanOrientation {
    pub fn simple_name(&self) -> &'static str {
        match self {
            BScanOrientation::Flipped => "flipped",
            BScanOrientation::Raw => "raw",
        }
    }
}

impl fmt::Display for BScanOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
