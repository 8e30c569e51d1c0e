use super::ConversionRecord;
use crate::types::ConversionStatus;
use serde::Serialize;

/// Aggregate outcome of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub converted: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub failed: usize,
    pub planned: usize,

    /// Whether the run was a dry run
    pub dry_run: bool,

    /// Whether processing stopped at the configured file cap
    pub hit_limit: bool,

    /// Per-file records in processing order
    pub records: Vec<ConversionRecord>,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Adds one record and bumps its status counter
    pub fn push(&mut self, record: ConversionRecord) {
        *self.counter_mut(record.status) += 1;
        self.records.push(record);
    }

    /// Number of records in `status`
    pub fn count(&self, status: ConversionStatus) -> usize {
        match status {
            ConversionStatus::Converted => self.converted,
            ConversionStatus::Skipped => self.skipped,
            ConversionStatus::Rejected => self.rejected,
            ConversionStatus::Failed => self.failed,
            ConversionStatus::Planned => self.planned,
        }
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Records in `status`
    pub fn records_with(&self, status: ConversionStatus) -> impl Iterator<Item = &ConversionRecord> {
        self.records.iter().filter(move |r| r.status == status)
    }

    fn counter_mut(&mut self, status: ConversionStatus) -> &mut usize {
        match status {
            ConversionStatus::Converted => &mut self.converted,
            ConversionStatus::Skipped => &mut self.skipped,
            ConversionStatus::Rejected => &mut self.rejected,
            ConversionStatus::Failed => &mut self.failed,
            ConversionStatus::Planned => &mut self.planned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(status: ConversionStatus) -> ConversionRecord {
        ConversionRecord::new(PathBuf::from("x.img"), status)
    }

    #[test]
    fn test_counts_per_status() {
        let mut summary = RunSummary::new(false);
        summary.push(record(ConversionStatus::Converted));
        summary.push(record(ConversionStatus::Converted));
        summary.push(record(ConversionStatus::Rejected));
        summary.push(record(ConversionStatus::Failed));
        summary.push(record(ConversionStatus::Skipped));

        assert_eq!(summary.count(ConversionStatus::Converted), 2);
        assert_eq!(summary.count(ConversionStatus::Rejected), 1);
        assert_eq!(summary.count(ConversionStatus::Planned), 0);
        assert_eq!(summary.total(), 5);
        assert!(summary.has_failures());
        assert_eq!(summary.records_with(ConversionStatus::Converted).count(), 2);
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::new(true);
        assert!(summary.dry_run);
        assert_eq!(summary.total(), 0);
        assert!(!summary.has_failures());
        assert!(!summary.hit_limit);
    }
}
