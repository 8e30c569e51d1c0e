use crate::pipeline::RunSummary;
use crate::types::ConversionStatus;
use std::fmt;

/// Text report formatter for a run summary
pub struct TextReport<'a> {
    summary: &'a RunSummary,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(summary: &'a RunSummary) -> Self {
        Self { summary }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.summary.dry_run {
            "Cirrus Volume Extraction (dry run)"
        } else {
            "Cirrus Volume Extraction"
        };
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;
        writeln!(f)?;

        for status in ConversionStatus::ALL {
            let count = self.summary.count(status);
            if count > 0 || status != ConversionStatus::Planned {
                writeln!(f, "{:<11} {}", format!("{}:", status.simple_name()), count)?;
            }
        }
        writeln!(f, "{:<11} {}", "total:", self.summary.total())?;
        if self.summary.hit_limit {
            writeln!(f, "Stopped early at the file limit")?;
        }

        if self.summary.dry_run {
            self.write_section(f, "Planned", ConversionStatus::Planned)?;
            self.write_section(f, "Rejected", ConversionStatus::Rejected)?;
        }
        self.write_section(f, "Failures", ConversionStatus::Failed)?;

        Ok(())
    }
}

impl<'a> TextReport<'a> {
    /// Lists every record in `status` with its reason, if there are any
    fn write_section(
        &self,
        f: &mut fmt::Formatter<'_>,
        title: &str,
        status: ConversionStatus,
    ) -> fmt::Result {
        let mut records = self.summary.records_with(status).peekable();
        if records.peek().is_none() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "-".repeat(title.len()))?;
        for record in records {
            writeln!(
                f,
                "{} :: {}",
                record.input_path.display(),
                record.reason.as_deref().unwrap_or("unknown")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ConversionRecord;
    use std::path::PathBuf;

    #[test]
    fn test_text_report_format() {
        let mut summary = RunSummary::new(false);
        summary.push(ConversionRecord::new(
            PathBuf::from("/d/a_200x200.img"),
            ConversionStatus::Converted,
        ));
        summary.push(
            ConversionRecord::new(PathBuf::from("/d/b_200x200.img"), ConversionStatus::Failed)
                .with_reason("corrupt input: got 10 bytes, expected 24"),
        );
        summary.push(
            ConversionRecord::new(PathBuf::from("/d/c.img"), ConversionStatus::Rejected)
                .with_reason("path has no 'images' anchor directory"),
        );

        let output = format!("{}", TextReport::new(&summary));

        assert!(output.starts_with("Cirrus Volume Extraction\n"));
        assert!(output.contains("converted:  1"));
        assert!(output.contains("rejected:   1"));
        assert!(output.contains("failed:     1"));
        assert!(output.contains("total:      3"));
        assert!(!output.contains("planned:"));
        assert!(output.contains("/d/b_200x200.img :: corrupt input"));
        assert!(!output.contains("/d/c.img"));
    }

    #[test]
    fn test_dry_run_report() {
        let mut summary = RunSummary::new(true);
        summary.push(
            ConversionRecord::new(PathBuf::from("/d/a_200x200.img"), ConversionStatus::Planned)
                .with_reason("would convert to /out/a_200x200.img"),
        );
        summary.hit_limit = true;

        let output = format!("{}", TextReport::new(&summary));

        assert!(output.contains("(dry run)"));
        assert!(output.contains("planned:    1"));
        assert!(output.contains("Stopped early"));
        assert!(!output.contains("Failures"));
    }

    #[test]
    fn test_dry_run_report_lists_planned_and_rejected_reasons() {
        let mut summary = RunSummary::new(true);
        summary.push(
            ConversionRecord::new(PathBuf::from("/d/a_200x200.img"), ConversionStatus::Planned)
                .with_reason("would convert to /out/a_200x200.img"),
        );
        summary.push(
            ConversionRecord::new(PathBuf::from("/d/scan_512x512.img"), ConversionStatus::Rejected)
                .with_reason("classification rejected: filename 'scan_512x512.img' does not match filename pattern: missing '200x200'"),
        );

        let output = format!("{}", TextReport::new(&summary));

        assert!(output.contains("Planned\n-------\n"));
        assert!(output.contains("/d/a_200x200.img :: would convert to /out/a_200x200.img"));
        assert!(output.contains("Rejected\n--------\n"));
        assert!(output.contains("/d/scan_512x512.img :: classification rejected"));
        assert!(output.contains("missing '200x200'"));
        assert!(!output.contains("Failures"));
    }
}
