use super::source::SourceResult;
use crate::application::{CloseoutReview, FinalCloseoutSummary};
use csv::Writer;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes the closeout summary and review items as CSV.
pub struct CsvExporter;

impl CsvExporter {
    pub fn export_to_path(
        summary: &FinalCloseoutSummary,
        review: &CloseoutReview,
        path: &Path,
    ) -> SourceResult<()> {
        let writer = Writer::from_path(path)?;
        Self::write(summary, review, writer)?;
        info!(path = %path.display(), "closeout summary exported");
        Ok(())
    }

    /// Rows are `section,item,field,value`.
    pub fn write<W: Write>(
        summary: &FinalCloseoutSummary,
        review: &CloseoutReview,
        mut writer: Writer<W>,
    ) -> SourceResult<()> {
        writer.write_record(["section", "item", "field", "value"])?;
        writer.write_record(["Summary", "", "Heading", summary.incentive_heading.as_str()])?;
        for line in summary.lines.iter().chain(summary.incentive_lines().iter()) {
            writer.write_record(["Summary", "", "Total", line.as_str()])?;
        }
        for row in &review.about {
            writer.write_record(["About Your PPM", "", row.label.as_str(), row.value.as_str()])?;
        }
        for section in &review.sections {
            writer.write_record([section.heading.as_str(), "", "Total", section.total.as_str()])?;
            for item in &section.items {
                for row in &item.rows {
                    writer.write_record([
                        section.heading.as_str(),
                        item.title.as_str(),
                        row.label.as_str(),
                        row.value.as_str(),
                    ])?;
                }
            }
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{build_review, FeatureFlags};
    use crate::domain::{
        Cents, GunSafeWeightTicket, MovingExpense, PpmDocuments, PpmShipment, Pounds, WeightTicket,
    };
    use tempfile::tempdir;

    fn sample_with(features: FeatureFlags) -> (FinalCloseoutSummary, CloseoutReview) {
        let shipment = PpmShipment {
            final_incentive: Some(Cents(250000)),
            ..Default::default()
        };
        let documents = PpmDocuments {
            weight_tickets: vec![WeightTicket {
                id: "wt-1".into(),
                empty_weight: Some(Pounds(14000)),
                full_weight: Some(Pounds(18000)),
                ..Default::default()
            }],
            gun_safe_weight_tickets: vec![GunSafeWeightTicket {
                id: "gs-1".into(),
                weight: Some(Pounds(320)),
                ..Default::default()
            }],
            moving_expenses: vec![MovingExpense {
                id: "me-1".into(),
                amount: Some(Cents(30000)),
                ..Default::default()
            }],
            ..Default::default()
        };
        (
            FinalCloseoutSummary::new(&shipment, &documents, features),
            build_review(&shipment, &documents, features),
        )
    }

    fn sample() -> (FinalCloseoutSummary, CloseoutReview) {
        sample_with(FeatureFlags::default())
    }

    #[test]
    fn test_export_rows() {
        let (summary, review) = sample();
        let mut buffer = Vec::new();
        CsvExporter::write(&summary, &review, Writer::from_writer(&mut buffer)).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("section,item,field,value\n"));
        assert!(text.contains("Summary,,Total,\"4,000 lbs total net weight\""));
        assert!(text.contains("Summary,,Total,$300.00 in expenses claimed"));
        assert!(text.contains("Weight moved,Trip 1,Full,\"18,000 lbs\""));
        assert!(!text.contains("Gun safe"));
    }

    #[test]
    fn test_export_gun_safe_rows() {
        let (summary, review) = sample_with(FeatureFlags { gun_safe: true });
        let mut buffer = Vec::new();
        CsvExporter::write(&summary, &review, Writer::from_writer(&mut buffer)).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("Summary,,Total,320 lbs of gun safe"));
        assert!(text.contains("Gun safe,Gun Safe 1,Weight,320 lbs"));
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let (summary, review) = sample();

        CsvExporter::export_to_path(&summary, &review, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Your final estimated incentive: $2,500.00"));
    }
}
