//! Tabular export of coverage results

use std::collections::BTreeMap;
use std::io::Write;

use super::result::{CoverageResult, CoverageStatus};

/// Column order of the exported report
pub const CSV_HEADERS: [&str; 4] = [
    "model_name",
    "matched_risks",
    "newly_added_not_covered",
    "coverage_status",
];

/// Write one row per model, with a header row
pub fn write_csv<W: Write>(results: &[CoverageResult], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADERS)?;
    for r in results {
        wtr.write_record([
            r.model_name.as_str(),
            r.matched_risks.as_str(),
            r.newly_added_not_covered.as_str(),
            r.coverage_status.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Number of models per coverage status
pub fn status_distribution(results: &[CoverageResult]) -> BTreeMap<CoverageStatus, usize> {
    let mut counts = BTreeMap::new();
    for r in results {
        *counts.entry(r.coverage_status).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, matched: &str, gaps: &str, status: CoverageStatus) -> CoverageResult {
        CoverageResult {
            model_name: name.to_string(),
            matched_risks: matched.to_string(),
            newly_added_not_covered: gaps.to_string(),
            coverage_status: status,
        }
    }

    #[test]
    fn test_csv_quotes_joined_lists() {
        let results = vec![
            result("Wires", "wire transfer, cross-border", "None", CoverageStatus::CompletelyCovered),
            result("Cash", "None", "hawala", CoverageStatus::NotCovered),
        ];

        let mut buf = Vec::new();
        write_csv(&results, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "model_name,matched_risks,newly_added_not_covered,coverage_status");
        assert_eq!(lines[1], "Wires,\"wire transfer, cross-border\",None,Completely Covered");
        assert_eq!(lines[2], "Cash,None,hawala,Not Covered");
    }

    #[test]
    fn test_csv_header_only_for_no_models() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "model_name,matched_risks,newly_added_not_covered,coverage_status\n"
        );
    }

    #[test]
    fn test_status_distribution() {
        let results = vec![
            result("a", "x", "None", CoverageStatus::CompletelyCovered),
            result("b", "None", "y", CoverageStatus::NotCovered),
            result("c", "None", "z", CoverageStatus::NotCovered),
        ];

        let dist = status_distribution(&results);
        assert_eq!(dist.get(&CoverageStatus::NotCovered), Some(&2));
        assert_eq!(dist.get(&CoverageStatus::CompletelyCovered), Some(&1));
        assert_eq!(dist.get(&CoverageStatus::PartiallyCovered), None);
    }
}
