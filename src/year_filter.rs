// 🗓️ Year Filter
// Read the scored dataset, re-parse dates, keep rows at or after the cutoff year

use crate::dates::DateParserChain;
use crate::record::{parse_stars, AnalysisInputRow, AnalysisRecord, REQUIRED_ANALYSIS_COLUMNS};
use anyhow::{bail, Context, Result};
use chrono::Datelike;
use csv::ReaderBuilder;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct YearFilterOutcome {
    pub original_rows: usize,
    /// Rows whose date could not be parsed (no year)
    pub undated_rows: usize,
    pub cutoff_year: i32,
    pub records: Vec<AnalysisRecord>,
}

impl YearFilterOutcome {
    pub fn print(&self) {
        println!("Original dataset: {} records", self.original_rows);
        if self.undated_rows > 0 {
            println!("  {} records without a usable date", self.undated_rows);
        }
        println!(
            "After {} cutoff: {} records",
            self.cutoff_year,
            self.records.len()
        );
    }
}

/// Load the analysis input and keep rows with `year >= cutoff_year`.
///
/// All-or-nothing: a missing file, a missing required column or a single
/// malformed CSV row fails the whole stage. Short rows are accepted and
/// their missing trailing cells read as absent. Dates are parsed afresh with
/// `chain`; nothing computed by the combine stage is reused.
pub fn filter_by_year(
    path: &Path,
    cutoff_year: i32,
    chain: &DateParserChain,
) -> Result<YearFilterOutcome> {
    if !path.exists() {
        bail!("File '{}' not found.", path.display());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .clone();
    let missing: Vec<&str> = REQUIRED_ANALYSIS_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        bail!("{} is missing columns: {:?}", path.display(), missing);
    }

    let mut outcome = YearFilterOutcome {
        cutoff_year,
        ..Default::default()
    };

    for result in reader.records() {
        let record = result.with_context(|| format!("Failed to parse CSV in {}", path.display()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() > headers.len() {
            bail!(
                "Line {} in {} has {} fields, header has {}",
                line,
                path.display(),
                record.len(),
                headers.len()
            );
        }
        let row: AnalysisInputRow = record.deserialize(Some(&headers)).with_context(|| {
            format!("Failed to parse CSV line {} in {}", line, path.display())
        })?;
        outcome.original_rows += 1;

        let date = row.date.as_deref().unwrap_or("");
        let year = match chain.parse(date) {
            Some(dt) => dt.year(),
            None => {
                outcome.undated_rows += 1;
                continue;
            }
        };
        if year < cutoff_year {
            continue;
        }

        outcome.records.push(AnalysisRecord {
            year,
            country: row.country.unwrap_or_default(),
            stars: row.stars.as_deref().and_then(parse_stars),
            title: row.title.unwrap_or_default(),
            text: row.text.unwrap_or_default(),
            url: row.url.unwrap_or_default(),
            id: row.id.unwrap_or_default(),
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "text,title,country,date,stars,url,id";

    fn write(dir: &TempDir, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("scored.csv");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_filter_keeps_cutoff_and_later() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &[
                HEADER,
                "a,t1,US,\"Jan 1, 2015 10:00:00\",5,u1,1",
                "b,t2,US,\"Jan 1, 2016 10:00:00\",4,u2,2",
                "c,t3,MX,2019-07-01,1.0,u3,3",
                "d,t4,MX,sometime,2,u4,4",
            ],
        );

        let outcome = filter_by_year(&path, 2016, &DateParserChain::new()).unwrap();

        assert_eq!(outcome.original_rows, 4);
        assert_eq!(outcome.undated_rows, 1);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].year, 2016);
        assert_eq!(outcome.records[0].stars, Some(4));
        assert_eq!(outcome.records[1].year, 2019);
        assert_eq!(outcome.records[1].stars, Some(1));
        assert_eq!(outcome.records[1].id, "3");
    }

    #[test]
    fn test_id_column_is_optional() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &["text,title,country,date,stars,url", "a,t,US,2018-01-01,3,u"],
        );

        let outcome = filter_by_year(&path, 2016, &DateParserChain::new()).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].id, "");
    }

    #[test]
    fn test_short_final_row_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &[HEADER, "a,t1,US,2018-01-01,3,u1,1", "b,t2,MX,2019-01-01,5,u2"],
        );

        let outcome = filter_by_year(&path, 2016, &DateParserChain::new()).unwrap();

        assert_eq!(outcome.original_rows, 2);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[1].country, "MX");
        assert_eq!(outcome.records[1].stars, Some(5));
        assert_eq!(outcome.records[1].id, "");
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = filter_by_year(&dir.path().join("nope.csv"), 2016, &DateParserChain::new())
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_missing_stars_column_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, &["text,title,country,date,url", "a,t,US,2018-01-01,u"]);

        let err = filter_by_year(&path, 2016, &DateParserChain::new()).unwrap_err();
        assert!(err.to_string().contains("stars"));
    }

    #[test]
    fn test_malformed_row_fails_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &[HEADER, "a,t,US,2018-01-01,3,u,1", "b,t,US,2018-01-01,3,u,2,extra"],
        );

        let err = filter_by_year(&path, 2016, &DateParserChain::new()).unwrap_err();
        assert!(err.to_string().contains("Line 3"));
    }
}
