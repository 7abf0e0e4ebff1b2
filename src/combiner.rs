// 🔗 Combiner
// Concatenate accepted files into one dataset and write combined_news_data.csv

use crate::dates::format_timestamp;
use crate::loader::LoadOutcome;
use crate::record::{CombinedRow, NewsRecord};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

// ============================================================================
// COMBINE
// ============================================================================

/// Concatenate in processing order; loader ids are kept as-is.
pub fn combine(outcome: LoadOutcome) -> Vec<NewsRecord> {
    outcome
        .accepted
        .into_iter()
        .flat_map(|file| file.records)
        .collect()
}

/// Builder for the input convention: every field quoted, `"` written as
/// `\"`. Callers must pass fields through `escape_backslashes` first so a
/// literal `\` survives a read with `escape(Some(b'\\'))`.
pub fn escaped_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .quote_style(QuoteStyle::Always)
        .double_quote(false)
        .escape(b'\\');
    builder
}

pub fn escaped_writer(path: &Path) -> Result<Writer<File>> {
    escaped_builder()
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))
}

/// Write every record in the input convention, readable by `load_file`.
pub fn write_combined(path: &Path, records: &[NewsRecord]) -> Result<()> {
    let mut writer = escaped_writer(path)?;

    for record in records {
        writer
            .serialize(CombinedRow::from(record).escaped())
            .with_context(|| format!("Failed to write row id {}", record.id))?;
    }
    writer.flush().context("Failed to flush combined output")?;

    Ok(())
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CombineSummary {
    pub total_processed: usize,
    pub combined_rows: usize,
    /// Sorted, distinct, non-empty
    pub countries: Vec<String>,
    pub valid_dates: usize,
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl CombineSummary {
    pub fn from_records(total_processed: usize, records: &[NewsRecord]) -> Self {
        let countries: BTreeSet<&str> = records
            .iter()
            .map(|r| r.country.as_str())
            .filter(|c| !c.is_empty())
            .collect();

        let dates: Vec<NaiveDateTime> = records.iter().filter_map(|r| r.date_parsed).collect();
        let date_range = dates
            .iter()
            .min()
            .zip(dates.iter().max())
            .map(|(min, max)| (*min, *max));

        CombineSummary {
            total_processed,
            combined_rows: records.len(),
            countries: countries.into_iter().map(String::from).collect(),
            valid_dates: dates.len(),
            date_range,
        }
    }

    pub fn valid_date_percent(&self) -> f64 {
        if self.combined_rows == 0 {
            return 0.0;
        }
        self.valid_dates as f64 / self.combined_rows as f64 * 100.0
    }

    pub fn print(&self, output: &Path) {
        println!("\n✅ Combination complete!");
        println!("Total rows processed: {}", self.total_processed);
        println!("Final combined rows: {}", self.combined_rows);
        println!("Output saved as: {}", output.display());

        println!("\n📊 Basic statistics:");
        println!("Countries represented: {}", self.countries.len());
        println!("Unique countries: {:?}", self.countries);
        println!(
            "Valid dates: {}/{} ({:.1}%)",
            self.valid_dates,
            self.combined_rows,
            self.valid_date_percent()
        );
        if let Some((min, max)) = &self.date_range {
            println!(
                "Date range: {} to {}",
                format_timestamp(min),
                format_timestamp(max)
            );
        }
    }
}

/// Print the loader's debug notes, if any
pub fn print_debug_notes(notes: &[String]) {
    if notes.is_empty() {
        return;
    }
    println!("\n=== DEBUG INFORMATION ===");
    for note in notes {
        println!("{}", note);
    }
    println!("=== END DEBUG INFO ===");
}

/// First `n` rows: raw date string next to what it parsed to
pub fn print_date_samples(records: &[NewsRecord], n: usize) {
    println!("\n=== DATE COMPARISON SAMPLE ===");
    for (i, record) in records.iter().take(n).enumerate() {
        let parsed = record
            .date_parsed
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "NaT".to_string());
        println!("Row {}: '{}' -> {}", i + 1, record.date_original, parsed);
    }
}
