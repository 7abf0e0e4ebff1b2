// 📂 Record Loader
// Discover input CSVs, validate columns, drop incomplete rows, parse dates,
// assign run-scoped ids and provenance

use crate::config::PipelineConfig;
use crate::dates::DateParserChain;
use crate::record::{NewsRecord, REQUIRED_INPUT_COLUMNS};
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Rows with less text than this are flagged (not dropped)
pub const SHORT_TEXT_THRESHOLD: usize = 10;

/// Invalid raw dates kept per file for diagnostics
pub const INVALID_DATE_SAMPLES: usize = 3;

// ============================================================================
// DISCOVERY
// ============================================================================

/// All `*.csv` files directly inside the working directory, sorted by name.
///
/// Artifacts the pipeline writes (or reads by name) are skipped.
pub fn discover_input_files(config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let pattern = config.working_dir.join("*.csv");
    let pattern_str = pattern
        .to_str()
        .ok_or_else(|| anyhow!("Invalid glob pattern from path: {}", config.working_dir.display()))?;

    let reserved = config.reserved_file_names();
    let mut files = Vec::new();

    for entry in glob::glob(pattern_str).context("Invalid glob pattern")? {
        let path = entry.context("Failed to read directory entry")?;
        if !path.is_file() {
            continue;
        }

        let name = file_name_of(&path);
        if reserved.contains(&name.as_str()) {
            debug!(file = %name, "skipping pipeline artifact during discovery");
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.csv")
        .to_string()
}

// ============================================================================
// PER-FILE DIAGNOSTICS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TextStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

impl TextStats {
    /// Character-length stats over the given lengths; `None` when empty.
    pub fn from_lengths(lengths: &[usize]) -> Option<TextStats> {
        let min = *lengths.iter().min()?;
        let max = *lengths.iter().max()?;
        let mean = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
        Some(TextStats { min, max, mean })
    }
}

/// FileReport - what happened to one input file
#[derive(Debug, Clone, Default)]
pub struct FileReport {
    pub file_name: String,
    pub initial_rows: usize,
    pub columns: usize,
    pub malformed_rows: usize,
    pub missing_columns: Vec<String>,
    pub dropped_null: usize,
    pub valid_dates: usize,
    pub invalid_dates: usize,
    pub invalid_samples: Vec<String>,
    pub text_stats: Option<TextStats>,
    pub short_text_rows: usize,
    pub rows_added: usize,
}

impl FileReport {
    fn new(file_name: &str) -> Self {
        FileReport {
            file_name: file_name.to_string(),
            ..Default::default()
        }
    }

    /// A rejected file contributes no rows at all
    pub fn is_rejected(&self) -> bool {
        !self.missing_columns.is_empty()
    }

    /// Notes for the end-of-run debug section
    pub fn debug_notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.is_rejected() {
            notes.push(format!(
                "File {}: Missing columns {:?}",
                self.file_name, self.missing_columns
            ));
            return notes;
        }
        if self.malformed_rows > 0 {
            notes.push(format!(
                "File {}: {} malformed rows skipped",
                self.file_name, self.malformed_rows
            ));
        }
        if self.invalid_dates > 0 {
            notes.push(format!(
                "File {}: {} invalid dates",
                self.file_name, self.invalid_dates
            ));
        }
        if self.short_text_rows > 0 {
            notes.push(format!(
                "File {}: {} rows with very short text",
                self.file_name, self.short_text_rows
            ));
        }
        notes
    }

    pub fn print(&self) {
        println!("  Initial shape: ({}, {})", self.initial_rows, self.columns);
        if self.malformed_rows > 0 {
            println!("  ⚠️  Skipped {} malformed rows", self.malformed_rows);
        }
        if self.is_rejected() {
            println!(
                "⚠️  Warning: {} is missing columns: {:?}",
                self.file_name, self.missing_columns
            );
            return;
        }
        if self.dropped_null > 0 {
            println!("  Dropped {} rows with null title/url", self.dropped_null);
        }

        let total = self.valid_dates + self.invalid_dates;
        println!("  Date parsing: {}/{} valid dates", self.valid_dates, total);
        if self.invalid_dates > 0 {
            println!("    Sample invalid dates: {:?}", self.invalid_samples);
        }

        if let Some(stats) = &self.text_stats {
            println!(
                "  Text length stats - Min: {}, Max: {}, Mean: {:.0}",
                stats.min, stats.max, stats.mean
            );
        }
        if self.short_text_rows > 0 {
            println!(
                "  Found {} rows with very short text (<{} chars)",
                self.short_text_rows, SHORT_TEXT_THRESHOLD
            );
        }
        println!("  Final rows added: {}", self.rows_added);
    }
}

/// FileLoad - records accepted from one file plus its diagnostics
#[derive(Debug, Clone)]
pub struct FileLoad {
    pub report: FileReport,
    pub records: Vec<NewsRecord>,
}

// ============================================================================
// LOADING ONE FILE
// ============================================================================

/// Positions of the required columns in a header row
struct ColumnIndex {
    text: usize,
    title: usize,
    country: usize,
    date: usize,
    url: usize,
}

impl ColumnIndex {
    /// Ok(index) when all required columns exist, Err(missing names) otherwise
    fn from_headers(headers: &StringRecord) -> std::result::Result<Self, Vec<String>> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_INPUT_COLUMNS
            .iter()
            .filter(|col| position(**col).is_none())
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(ColumnIndex {
            text: position("text").unwrap_or_default(),
            title: position("title").unwrap_or_default(),
            country: position("country").unwrap_or_default(),
            date: position("date").unwrap_or_default(),
            url: position("url").unwrap_or_default(),
        })
    }
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

/// Load one file, numbering accepted rows from `first_id`.
///
/// Malformed rows are skipped; a file missing required columns comes back
/// with `report.is_rejected()` and no records. Only I/O-level failures
/// surface as `Err`.
pub fn load_file(path: &Path, first_id: u64, chain: &DateParserChain) -> Result<FileLoad> {
    let file_name = file_name_of(path);
    let mut report = FileReport::new(&file_name);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .escape(Some(b'\\'))
        .from_path(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", file_name))?
        .clone();
    report.columns = headers.len();

    // Read all well-formed rows first so the initial shape is known
    let mut rows: Vec<StringRecord> = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) if record.len() > headers.len() => {
                warn!(
                    file = %file_name,
                    line = ?record.position().map(|p| p.line()),
                    expected = headers.len(),
                    saw = record.len(),
                    "skipping row with too many fields"
                );
                report.malformed_rows += 1;
            }
            Ok(record) => rows.push(record),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(e).with_context(|| format!("I/O error while reading {}", file_name));
            }
            Err(e) => {
                warn!(
                    file = %file_name,
                    line = ?e.position().map(|p| p.line()),
                    error = %e,
                    "skipping malformed row"
                );
                report.malformed_rows += 1;
            }
        }
    }
    report.initial_rows = rows.len();

    let columns = match ColumnIndex::from_headers(&headers) {
        Ok(columns) => columns,
        Err(missing) => {
            warn!(file = %file_name, ?missing, "rejecting file with missing columns");
            report.missing_columns = missing;
            return Ok(FileLoad { report, records: Vec::new() });
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    let mut text_lengths = Vec::new();

    for row in &rows {
        let title = field(row, columns.title);
        let url = field(row, columns.url);
        if title.trim().is_empty() || url.trim().is_empty() {
            report.dropped_null += 1;
            continue;
        }

        let date = field(row, columns.date);
        let date_parsed = chain.parse(date);
        if date_parsed.is_some() {
            report.valid_dates += 1;
        } else {
            report.invalid_dates += 1;
            if report.invalid_samples.len() < INVALID_DATE_SAMPLES {
                report.invalid_samples.push(date.to_string());
            }
        }

        let text = field(row, columns.text);
        if !text.is_empty() {
            let len = text.chars().count();
            if len < SHORT_TEXT_THRESHOLD {
                report.short_text_rows += 1;
            }
            text_lengths.push(len);
        }

        records.push(NewsRecord {
            text: text.to_string(),
            title: title.to_string(),
            country: field(row, columns.country).to_string(),
            date: date.to_string(),
            url: url.to_string(),
            date_original: date.to_string(),
            date_parsed,
            source_file: file_name.clone(),
            id: first_id + records.len() as u64,
        });
    }

    report.text_stats = TextStats::from_lengths(&text_lengths);
    report.rows_added = records.len();

    Ok(FileLoad { report, records })
}

// ============================================================================
// LOADING ALL FILES
// ============================================================================

/// LoadOutcome - every accepted file, in processing order
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub accepted: Vec<FileLoad>,
    pub rejected: Vec<FileReport>,
    /// Files that could not be read at all
    pub failed: Vec<String>,
    pub debug_notes: Vec<String>,
}

impl LoadOutcome {
    pub fn total_rows(&self) -> usize {
        self.accepted.iter().map(|f| f.records.len()).sum()
    }
}

/// Load each file in order, threading the next id through the loop.
///
/// A file that fails to load is reported and skipped; the run continues.
pub fn load_all(paths: &[PathBuf], chain: &DateParserChain) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();
    let mut next_id: u64 = 1;

    for path in paths {
        let file_name = file_name_of(path);
        println!("\n📄 Processing {}...", file_name);

        match load_file(path, next_id, chain) {
            Ok(load) => {
                load.report.print();
                outcome.debug_notes.extend(load.report.debug_notes());

                if load.report.is_rejected() {
                    outcome.rejected.push(load.report);
                } else {
                    next_id += load.records.len() as u64;
                    outcome.accepted.push(load);
                }
            }
            Err(e) => {
                println!("❌ Error reading {}: {:#}", file_name, e);
                warn!(file = %file_name, error = %format!("{:#}", e), "skipping unreadable file");
                outcome
                    .debug_notes
                    .push(format!("File {}: Critical error - {:#}", file_name, e));
                outcome.failed.push(file_name);
            }
        }
    }

    outcome
}
