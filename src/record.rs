// 📰 Record Types
// One struct per artifact row; serde field names are the CSV headers

use crate::dates::format_timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Columns every input file must carry
pub const REQUIRED_INPUT_COLUMNS: [&str; 5] = ["text", "title", "country", "date", "url"];

/// Columns the analysis input must carry (`stars` comes from an external scorer)
pub const REQUIRED_ANALYSIS_COLUMNS: [&str; 6] = ["text", "title", "country", "date", "stars", "url"];

// ============================================================================
// VALIDATED RECORD (combine stage)
// ============================================================================

/// NewsRecord - a row that survived loading
///
/// Absent optional cells are kept as empty strings; `title` and `url`
/// are guaranteed non-blank.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsRecord {
    pub text: String,
    pub title: String,
    pub country: String,
    pub date: String,
    pub url: String,

    // Provenance
    pub date_original: String,
    pub date_parsed: Option<NaiveDateTime>,
    pub source_file: String,
    pub id: u64,
}

/// CombinedRow - on-disk shape of `combined_news_data.csv`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedRow {
    pub text: String,
    pub title: String,
    pub country: String,
    pub date: String,
    pub url: String,
    pub date_original: String,
    pub date_parsed: String,
    pub source_file: String,
    pub id: u64,
}

impl CombinedRow {
    /// Fields ready for a `\`-escaping writer
    pub fn escaped(self) -> Self {
        CombinedRow {
            text: escape_backslashes(&self.text),
            title: escape_backslashes(&self.title),
            country: escape_backslashes(&self.country),
            date: escape_backslashes(&self.date),
            url: escape_backslashes(&self.url),
            date_original: escape_backslashes(&self.date_original),
            source_file: escape_backslashes(&self.source_file),
            ..self
        }
    }
}

impl From<&NewsRecord> for CombinedRow {
    fn from(r: &NewsRecord) -> Self {
        CombinedRow {
            text: r.text.clone(),
            title: r.title.clone(),
            country: r.country.clone(),
            date: r.date.clone(),
            url: r.url.clone(),
            date_original: r.date_original.clone(),
            date_parsed: r.date_parsed.as_ref().map(format_timestamp).unwrap_or_default(),
            source_file: r.source_file.clone(),
            id: r.id,
        }
    }
}

// ============================================================================
// ANALYSIS RECORDS (analysis stage)
// ============================================================================

/// AnalysisInputRow - one row of the scored dataset, as read
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisInputRow {
    pub text: Option<String>,
    pub title: Option<String>,
    pub country: Option<String>,
    pub date: Option<String>,
    pub stars: Option<String>,
    pub url: Option<String>,
    pub id: Option<String>,
}

/// AnalysisRecord - a dated row at or after the cutoff year
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub year: i32,
    pub country: String,
    /// `None` when the cell was empty, non-numeric or outside 1..=5
    pub stars: Option<u8>,
    pub title: String,
    pub text: String,
    pub url: String,
    pub id: String,
}

/// Read a star cell: "4", " 4 ", "4.0" → 4. Anything outside 1..=5 is rejected.
pub fn parse_stars(raw: &str) -> Option<u8> {
    let value: f64 = raw.trim().parse().ok()?;
    if value.fract() != 0.0 || !(1.0..=5.0).contains(&value) {
        return None;
    }
    Some(value as u8)
}

// ============================================================================
// REPORT ROWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryYearRow {
    pub year: i32,
    pub country: String,
    pub stars_1: u64,
    pub stars_2: u64,
    pub stars_3: u64,
    pub stars_4: u64,
    pub stars_5: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRow {
    pub year: i32,
    pub country: String,
    pub topic: String,
    pub stars_1: u64,
    pub stars_2: u64,
    pub stars_3: u64,
    pub stars_4: u64,
    pub stars_5: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeRow {
    pub year: i32,
    pub country: String,
    pub stars: u8,
    pub title: String,
    pub id: String,
    pub text: String,
    pub url: String,
}

impl ExtremeRow {
    /// Fields ready for a `\`-escaping writer
    pub fn escaped(&self) -> Self {
        ExtremeRow {
            country: escape_backslashes(&self.country),
            title: escape_backslashes(&self.title),
            id: escape_backslashes(&self.id),
            text: escape_backslashes(&self.text),
            url: escape_backslashes(&self.url),
            ..*self
        }
    }
}

/// `\` → `\\`; the writer itself only escapes quotes
pub fn escape_backslashes(field: &str) -> String {
    field.replace('\\', "\\\\")
}
