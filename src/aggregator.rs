// 📊 Aggregator - Star Rating Reports
// Country-year pivot, topic pivot and extreme-ratings extract
//
// Star categories are a fixed set (1..=5) and every pivot row carries all
// five counts, zero-filled.

use crate::combiner::escaped_builder;
use crate::record::{AnalysisRecord, CountryYearRow, ExtremeRow, TopicRow};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// The rating scale, lowest to highest
pub const STAR_VALUES: [u8; 5] = [1, 2, 3, 4, 5];

/// Ratings kept by the extreme-ratings extract
pub const EXTREME_STARS: [u8; 2] = [1, 5];

// ============================================================================
// STAR COUNTS
// ============================================================================

/// Dense per-category counts for one pivot key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StarCounts {
    counts: [u64; 5],
}

impl StarCounts {
    /// Count one rating; false (and no change) when outside 1..=5
    pub fn add(&mut self, stars: u8) -> bool {
        match STAR_VALUES.iter().position(|s| *s == stars) {
            Some(i) => {
                self.counts[i] += 1;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, stars: u8) -> u64 {
        STAR_VALUES
            .iter()
            .position(|s| *s == stars)
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }
}

/// Group key must be present: a country and a usable rating
fn pivot_key(record: &AnalysisRecord) -> Option<(&str, u8)> {
    match (record.country.as_str(), record.stars) {
        ("", _) | (_, None) => None,
        (country, Some(stars)) => Some((country, stars)),
    }
}

// ============================================================================
// COUNTRY-YEAR PIVOT
// ============================================================================

/// One row per (year, country), sorted by year then country.
pub fn country_year_pivot(records: &[AnalysisRecord]) -> Vec<CountryYearRow> {
    let mut groups: BTreeMap<(i32, &str), StarCounts> = BTreeMap::new();

    for record in records {
        if let Some((country, stars)) = pivot_key(record) {
            groups
                .entry((record.year, country))
                .or_default()
                .add(stars);
        }
    }

    groups
        .into_iter()
        .map(|((year, country), c)| CountryYearRow {
            year,
            country: country.to_string(),
            stars_1: c.get(1),
            stars_2: c.get(2),
            stars_3: c.get(3),
            stars_4: c.get(4),
            stars_5: c.get(5),
        })
        .collect()
}

// ============================================================================
// TOPIC PIVOT
// ============================================================================

/// TopicMatcher - case-insensitive substring search over a fixed vocabulary
///
/// Matching is plain containment: a keyword inside a longer word counts.
pub struct TopicMatcher {
    /// (display form, lowercase form), in vocabulary order
    topics: Vec<(String, String)>,
}

impl TopicMatcher {
    pub fn new(topics: &[String]) -> Self {
        TopicMatcher {
            topics: topics
                .iter()
                .map(|t| (t.clone(), t.to_lowercase()))
                .collect(),
        }
    }

    /// Every vocabulary entry found in `text`, in vocabulary order
    pub fn matches<'a>(&'a self, text: &str) -> Vec<&'a str> {
        let lower = text.to_lowercase();
        self.topics
            .iter()
            .filter(|(_, needle)| lower.contains(needle.as_str()))
            .map(|(topic, _)| topic.as_str())
            .collect()
    }
}

/// One row per (year, country, topic); a record counts once per matched topic.
pub fn topic_pivot(records: &[AnalysisRecord], matcher: &TopicMatcher) -> Vec<TopicRow> {
    let mut groups: BTreeMap<(i32, &str, &str), StarCounts> = BTreeMap::new();

    for record in records {
        let Some((country, stars)) = pivot_key(record) else {
            continue;
        };
        for topic in matcher.matches(&record.text) {
            groups
                .entry((record.year, country, topic))
                .or_default()
                .add(stars);
        }
    }

    groups
        .into_iter()
        .map(|((year, country, topic), c)| TopicRow {
            year,
            country: country.to_string(),
            topic: topic.to_string(),
            stars_1: c.get(1),
            stars_2: c.get(2),
            stars_3: c.get(3),
            stars_4: c.get(4),
            stars_5: c.get(5),
        })
        .collect()
}

// ============================================================================
// EXTREME RATINGS
// ============================================================================

/// Collapse all whitespace runs (newlines included) to one space, trim,
/// and drop control characters such as NUL.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Rows rated 1 or 5, cleaned and sorted by (country, year, stars).
pub fn extreme_ratings(records: &[AnalysisRecord]) -> Vec<ExtremeRow> {
    let mut rows: Vec<ExtremeRow> = records
        .iter()
        .filter_map(|r| match r.stars {
            Some(stars) if EXTREME_STARS.contains(&stars) => Some(ExtremeRow {
                year: r.year,
                country: r.country.clone(),
                stars,
                title: clean_text(&r.title),
                id: r.id.clone(),
                text: clean_text(&r.text),
                url: r.url.clone(),
            }),
            _ => None,
        })
        .collect();

    // Stable: ties keep input order
    rows.sort_by(|a, b| {
        (a.country.as_str(), a.year, a.stars).cmp(&(b.country.as_str(), b.year, b.stars))
    });
    rows
}

/// Count of extreme rows per (country, stars)
pub fn extreme_summary(rows: &[ExtremeRow]) -> Vec<(String, u8, usize)> {
    let mut counts: BTreeMap<(&str, u8), usize> = BTreeMap::new();
    for row in rows {
        *counts.entry((row.country.as_str(), row.stars)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((country, stars), n)| (country.to_string(), stars, n))
        .collect()
}

// ============================================================================
// WRITERS
// ============================================================================

/// Write rows with a header line, even when `rows` is empty.
fn write_rows<T: Serialize>(
    path: &Path,
    headers: &[&str],
    rows: &[T],
    mut builder: WriterBuilder,
) -> Result<()> {
    let mut writer = builder
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

const COUNTRY_YEAR_HEADERS: [&str; 7] =
    ["year", "country", "stars_1", "stars_2", "stars_3", "stars_4", "stars_5"];
const TOPIC_HEADERS: [&str; 8] = [
    "year", "country", "topic", "stars_1", "stars_2", "stars_3", "stars_4", "stars_5",
];
const EXTREME_HEADERS: [&str; 7] = ["year", "country", "stars", "title", "id", "text", "url"];

// ============================================================================
// REPORT RUNNERS
// ============================================================================

pub fn generate_country_year_pivot(records: &[AnalysisRecord], output: &Path) -> Result<usize> {
    let rows = country_year_pivot(records);
    write_rows(output, &COUNTRY_YEAR_HEADERS, &rows, WriterBuilder::new())?;

    println!("✓ Generated: {}", output.display());
    if rows.is_empty() {
        println!("  No records available for the country-year pivot.");
    }
    Ok(rows.len())
}

pub fn generate_topic_pivot(
    records: &[AnalysisRecord],
    matcher: &TopicMatcher,
    output: &Path,
) -> Result<usize> {
    let rows = topic_pivot(records, matcher);
    write_rows(output, &TOPIC_HEADERS, &rows, WriterBuilder::new())?;

    if rows.is_empty() {
        println!("No records found containing the specified topics.");
    }
    println!("✓ Generated: {}", output.display());
    println!("Topic analysis records: {}", rows.len());
    Ok(rows.len())
}

pub fn generate_extreme_ratings(records: &[AnalysisRecord], output: &Path) -> Result<usize> {
    let rows = extreme_ratings(records);
    let escaped: Vec<ExtremeRow> = rows.iter().map(ExtremeRow::escaped).collect();
    write_rows(output, &EXTREME_HEADERS, &escaped, escaped_builder())?;

    println!("✓ Generated: {}", output.display());
    println!("Extreme ratings records: {}", rows.len());

    println!("\nExtreme ratings summary:");
    println!("{:<20} {:>5} {:>8}", "country", "stars", "count");
    for (country, stars, n) in extreme_summary(&rows) {
        println!("{:<20} {:>5} {:>8}", country, stars, n);
    }
    Ok(rows.len())
}

/// Which sub-reports completed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOutcome {
    pub country_year_rows: Option<usize>,
    pub topic_rows: Option<usize>,
    pub extreme_rows: Option<usize>,
}

impl ReportOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.country_year_rows.is_some() && self.topic_rows.is_some() && self.extreme_rows.is_some()
    }
}

fn isolate(label: &str, result: Result<usize>) -> Option<usize> {
    match result {
        Ok(n) => Some(n),
        Err(e) => {
            println!("❌ Error creating {}: {:#}", label, e);
            warn!(report = label, error = %format!("{:#}", e), "sub-report failed");
            None
        }
    }
}

/// Run all three sub-reports; a failure in one never stops the others.
pub fn run_reports(
    records: &[AnalysisRecord],
    matcher: &TopicMatcher,
    country_year_output: &Path,
    topic_output: &Path,
    extreme_output: &Path,
) -> ReportOutcome {
    let skipped = records.iter().filter(|r| pivot_key(r).is_none()).count();
    if skipped > 0 {
        warn!(skipped, "records without country or usable stars left out of pivots");
    }

    ReportOutcome {
        country_year_rows: isolate(
            "country-year pivot",
            generate_country_year_pivot(records, country_year_output),
        ),
        topic_rows: isolate(
            "topic analysis",
            generate_topic_pivot(records, matcher, topic_output),
        ),
        extreme_rows: isolate(
            "extreme ratings file",
            generate_extreme_ratings(records, extreme_output),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rec(year: i32, country: &str, stars: Option<u8>, text: &str) -> AnalysisRecord {
        AnalysisRecord {
            year,
            country: country.to_string(),
            stars,
            title: "titulo".to_string(),
            text: text.to_string(),
            url: "http://x".to_string(),
            id: "1".to_string(),
        }
    }

    fn default_matcher() -> TopicMatcher {
        let topics: Vec<String> = crate::config::DEFAULT_TOPICS
            .iter()
            .map(|t| t.to_string())
            .collect();
        TopicMatcher::new(&topics)
    }

    #[test]
    fn test_star_counts() {
        let mut counts = StarCounts::default();
        assert!(counts.add(1));
        assert!(counts.add(5));
        assert!(counts.add(5));
        assert!(!counts.add(0));
        assert!(!counts.add(6));

        assert_eq!(counts.get(1), 1);
        assert_eq!(counts.get(3), 0);
        assert_eq!(counts.get(5), 2);
    }

    #[test]
    fn test_country_year_pivot_example() {
        let records = vec![
            rec(2017, "US", Some(5), "a"),
            rec(2017, "US", Some(1), "b"),
        ];

        let rows = country_year_pivot(&records);

        assert_eq!(
            rows,
            vec![CountryYearRow {
                year: 2017,
                country: "US".to_string(),
                stars_1: 1,
                stars_2: 0,
                stars_3: 0,
                stars_4: 0,
                stars_5: 1,
            }]
        );
    }

    #[test]
    fn test_country_year_pivot_sums_and_order() {
        let records = vec![
            rec(2018, "MX", Some(3), ""),
            rec(2017, "US", Some(2), ""),
            rec(2017, "AR", Some(4), ""),
            rec(2017, "AR", Some(4), ""),
            rec(2017, "AR", None, ""),
            rec(2017, "", Some(4), ""),
        ];

        let rows = country_year_pivot(&records);
        let keys: Vec<(i32, &str)> = rows.iter().map(|r| (r.year, r.country.as_str())).collect();
        assert_eq!(keys, vec![(2017, "AR"), (2017, "US"), (2018, "MX")]);

        let ar = &rows[0];
        assert_eq!(ar.stars_4, 2);
        assert_eq!(ar.stars_1 + ar.stars_2 + ar.stars_3 + ar.stars_4 + ar.stars_5, 2);
    }

    #[test]
    fn test_topic_matcher_substring_and_case() {
        let matcher = default_matcher();

        assert_eq!(
            matcher.matches("me siento mucha ansiedad y estrés"),
            vec!["ansiedad", "estrés"]
        );
        assert_eq!(matcher.matches("La DEPRESIÓN avanza"), vec!["depresión"]);
        // Embedded in a longer word still counts
        assert_eq!(matcher.matches("neuropsicología infantil"), vec!["psicología"]);
        assert!(matcher.matches("nada relevante").is_empty());
    }

    #[test]
    fn test_topic_pivot_counts_each_topic_once() {
        let matcher = default_matcher();
        let records = vec![
            rec(2019, "CO", Some(2), "me siento mucha ansiedad y estrés"),
            rec(2019, "CO", Some(2), "sin temas"),
            rec(2019, "CO", Some(5), "ansiedad, ansiedad, ansiedad"),
        ];

        let rows = topic_pivot(&records, &matcher);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].topic, "ansiedad");
        assert_eq!(rows[0].stars_2, 1);
        assert_eq!(rows[0].stars_5, 1);
        assert_eq!(rows[1].topic, "estrés");
        assert_eq!(rows[1].stars_2, 1);
        assert_eq!(rows[1].stars_5, 0);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  hola\n\nmundo\r\n  otra\tvez "), "hola mundo otra vez");
        assert_eq!(clean_text("nul\0byte"), "nulbyte");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_extreme_ratings_filter_and_sort() {
        let mut records = vec![
            rec(2019, "US", Some(5), "us 2019 five"),
            rec(2018, "US", Some(1), "us\n2018 one"),
            rec(2018, "AR", Some(5), "ar five"),
            rec(2018, "AR", Some(1), "ar one"),
            rec(2018, "AR", Some(3), "ar three"),
            rec(2018, "AR", None, "ar none"),
        ];
        records[1].title = "linea\r\nnueva\0".to_string();

        let rows = extreme_ratings(&records);

        let keys: Vec<(&str, i32, u8)> = rows
            .iter()
            .map(|r| (r.country.as_str(), r.year, r.stars))
            .collect();
        assert_eq!(
            keys,
            vec![("AR", 2018, 1), ("AR", 2018, 5), ("US", 2018, 1), ("US", 2019, 5)]
        );
        assert_eq!(rows[2].title, "linea nueva");
        assert_eq!(rows[2].text, "us 2018 one");
        assert!(rows
            .iter()
            .all(|r| !r.text.contains('\n') && !r.title.contains('\0')));
    }

    #[test]
    fn test_generate_extreme_ratings_escapes_like_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extreme.csv");
        let mut records = vec![rec(2018, "AR", Some(5), "dijo \"no\" en C:\\")];
        records[0].title = "barra \\".to_string();

        assert_eq!(generate_extreme_ratings(&records, &path).unwrap(), 1);

        let mut reader = csv::ReaderBuilder::new()
            .escape(Some(b'\\'))
            .from_path(&path)
            .unwrap();
        let rows: Vec<ExtremeRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "dijo \"no\" en C:\\");
        assert_eq!(rows[0].title, "barra \\");
        assert_eq!(rows[0].stars, 5);
    }

    #[test]
    fn test_extreme_summary() {
        let records = vec![
            rec(2018, "AR", Some(5), ""),
            rec(2019, "AR", Some(5), ""),
            rec(2018, "US", Some(1), ""),
        ];
        let summary = extreme_summary(&extreme_ratings(&records));
        assert_eq!(
            summary,
            vec![("AR".to_string(), 5, 2), ("US".to_string(), 1, 1)]
        );
    }

    #[test]
    fn test_run_reports_empty_writes_headers() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        let c = dir.path().join("c.csv");

        let outcome = run_reports(&[], &default_matcher(), &a, &b, &c);

        assert!(outcome.all_succeeded());
        assert_eq!(outcome.country_year_rows, Some(0));
        assert_eq!(
            std::fs::read_to_string(&a).unwrap().trim_end(),
            "year,country,stars_1,stars_2,stars_3,stars_4,stars_5"
        );
        assert_eq!(
            std::fs::read_to_string(&b).unwrap().trim_end(),
            "year,country,topic,stars_1,stars_2,stars_3,stars_4,stars_5"
        );
        assert_eq!(
            std::fs::read_to_string(&c).unwrap().trim_end(),
            "\"year\",\"country\",\"stars\",\"title\",\"id\",\"text\",\"url\""
        );
    }

    #[test]
    fn test_run_reports_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("missing_dir").join("pivot.csv");
        let topic = dir.path().join("topic.csv");
        let extreme = dir.path().join("extreme.csv");
        let records = vec![rec(2020, "PE", Some(1), "ansiedad")];

        let outcome = run_reports(&records, &default_matcher(), &bad, &topic, &extreme);

        assert_eq!(outcome.country_year_rows, None);
        assert_eq!(outcome.topic_rows, Some(1));
        assert_eq!(outcome.extreme_rows, Some(1));
        assert!(!outcome.all_succeeded());
    }
}
