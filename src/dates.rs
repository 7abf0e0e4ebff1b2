// 📅 Date Parsing - Fallback Chain
// Heterogeneous publication dates → NaiveDateTime (or nothing, never an error)

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::trace;

/// Canonical text form for parsed timestamps in written artifacts
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// STRATEGY TRAIT
// ============================================================================

/// DateStrategy - one way of reading a date string
///
/// Returns `None` for "no match"; a strategy never fails loudly.
/// The chain tries strategies in order and stops at the first match.
pub trait DateStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn parse(&self, raw: &str) -> Option<NaiveDateTime>;
}

// ============================================================================
// STRATEGIES
// ============================================================================

/// News-site format: "Jan 05, 2019 @ 14:03:22.120"
///
/// The " @ " separator is removed and everything from the first '.' on is
/// dropped, then the remainder must match `%b %d, %Y %H:%M:%S` exactly.
pub struct NewsTimestampStrategy;

impl NewsTimestampStrategy {
    const FORMAT: &'static str = "%b %d, %Y %H:%M:%S";

    pub fn clean(raw: &str) -> String {
        let replaced = raw.replace(" @ ", " ");
        match replaced.split_once('.') {
            Some((head, _)) => head.to_string(),
            None => replaced,
        }
    }
}

impl DateStrategy for NewsTimestampStrategy {
    fn name(&self) -> &str {
        "news_timestamp"
    }

    fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let cleaned = Self::clean(raw);
        NaiveDateTime::parse_from_str(&cleaned, Self::FORMAT).ok()
    }
}

/// Best-effort parse of common layouts, tried against the untouched string.
pub struct GenericStrategy {
    datetime_formats: Vec<&'static str>,
    date_formats: Vec<&'static str>,
}

impl GenericStrategy {
    pub fn new() -> Self {
        GenericStrategy {
            datetime_formats: vec![
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%d %H:%M",
                "%Y-%m-%dT%H:%M",
                "%Y/%m/%d %H:%M:%S",
                "%m/%d/%Y %H:%M:%S",
                "%m/%d/%Y %H:%M",
                "%B %d, %Y %H:%M:%S",
                "%B %d, %Y %H:%M",
                "%d %B %Y %H:%M:%S",
            ],
            date_formats: vec![
                "%Y-%m-%d",
                "%Y/%m/%d",
                "%m/%d/%Y",
                "%B %d, %Y",
                "%B %d %Y",
                "%d %B %Y",
            ],
        }
    }
}

impl Default for GenericStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DateStrategy for GenericStrategy {
    fn name(&self) -> &str {
        "generic"
    }

    fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let s = raw.trim();

        // Zoned forms keep their local wall-clock time
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_local());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.naive_local());
        }

        for fmt in &self.datetime_formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }

        self.date_formats
            .iter()
            .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .find_map(|d| d.and_hms_opt(0, 0, 0))
    }
}

// ============================================================================
// CHAIN
// ============================================================================

/// Ordered list of strategies; first match wins.
pub struct DateParserChain {
    strategies: Vec<Box<dyn DateStrategy>>,
}

impl DateParserChain {
    /// News format first, generic layouts second.
    pub fn new() -> Self {
        DateParserChain {
            strategies: vec![
                Box::new(NewsTimestampStrategy),
                Box::new(GenericStrategy::new()),
            ],
        }
    }

    /// Total: blank input and unknown layouts both give `None`.
    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        if raw.trim().is_empty() {
            return None;
        }
        self.strategies.iter().find_map(|s| {
            let dt = s.parse(raw)?;
            trace!(strategy = s.name(), raw, "parsed date");
            Some(dt)
        })
    }
}

impl Default for DateParserChain {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_clean_removes_separator_and_fraction() {
        assert_eq!(
            NewsTimestampStrategy::clean("Mar 3, 2018 @ 09:15:30.123"),
            "Mar 3, 2018 09:15:30"
        );
        assert_eq!(
            NewsTimestampStrategy::clean("Mar 3, 2018 09:15:30"),
            "Mar 3, 2018 09:15:30"
        );
    }

    #[test]
    fn test_news_format_with_separator() {
        let dt = NewsTimestampStrategy
            .parse("Jan 15, 2019 @ 14:03:22.120")
            .unwrap();
        assert_eq!(dt, ymd_hms(2019, 1, 15, 14, 3, 22));

        let chain = DateParserChain::new();
        assert_eq!(chain.parse("Jan 15, 2019 @ 14:03:22.120"), Some(dt));
    }

    #[test]
    fn test_news_format_single_digit_day() {
        let chain = DateParserChain::new();
        let dt = chain.parse("Jan 1, 2017 10:00:00").unwrap();
        assert_eq!(dt, ymd_hms(2017, 1, 1, 10, 0, 0));
    }

    #[test]
    fn test_generic_fallback_iso() {
        assert!(NewsTimestampStrategy.parse("2020-06-30 23:59:01").is_none());

        let chain = DateParserChain::new();
        let dt = chain.parse("2020-06-30 23:59:01").unwrap();
        assert_eq!(dt, ymd_hms(2020, 6, 30, 23, 59, 1));
    }

    #[test]
    fn test_generic_fallback_date_only() {
        let chain = DateParserChain::new();
        let dt = chain.parse("2018-02-14").unwrap();
        assert_eq!(dt.year(), 2018);
        assert_eq!(dt.hour(), 0);

        let dt = chain.parse("12/31/2016").unwrap();
        assert_eq!(dt, ymd_hms(2016, 12, 31, 0, 0, 0));
    }

    #[test]
    fn test_generic_long_month_name() {
        let chain = DateParserChain::new();
        let dt = chain.parse("March 5, 2021").unwrap();
        assert_eq!(dt, ymd_hms(2021, 3, 5, 0, 0, 0));
    }

    #[test]
    fn test_generic_rfc3339_keeps_wall_clock() {
        let chain = DateParserChain::new();
        let dt = chain.parse("2016-12-31T23:30:00-05:00").unwrap();
        assert_eq!(dt.year(), 2016);
        assert_eq!(dt.hour(), 23);
    }

    #[test]
    fn test_unparsable_is_none() {
        let chain = DateParserChain::new();
        assert!(chain.parse("").is_none());
        assert!(chain.parse("   ").is_none());
        assert!(chain.parse("not a date").is_none());
        assert!(chain.parse("Foo 99, 20x1 @ 25:61:00").is_none());
    }

    #[test]
    fn test_format_timestamp() {
        let dt = ymd_hms(2017, 1, 1, 10, 0, 0);
        assert_eq!(format_timestamp(&dt), "2017-01-01 10:00:00");
    }
}
