// News Star Report - Core Library
// Combine scraped news CSVs, then build star-rating reports by year, country and topic

pub mod config;
pub mod dates;
pub mod record;
pub mod loader;
pub mod combiner;
pub mod year_filter;
pub mod aggregator;
pub mod reporter;
pub mod pipeline;

// Re-export commonly used types
pub use config::{PipelineConfig, DEFAULT_CUTOFF_YEAR, DEFAULT_TOPICS};
pub use dates::{DateParserChain, DateStrategy, GenericStrategy, NewsTimestampStrategy};
pub use record::{
    AnalysisRecord, CombinedRow, CountryYearRow, ExtremeRow, NewsRecord, TopicRow,
};
pub use loader::{discover_input_files, load_all, load_file, FileLoad, FileReport, LoadOutcome};
pub use combiner::{combine, write_combined, CombineSummary};
pub use year_filter::{filter_by_year, YearFilterOutcome};
pub use aggregator::{
    country_year_pivot, extreme_ratings, run_reports, topic_pivot, ReportOutcome, StarCounts,
    TopicMatcher,
};
pub use reporter::display_sample;
pub use pipeline::{display_samples, run_analysis, run_combine, AnalysisSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
