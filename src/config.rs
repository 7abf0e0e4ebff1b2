// ⚙️ Pipeline Configuration
// Working directory, cutoff year, topic vocabulary and artifact names

use std::path::{Path, PathBuf};

// ============================================================================
// DEFAULTS
// ============================================================================

/// Minimum calendar year kept by the analysis stage
pub const DEFAULT_CUTOFF_YEAR: i32 = 2016;

/// Topic vocabulary scanned in article text (case-insensitive substring)
pub const DEFAULT_TOPICS: [&str; 9] = [
    "salud mental",
    "depresión",
    "ansiedad",
    "suicidio",
    "estrés",
    "psiquiatría",
    "psicología",
    "trastorno mental",
    "enfermedad mental",
];

pub const COMBINED_OUTPUT: &str = "combined_news_data.csv";
pub const ANALYSIS_INPUT: &str = "sentiment_analysis_results_clean.csv";
pub const COUNTRY_YEAR_OUTPUT: &str = "star_counts_by_country_year_pivot.csv";
pub const TOPIC_OUTPUT: &str = "star_counts_by_country_year_topic_pivot.csv";
pub const EXTREME_OUTPUT: &str = "extreme_ratings_1_and_5_stars.csv";

// ============================================================================
// PIPELINE CONFIG
// ============================================================================

/// Options for one pipeline run, with defaults and builder chaining.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub working_dir: PathBuf,
    pub cutoff_year: i32,
    pub topics: Vec<String>,

    // Artifact names, resolved against working_dir
    pub combined_output: String,
    pub analysis_input: String,
    pub country_year_output: String,
    pub topic_output: String,
    pub extreme_output: String,

    /// Rows printed per artifact by the reporter
    pub sample_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            working_dir: PathBuf::from("."),
            cutoff_year: DEFAULT_CUTOFF_YEAR,
            topics: DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
            combined_output: COMBINED_OUTPUT.to_string(),
            analysis_input: ANALYSIS_INPUT.to_string(),
            country_year_output: COUNTRY_YEAR_OUTPUT.to_string(),
            topic_output: TOPIC_OUTPUT.to_string(),
            extreme_output: EXTREME_OUTPUT.to_string(),
            sample_rows: 5,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_cutoff_year(mut self, year: i32) -> Self {
        self.cutoff_year = year;
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_analysis_input(mut self, name: impl Into<String>) -> Self {
        self.analysis_input = name.into();
        self
    }

    pub fn combined_path(&self) -> PathBuf {
        self.working_dir.join(&self.combined_output)
    }

    pub fn analysis_input_path(&self) -> PathBuf {
        self.working_dir.join(&self.analysis_input)
    }

    pub fn country_year_path(&self) -> PathBuf {
        self.working_dir.join(&self.country_year_output)
    }

    pub fn topic_path(&self) -> PathBuf {
        self.working_dir.join(&self.topic_output)
    }

    pub fn extreme_path(&self) -> PathBuf {
        self.working_dir.join(&self.extreme_output)
    }

    /// File names the pipeline itself reads or writes by name.
    /// Input discovery skips these so generated files are never re-ingested.
    pub fn reserved_file_names(&self) -> [&str; 5] {
        [
            &self.combined_output,
            &self.analysis_input,
            &self.country_year_output,
            &self.topic_output,
            &self.extreme_output,
        ]
    }
}
