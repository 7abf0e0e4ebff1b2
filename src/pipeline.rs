// 🚰 Pipeline - stage wiring
// combine: discover → load → combine → write
// analyze: year filter → reports → summary

use crate::aggregator::{run_reports, ReportOutcome, TopicMatcher};
use crate::combiner::{
    combine, print_date_samples, print_debug_notes, write_combined, CombineSummary,
};
use crate::config::PipelineConfig;
use crate::dates::DateParserChain;
use crate::loader::{discover_input_files, load_all};
use crate::reporter::display_sample;
use crate::year_filter::filter_by_year;
use anyhow::Result;
use std::collections::BTreeSet;
use tracing::info;

/// Rows shown in the date comparison sample after combining
pub const DATE_SAMPLE_ROWS: usize = 5;

// ============================================================================
// COMBINE STAGE
// ============================================================================

/// Load every input file and write the combined dataset.
///
/// `Ok(None)` means the stage halted without output: no candidate files,
/// or none passed validation.
pub fn run_combine(config: &PipelineConfig) -> Result<Option<CombineSummary>> {
    let files = discover_input_files(config)?;
    if files.is_empty() {
        println!(
            "No CSV files found in {}.",
            config.working_dir.display()
        );
        return Ok(None);
    }

    println!("📂 Found {} CSV files:", files.len());
    for file in &files {
        println!("  - {}", file.display());
    }

    let chain = DateParserChain::new();
    let outcome = load_all(&files, &chain);
    let total_processed = outcome.total_rows();
    let notes = outcome.debug_notes.clone();

    if outcome.accepted.is_empty() {
        println!("\n❌ No valid CSV files could be processed.");
        print_debug_notes(&notes);
        return Ok(None);
    }

    println!("\n🔗 Combining {} files...", outcome.accepted.len());
    let records = combine(outcome);

    let output = config.combined_path();
    println!("💾 Saving combined data to {}...", output.display());
    write_combined(&output, &records)?;
    info!(rows = records.len(), path = %output.display(), "combined dataset written");

    let summary = CombineSummary::from_records(total_processed, &records);
    summary.print(&output);
    print_debug_notes(&notes);
    print_date_samples(&records, DATE_SAMPLE_ROWS);

    Ok(Some(summary))
}

// ============================================================================
// ANALYSIS STAGE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub original_rows: usize,
    pub kept_rows: usize,
    pub year_span: Option<(i32, i32)>,
    pub countries: Vec<String>,
    pub reports: ReportOutcome,
}

impl AnalysisSummary {
    pub fn print(&self) {
        if self.reports.all_succeeded() {
            println!("\n✅ All files generated successfully!");
        } else {
            println!("\n⚠️  Some reports could not be generated (see errors above)");
        }
        match self.year_span {
            Some((min, max)) => println!("Years covered: {} - {}", min, max),
            None => println!("Years covered: none"),
        }
        println!("Countries: {}", self.countries.len());
        println!("Unique countries: {:?}", self.countries);
    }
}

/// Filter the scored dataset by year and generate the three reports.
///
/// Fails only when the input cannot be read as a whole; report-level
/// failures are recorded in `AnalysisSummary::reports`.
pub fn run_analysis(config: &PipelineConfig) -> Result<AnalysisSummary> {
    println!("🚀 Starting analysis with cutoff year: {}", config.cutoff_year);
    println!("{}", "=".repeat(50));

    let chain = DateParserChain::new();
    let filtered = filter_by_year(&config.analysis_input_path(), config.cutoff_year, &chain)?;
    filtered.print();

    let matcher = TopicMatcher::new(&config.topics);
    let reports = run_reports(
        &filtered.records,
        &matcher,
        &config.country_year_path(),
        &config.topic_path(),
        &config.extreme_path(),
    );

    let records = &filtered.records;
    let year_span = records
        .iter()
        .map(|r| r.year)
        .min()
        .zip(records.iter().map(|r| r.year).max());
    let countries: BTreeSet<&str> = records
        .iter()
        .map(|r| r.country.as_str())
        .filter(|c| !c.is_empty())
        .collect();

    let summary = AnalysisSummary {
        original_rows: filtered.original_rows,
        kept_rows: records.len(),
        year_span,
        countries: countries.into_iter().map(String::from).collect(),
        reports,
    };
    summary.print();

    Ok(summary)
}

/// Print the head of each report artifact
pub fn display_samples(config: &PipelineConfig) {
    println!("\n{}", "=".repeat(50));
    println!("Sample outputs:");
    for path in [
        config.country_year_path(),
        config.topic_path(),
        config.extreme_path(),
    ] {
        display_sample(&path, config.sample_rows);
    }
}
