use anyhow::Result;
use std::env;
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use news_star_report::{display_samples, run_analysis, run_combine, PipelineConfig};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = PipelineConfig::default();

    match args.get(1).map(String::as_str) {
        None => {
            combine_stage(&config);
            println!();
            analysis_stage(&config);
        }
        Some("combine") => combine_stage(&config),
        Some("analyze") => analysis_stage(&config),
        Some(other) => {
            eprintln!("❌ Unknown mode: {}", other);
            eprintln!("   Usage: news-star-report [combine|analyze]");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn combine_stage(config: &PipelineConfig) {
    println!("🗄️  Combine news CSVs");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if let Err(e) = run_combine(config) {
        println!("❌ Combine stage failed: {:#}", e);
    }
}

fn analysis_stage(config: &PipelineConfig) {
    println!("📊 Star rating analysis");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if let Err(e) = run_analysis(config) {
        println!("❌ Error: {:#}", e);
    }
    display_samples(config);
}
