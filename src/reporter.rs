// 🖨️ Reporter
// Read generated artifacts back and print their first rows

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::path::Path;

/// Wider cells are cut and end with "..."
pub const MAX_CELL_WIDTH: usize = 50;

fn truncate_cell(cell: &str) -> String {
    let cell = cell.replace(['\n', '\r'], " ");
    if cell.chars().count() <= MAX_CELL_WIDTH {
        return cell;
    }
    let head: String = cell.chars().take(MAX_CELL_WIDTH - 3).collect();
    format!("{}...", head)
}

/// Right-aligned plain-text table, one line per row, header first.
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let headers: Vec<String> = headers.iter().map(|h| truncate_cell(h)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| truncate_cell(c)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:>width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut lines = vec![render(&headers)];
    lines.extend(rows.iter().map(|row| render(row)));
    lines.join("\n")
}

/// Header and first `n` rows of a CSV artifact, formatted for the console.
pub fn sample_table(path: &Path, n: usize) -> Result<String> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records().take(n) {
        let record = result.with_context(|| format!("Failed to read {}", path.display()))?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(format_table(&headers, &rows))
}

/// Print a sample; failures are reported and swallowed.
pub fn display_sample(path: &Path, n: usize) {
    let name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("artifact");

    match sample_table(path, n) {
        Ok(table) => {
            println!("\nFirst {} rows of {}:", n, name);
            println!("{}", table);
        }
        Err(e) => println!("\n⚠️  Could not display sample from {}: {:#}", name, e),
    }
}
