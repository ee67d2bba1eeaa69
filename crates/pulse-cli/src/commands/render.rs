//! `pulse render` - turn a results document into a standalone HTML report.

use std::path::Path;

use anyhow::{Context, Result};
use minijinja::{context, Environment};

use pulse_core::render::render_results;
use pulse_core::run::AnalysisResults;

const TEMPLATE: &str = include_str!("../report.html");

pub fn run(results_path: &Path, out: &Path) -> Result<()> {
    let text = std::fs::read_to_string(results_path)
        .with_context(|| format!("Failed to read {}", results_path.display()))?;
    let results: AnalysisResults = serde_json::from_str(&text)?;

    let html = render_report(&results)?;
    std::fs::write(out, html)?;
    println!("Report written to {}", out.display());
    Ok(())
}

fn render_report(results: &AnalysisResults) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("report", TEMPLATE)?;
    let html = env.get_template("report")?.render(context! {
        ppt => results.ppt,
        personas => render_results(results),
        generated_at => chrono::Utc::now().to_rfc3339(),
    })?;
    Ok(html)
}
