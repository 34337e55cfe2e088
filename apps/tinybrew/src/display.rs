//! Output rendering and formatting

use console::style;
use serde::Serialize;
use std::io;
use tinybrew_types::{BuildPhase, BuildReport, VerifyReport};

/// Result of an executed command, rendered after the event stream ends
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OperationResult {
    Build(BuildReport),
    Verify(VerifyReport),
    RecipeValid(RecipeSummary),
}

/// Summary of a validated recipe
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub name: String,
    pub description: String,
    pub license: String,
    pub source: String,
    pub pinned_version: Option<String>,
    pub entrypoint: String,
}

/// Output renderer for CLI results
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Whether styled output is enabled
    colors_enabled: bool,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        Self {
            json_output,
            colors_enabled,
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            OperationResult::Build(report) => self.render_build_report(report),
            OperationResult::Verify(report) => self.render_verify_report(report),
            OperationResult::RecipeValid(summary) => self.render_recipe_summary(summary),
        }
        Ok(())
    }

    fn render_build_report(&self, report: &BuildReport) {
        let headline = format!(
            "{} {} -> {}",
            report.package,
            report.version,
            report.binary_path.display()
        );
        if self.colors_enabled {
            println!("{}", style(headline).green().bold());
        } else {
            println!("{headline}");
        }
        println!("  Build: {}ms", report.build_ms);
        match report.verify_ms {
            Some(ms) => println!("  Verify: {ms}ms"),
            None if report.phase == BuildPhase::Built => {
                println!("  Verify: skipped");
            }
            None => {}
        }
    }

    fn render_verify_report(&self, report: &VerifyReport) {
        let headline = format!(
            "{} reports {}",
            report.binary_path.display(),
            report.expected
        );
        if self.colors_enabled {
            println!("{}", style(headline).green().bold());
        } else {
            println!("{headline}");
        }
        print!("{}", report.output);
        if !report.output.ends_with('\n') {
            println!();
        }
    }

    fn render_recipe_summary(&self, summary: &RecipeSummary) {
        println!("{} ({})", summary.name, summary.license);
        println!("  {}", summary.description);
        println!("  Source: {}", summary.source);
        if let Some(version) = &summary.pinned_version {
            println!("  Pinned version: {version}");
        } else {
            println!("  Rolling build (pseudo-version at build time)");
        }
        println!("  Entrypoint: {}", summary.entrypoint);
    }
}
