use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, Table};

use crate::autotrigger::{ProjectOutcome, RunSummary, TagMatch};

use super::styling::{dim, failure, project, success, warning};

pub fn print_project_header(label: &str) {
    println!("\n{} {}", project("▶"), project(label));
}

pub fn print_detail(text: &str) {
    println!("  {}", dim(text));
}

/// Prints the one-line verdict for a project. Failures go to stderr.
pub fn print_outcome(outcome: &ProjectOutcome) {
    match outcome {
        ProjectOutcome::UpToDate { matched, .. } => {
            let how = match matched {
                TagMatch::Exact => "",
                TagMatch::Prefix => " (prefix match)",
            };
            println!("  {}", success(format!("☑️  All up to date{how}")));
        }
        ProjectOutcome::PipelineRunning { running, .. } => {
            println!(
                "  {}",
                warning(format!("⏳ {running} pipeline(s) still running, skipping"))
            );
        }
        ProjectOutcome::Triggered { web_url, .. } => {
            println!("  {}", success(format!("🆕 New build started at {web_url}")));
        }
        ProjectOutcome::DryRun { ref_, variables, .. } => {
            let vars = variables
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "  {}",
                warning(format!("🆕 Would start a build on {ref_} with {vars}"))
            );
        }
        ProjectOutcome::Failed { reason, .. } => {
            eprintln!("  {} {reason}", failure("✗ Failed:"));
        }
    }
}

// Rows are never wrapped: the table mostly ends up in CI logs.
fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table
}

fn outcome_cells(outcome: &ProjectOutcome) -> (String, Cell, String) {
    match outcome {
        ProjectOutcome::UpToDate { tag, matched } => (
            tag.clone(),
            Cell::new("up to date").fg(TableColor::Green),
            match matched {
                TagMatch::Exact => "exact tag published".to_string(),
                TagMatch::Prefix => "tag published with suffix".to_string(),
            },
        ),
        ProjectOutcome::PipelineRunning { tag, running } => (
            tag.clone(),
            Cell::new("skipped").fg(TableColor::Yellow),
            format!("{running} pipeline(s) running"),
        ),
        ProjectOutcome::Triggered { tag, web_url } => (
            tag.clone(),
            Cell::new("triggered").fg(TableColor::Cyan),
            web_url.clone(),
        ),
        ProjectOutcome::DryRun { tag, ref_, .. } => (
            tag.clone(),
            Cell::new("dry run").fg(TableColor::Yellow),
            format!("would trigger on {ref_}"),
        ),
        ProjectOutcome::Failed { kind, reason } => (
            "-".to_string(),
            Cell::new(format!("failed ({kind})")).fg(TableColor::Red),
            reason.clone(),
        ),
    }
}

/// Renders one row per project with its tag and verdict.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut table = create_table();
    table.set_header(
        ["GitHub", "GitLab", "Tag", "Result", "Details"]
            .into_iter()
            .map(|label| Cell::new(label).fg(TableColor::Cyan)),
    );

    for report in &summary.projects {
        let (tag, result, details) = outcome_cells(&report.outcome);
        table.add_row(vec![
            Cell::new(&report.github_repo),
            Cell::new(&report.gitlab_project),
            Cell::new(tag),
            result,
            Cell::new(details),
        ]);
    }

    table.to_string()
}

pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", render_summary(summary));

    let failures = summary.failures();
    if failures == 0 {
        println!("{}", success("All projects processed"));
    } else {
        eprintln!(
            "{}",
            failure(format!(
                "{failures} of {} project(s) failed",
                summary.projects.len()
            ))
        );
    }
}
