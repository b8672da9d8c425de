use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::autotrigger::RunSummary;

/// Writes the run summary as JSON, for consumption by later CI steps.
pub fn export_summary(summary: &RunSummary, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(summary)?
    } else {
        serde_json::to_string(summary)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

pub fn write_summary(summary: &RunSummary, pretty: bool, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
    export_summary(summary, pretty, &mut file)
        .with_context(|| format!("Failed to write summary file: {}", path.display()))
}
