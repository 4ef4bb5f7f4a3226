//! Console and JSON rendering of summaries.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Ranked, ReportError, Summary};
use crate::worlds::WorldId;

/// Print the worlds about to be probed, `per_line` at a time.
pub fn write_progress<W: Write>(out: &mut W, worlds: &[WorldId], per_line: usize) -> io::Result<()> {
    writeln!(out, "Gathering latency data from worlds:")?;
    for line in worlds.chunks(per_line.max(1)) {
        let names: Vec<String> = line.iter().map(|w| w.to_string()).collect();
        writeln!(out, "{}", names.join(" "))?;
    }
    let plural = if worlds.len() == 1 { "" } else { "s" };
    writeln!(out, "\nWaiting for response{}...", plural)
}

/// Print the ranked report for one category.
pub fn write_summary<W: Write>(
    out: &mut W,
    title: &str,
    result: &Result<Summary, ReportError>,
) -> io::Result<()> {
    let header = format!("=============== {} ===============", title);
    writeln!(out, "\n{}", header)?;

    match result {
        Ok(summary) => {
            match &summary.best {
                Some(best) => {
                    writeln!(out, "\n\t\tAvg\tMin\tMax")?;
                    write_row(out, "Lowest", best)?;
                    if let Some(worst) = &summary.worst {
                        write_row(out, "Highest", worst)?;
                    }
                }
                None => writeln!(out, "\nNo worlds were probed")?,
            }
            for failed in &summary.failures {
                writeln!(out, "No response from {}: {}", failed.world, failed.cause)?;
            }
            if !summary.missing.is_empty() {
                writeln!(out, "Cancelled before {} worlds answered", summary.missing.len())?;
            }
        }
        Err(e) => {
            writeln!(out, "\nNo latency data: {}", e)?;
            let ReportError::AllProbesFailed { missing, .. } = e;
            if !missing.is_empty() {
                writeln!(out, "Cancelled before {} worlds answered", missing.len())?;
            }
        }
    }

    writeln!(out, "{}\n", "=".repeat(header.len()))
}

fn write_row<W: Write>(out: &mut W, label: &str, entry: &Ranked) -> io::Result<()> {
    writeln!(
        out,
        "{} ({}):\t{}ms\t{}ms\t{}ms",
        label, entry.world, entry.latency.average, entry.latency.minimum, entry.latency.maximum
    )
}

/// JSON form of one category's result.
#[derive(Debug, Serialize)]
pub struct CategoryReport<'a> {
    pub category: &'a str,
    pub measured_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: Option<&'a Summary>,
    pub error: Option<String>,
}

impl<'a> CategoryReport<'a> {
    pub fn new(category: &'a str, result: &'a Result<Summary, ReportError>) -> Self {
        let (summary, error) = match result {
            Ok(s) => (Some(s), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            category,
            measured_at: Utc::now(),
            summary,
            error,
        }
    }
}
