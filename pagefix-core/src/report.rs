use crate::apply::{Change, Status};
use crate::mode::Mode;
use crate::scanner::Stats;
use nu_ansi_term::Color as AnsiColor;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;

/// Format of the change list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid report format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub would_rename: usize,
    pub renamed: usize,
    pub declined: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Result of one run over a set of paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub mode: Mode,
    pub changes: Vec<Change>,
    pub stats: Stats,
}

impl RunResult {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for change in &self.changes {
            match change.status {
                Status::WouldRename => summary.would_rename += 1,
                Status::Renamed => summary.renamed += 1,
                Status::Declined => summary.declined += 1,
                Status::Skipped(_) => summary.skipped += 1,
                Status::Failed(_) => summary.failed += 1,
                Status::Pending => {},
            }
        }
        summary
    }
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Json => self.format_json(),
            ReportFormat::Text => self.format_text(),
        }
    }
    fn format_json(&self) -> String;
    fn format_text(&self) -> String;
}

impl OutputFormatter for RunResult {
    fn format_json(&self) -> String {
        let summary = self.summary();
        let changes: Vec<_> = self
            .changes
            .iter()
            .map(|change| {
                json!({
                    "location": change.proposal.location.to_string(),
                    "from": change.proposal.from,
                    "to": change.proposal.to,
                    "convention": change.proposal.convention,
                    "status": change.status.key(),
                    "reason": change.status.reason(),
                })
            })
            .collect();

        let mut output = serde_json::to_string_pretty(&json!({
            "mode": self.mode,
            "summary": summary,
            "stats": self.stats,
            "changes": changes,
        }))
        .unwrap_or_default();
        output.push('\n');
        output
    }

    /// One line per change, in scan order. Empty when nothing matched.
    fn format_text(&self) -> String {
        let mut output = String::new();
        for change in &self.changes {
            let proposal = &change.proposal;
            match change.status.reason() {
                Some(reason) => writeln!(
                    output,
                    "{}: {} -> {} ({})",
                    change.status, proposal.location, proposal.to, reason
                ),
                None => writeln!(
                    output,
                    "{}: {} -> {}",
                    change.status, proposal.location, proposal.to
                ),
            }
            .unwrap();
        }
        output
    }
}

/// A one-line tally for stderr.
pub fn render_summary_line(result: &RunResult, use_color: bool) -> String {
    let summary = result.summary();
    let mut parts = Vec::new();

    match result.mode {
        Mode::DryRun => parts.push(format!("{} would be renamed", summary.would_rename)),
        Mode::Apply | Mode::Interactive => parts.push(format!("{} renamed", summary.renamed)),
    }
    if summary.declined > 0 {
        parts.push(format!("{} declined", summary.declined));
    }
    if summary.skipped > 0 {
        parts.push(format!("{} skipped", summary.skipped));
    }
    if summary.failed > 0 {
        let failed = format!("{} failed", summary.failed);
        parts.push(if use_color {
            AnsiColor::Red.bold().paint(failed).to_string()
        } else {
            failed
        });
    }

    format!(
        "Scanned {} files: {}",
        result.stats.files_scanned,
        parts.join(", ")
    )
}
