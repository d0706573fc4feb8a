//! Markdown report generation
//!
//! This module generates human-readable markdown reports of scan results,
//! including scan metadata, statistics and the findings grouped by endpoint.

use crate::crawler::ScanReport;
use crate::extract::Finding;
use crate::output::stats::ScanStatistics;
use crate::output::traits::{OutputHandler, OutputResult};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Writes a markdown report to a file
pub struct MarkdownOutputHandler {
    path: PathBuf,
}

impl MarkdownOutputHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for MarkdownOutputHandler {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn write_report(&self, report: &ScanReport) -> OutputResult<()> {
        let markdown = format_markdown_report(report);

        let mut file = File::create(&self.path)?;
        file.write_all(markdown.as_bytes())?;

        Ok(())
    }
}

/// Formats a scan report as markdown
pub fn format_markdown_report(report: &ScanReport) -> String {
    let stats = ScanStatistics::from_report(report);
    let mut md = String::new();

    // Title
    md.push_str("# ParaXm Scan Report\n\n");

    // Scan metadata
    md.push_str("## Scan Information\n\n");
    md.push_str(&format!("- **Target**: {}\n", report.target));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.duration_seconds
    ));
    md.push_str(&format!("- **Config Hash**: {}\n\n", report.config_hash));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Parameters Found**: {}\n", stats.total_findings));
    md.push_str(&format!("- **Endpoints**: {}\n", stats.distinct_urls));
    md.push_str(&format!(
        "- **Distinct Parameter Names**: {}\n",
        stats.distinct_parameters
    ));
    md.push_str(&format!("- **Pages Visited**: {}\n", stats.pages_visited));
    md.push_str(&format!("- **Failed Pages**: {}\n", stats.total_errors()));
    md.push_str(&format!(
        "- **Fetch Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    // Source breakdown
    if !stats.findings_by_source.is_empty() {
        md.push_str("## Findings by Source\n\n");
        md.push_str("| Source | Count |\n");
        md.push_str("|--------|-------|\n");
        for (source, count) in &stats.findings_by_source {
            md.push_str(&format!("| {} | {} |\n", source, count));
        }
        md.push('\n');
    }

    // Page outcome breakdown
    if !stats.pages_by_state.is_empty() {
        md.push_str("## Page Outcomes\n\n");
        md.push_str("| State | Count |\n");
        md.push_str("|-------|-------|\n");
        for (state, count) in &stats.pages_by_state {
            md.push_str(&format!("| {} | {} |\n", state, count));
        }
        md.push('\n');
    }

    // Findings grouped by endpoint
    md.push_str("## Parameters\n\n");
    if report.findings.is_empty() {
        md.push_str("No parameters found.\n");
        return md;
    }

    for (url, findings) in group_by_url(&report.findings) {
        md.push_str(&format!("### {}\n\n", url));
        md.push_str("| Parameter | Source | Method | Status |\n");
        md.push_str("|-----------|--------|--------|--------|\n");
        for finding in findings {
            md.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                finding.parameter, finding.source, finding.method, finding.status_code
            ));
        }
        md.push('\n');
    }

    md
}

fn group_by_url(findings: &[Finding]) -> BTreeMap<&str, Vec<&Finding>> {
    let mut groups: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
    for finding in findings {
        groups.entry(finding.url.as_str()).or_default().push(finding);
    }
    groups
}
