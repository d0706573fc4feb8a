//! Fuzzing template list
//!
//! One line per finding in the form `<url>?<parameter>=FUZZ`, ready to be fed
//! to a fuzzer.

use crate::crawler::ScanReport;
use crate::extract::Finding;
use crate::output::traits::{OutputHandler, OutputResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Writes the fuzzing template list to a file
pub struct TextOutputHandler {
    path: PathBuf,
}

impl TextOutputHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for TextOutputHandler {
    fn name(&self) -> &'static str {
        "text"
    }

    fn write_report(&self, report: &ScanReport) -> OutputResult<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(format_fuzz_list(&report.findings).as_bytes())?;
        writer.flush()?;

        tracing::debug!(
            "Wrote {} lines to {}",
            report.findings.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Formats findings as newline-terminated fuzzing template lines
pub fn format_fuzz_list(findings: &[Finding]) -> String {
    let mut out = String::new();
    for finding in findings {
        out.push_str(&finding.fuzz_line());
        out.push('\n');
    }
    out
}
