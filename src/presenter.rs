use std::io::Write;

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    errors::ScanError,
    report::{Finding, FindingsReport},
};

static LINE_RANGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+-\d+$").expect("invalid line-range pattern"));

/// Strict schema check applied in validated presentation mode: all three
/// fields non-empty and `line_range` matching `<start>-<end>`.
fn validate_finding(position: usize, finding: &Finding) -> Result<(), ScanError> {
    let reason = if finding.filename.is_empty() {
        Some("filename must not be empty")
    } else if !LINE_RANGE_PATTERN.is_match(&finding.line_range) {
        Some("line_range must have the form <start>-<end>")
    } else if finding.description.is_empty() {
        Some("description must not be empty")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ScanError::InvalidFinding { position, reason: reason.to_owned() }),
        None => Ok(()),
    }
}

/// Renders the report to `writer`, one numbered line per finding.
///
/// With `validate` set, every finding is checked against the strict schema
/// before anything is written, and findings are rendered through their
/// Display form. Without it, findings are rendered as compact JSON objects
/// and no validation happens.
pub fn present<W: Write>(
    writer: W,
    report: &FindingsReport,
    validate: bool,
) -> Result<(), ScanError> {
    if validate {
        for (index, finding) in report.findings.iter().enumerate() {
            validate_finding(index + 1, finding)?;
        }
    }
    render(writer, report, validate).context("failed to write scan results")?;
    Ok(())
}

fn render<W: Write>(mut writer: W, report: &FindingsReport, validated: bool) -> anyhow::Result<()> {
    let header = if validated {
        "Here are all the validated findings:"
    } else {
        "Here are all the JSON objects:"
    };
    writeln!(writer, "\n{header}")?;
    for (index, finding) in report.findings.iter().enumerate() {
        if validated {
            writeln!(writer, "{}) {}", index + 1, finding)?;
        } else {
            writeln!(writer, "{}) {}", index + 1, serde_json::to_string(finding)?)?;
        }
    }
    Ok(())
}
