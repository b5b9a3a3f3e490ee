use std::{fmt, fs, io, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{errors::ScanError, util};

/// Fixed name of the normalized report, written next to the raw one.
pub const NORMALIZED_REPORT_FILE: &str = "custom_output_test.json";

/// One record of gitleaks' native report. Tool-specific metadata fields
/// (rule id, secret text, entropy, ...) are not consumed and are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawFinding {
    pub file: String,
    pub start_line: u64,
    pub end_line: u64,
    pub description: String,
}

/// The two raw report shapes gitleaks produces: a bare array of findings, or
/// an object wrapping one under a `findings` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawReport {
    Wrapped { findings: Vec<RawFinding> },
    Bare(Vec<RawFinding>),
}

impl RawReport {
    fn into_findings(self) -> Vec<RawFinding> {
        match self {
            RawReport::Wrapped { findings } => findings,
            RawReport::Bare(findings) => findings,
        }
    }
}

/// A normalized finding. `line_range` always has the form `<start>-<end>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub filename: String,
    pub line_range: String,
    pub description: String,
}

impl From<RawFinding> for Finding {
    fn from(raw: RawFinding) -> Self {
        Finding {
            filename: raw.file,
            line_range: format!("{}-{}", raw.start_line, raw.end_line),
            description: raw.description,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "filename={:?} line_range={:?} description={:?}",
            self.filename, self.line_range, self.description
        )
    }
}

/// The normalized report shape persisted for downstream consumers.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsReport {
    pub findings: Vec<Finding>,
}

/// Reads the raw report at `<directory>/<raw_filename>` and maps every raw
/// finding into the normalized shape, preserving the raw report's order.
///
/// With `persist` set, the result is also written to
/// `<directory>/`[`NORMALIZED_REPORT_FILE`] as 4-space-indented JSON,
/// overwriting any previous report.
pub fn normalize(
    directory: &Path,
    raw_filename: &str,
    persist: bool,
) -> Result<FindingsReport, ScanError> {
    let raw_path = directory.join(raw_filename);
    let contents = match fs::read_to_string(&raw_path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ScanError::ReportNotFound { path: raw_path });
        }
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context(format!("failed to read report file {}", raw_path.display()))
                .into());
        }
    };
    let raw: RawReport = serde_json::from_str(&contents)
        .map_err(|source| ScanError::ReportMalformed { path: raw_path.clone(), source })?;

    let findings = raw.into_findings().into_iter().map(Finding::from).collect();
    let report = FindingsReport { findings };

    if persist {
        let out_path = directory.join(NORMALIZED_REPORT_FILE);
        util::write_json_pretty(&out_path, &report).with_context(|| {
            format!("failed to write normalized report to {}", out_path.display())
        })?;
        debug!("normalized report written to {}", out_path.display());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::TempDir;

    use super::*;

    const WRAPPED_FIXTURE: &str =
        r#"{"findings":[{"File":"a.py","StartLine":1,"EndLine":2,"Description":"x"}]}"#;
    const BARE_FIXTURE: &str = r#"[{"File":"a.py","StartLine":1,"EndLine":2,"Description":"x"}]"#;

    fn write_report(dir: &TempDir, contents: &str) {
        std::fs::write(dir.path().join("output_test.json"), contents).unwrap();
    }

    fn expected_single_finding() -> FindingsReport {
        FindingsReport {
            findings: vec![Finding {
                filename: "a.py".into(),
                line_range: "1-2".into(),
                description: "x".into(),
            }],
        }
    }

    #[test]
    fn test_normalize_wrapped_report() -> Result<()> {
        let dir = TempDir::new()?;
        write_report(&dir, WRAPPED_FIXTURE);
        let report = normalize(dir.path(), "output_test.json", false)?;
        assert_eq!(report, expected_single_finding());
        Ok(())
    }

    #[test]
    fn test_normalize_bare_array_report() -> Result<()> {
        let dir = TempDir::new()?;
        write_report(&dir, BARE_FIXTURE);
        let report = normalize(dir.path(), "output_test.json", false)?;
        assert_eq!(report, expected_single_finding());
        Ok(())
    }

    #[test]
    fn test_line_range_formatting() {
        for (start, end) in [(1u64, 2u64), (10, 10), (999, 1000), (0, 7)] {
            let raw = RawFinding {
                file: "f".into(),
                start_line: start,
                end_line: end,
                description: "d".into(),
            };
            assert_eq!(Finding::from(raw).line_range, format!("{start}-{end}"));
        }
    }

    #[test]
    fn test_normalize_preserves_raw_order() -> Result<()> {
        let dir = TempDir::new()?;
        write_report(
            &dir,
            r#"[
                {"File":"b.py","StartLine":1,"EndLine":1,"Description":"first"},
                {"File":"a.py","StartLine":2,"EndLine":2,"Description":"second"},
                {"File":"c.py","StartLine":3,"EndLine":3,"Description":"third"}
            ]"#,
        );
        let report = normalize(dir.path(), "output_test.json", false)?;
        let filenames: Vec<&str> = report.findings.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(filenames, ["b.py", "a.py", "c.py"]);
        Ok(())
    }

    #[test]
    fn test_normalize_ignores_extra_metadata_fields() -> Result<()> {
        let dir = TempDir::new()?;
        write_report(
            &dir,
            r#"[{"File":"a.py","StartLine":3,"EndLine":4,"Description":"aws key",
                "Secret":"AKIA1234","RuleID":"aws-access-key","Entropy":3.2}]"#,
        );
        let report = normalize(dir.path(), "output_test.json", false)?;
        assert_eq!(report.findings[0].line_range, "3-4");
        assert_eq!(report.findings[0].description, "aws key");
        Ok(())
    }

    #[test]
    fn test_normalize_persists_empty_report_with_exact_layout() -> Result<()> {
        let dir = TempDir::new()?;
        write_report(&dir, "[]");
        let report = normalize(dir.path(), "output_test.json", true)?;
        assert!(report.findings.is_empty());

        let persisted = std::fs::read_to_string(dir.path().join(NORMALIZED_REPORT_FILE))?;
        assert_eq!(persisted, "{\n    \"findings\": []\n}");
        Ok(())
    }

    #[test]
    fn test_normalize_persisted_report_round_trips() -> Result<()> {
        let dir = TempDir::new()?;
        write_report(&dir, WRAPPED_FIXTURE);
        std::fs::write(dir.path().join(NORMALIZED_REPORT_FILE), "stale")?;

        let report = normalize(dir.path(), "output_test.json", true)?;
        let persisted: FindingsReport = serde_json::from_str(&std::fs::read_to_string(
            dir.path().join(NORMALIZED_REPORT_FILE),
        )?)?;
        assert_eq!(persisted, report);
        Ok(())
    }

    #[test]
    fn test_normalize_missing_report_file() {
        let dir = TempDir::new().unwrap();
        let err = normalize(dir.path(), "output_test.json", false).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        match err {
            ScanError::ReportNotFound { path } => assert!(path.ends_with("output_test.json")),
            other => panic!("expected ReportNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_malformed_report() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, "{ not json");
        let err = normalize(dir.path(), "output_test.json", false).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(matches!(err, ScanError::ReportMalformed { .. }));
    }

    #[test]
    fn test_normalize_rejects_finding_with_missing_field() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, r#"[{"File":"a.py","StartLine":1}]"#);
        let err = normalize(dir.path(), "output_test.json", false).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(matches!(err, ScanError::ReportMalformed { .. }));
    }

    #[test]
    fn test_finding_display_is_stable() {
        let finding = Finding {
            filename: "a.py".into(),
            line_range: "1-2".into(),
            description: "x".into(),
        };
        assert_eq!(
            finding.to_string(),
            r#"filename="a.py" line_range="1-2" description="x""#
        );
    }
}
