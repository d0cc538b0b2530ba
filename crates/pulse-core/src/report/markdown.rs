//! Markdown report generation

use crate::findings::Finding;
use crate::{AnalysisRecord, Severity};
use chrono::Utc;
use std::fmt::Write;

pub fn generate(record: &AnalysisRecord, project_name: &str) -> String {
    let mut out = String::new();
    let summary = &record.results.summary;

    let _ = writeln!(out, "# CodePulse Analysis Report\n");

    let _ = writeln!(out, "## Project Information\n");
    let _ = writeln!(out, "- **Project Name:** {project_name}");
    let _ = writeln!(out, "- **Scan Type:** {}", record.scan_type);
    let _ = writeln!(
        out,
        "- **Analysis Date:** {}",
        record
            .created_at
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%d %H:%M:%S")
    );
    if record.results.analyzers_used.is_empty() {
        let _ = writeln!(out, "- **Analyzers Used:** Not specified");
    } else {
        let _ = writeln!(
            out,
            "- **Analyzers Used:** {}",
            record.results.analyzers_used.join(", ")
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Analysis Summary\n");
    let _ = writeln!(out, "| | |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Total Files Scanned | {} |", summary.total_files);
    let _ = writeln!(out, "| Total Issues Found | {} |", summary.issues_found);
    let _ = writeln!(
        out,
        "| Critical Issues | {} |",
        count_by_severity(&record.results.issues, Severity::Critical)
    );
    let _ = writeln!(
        out,
        "| High Issues | {} |",
        count_by_severity(&record.results.issues, Severity::High)
    );
    let _ = writeln!(
        out,
        "| Medium Issues | {} |",
        count_by_severity(&record.results.issues, Severity::Medium)
    );
    let _ = writeln!(
        out,
        "| Low Issues | {} |",
        count_by_severity(&record.results.issues, Severity::Low)
    );
    let _ = writeln!(out);

    if !record.results.issues.is_empty() {
        let _ = writeln!(out, "## Detected Issues\n");
        for (index, issue) in record.results.issues.iter().enumerate() {
            write_issue(&mut out, index + 1, issue);
        }
    }

    if !record.results.files.is_empty() {
        let _ = writeln!(out, "## Scanned Files\n");
        let _ = writeln!(out, "| File Path | Extension | Size (bytes) | Imports |");
        let _ = writeln!(out, "|---|---|---|---|");
        for file in &record.results.files {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                file.path,
                file.extension,
                file.size,
                file.imports.len()
            );
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "---\n*Generated by CodePulse on {}*",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    );

    out
}

fn write_issue(out: &mut String, number: usize, issue: &Finding) {
    let _ = writeln!(
        out,
        "### Issue #{number} - {}\n",
        issue.severity.to_string().to_uppercase()
    );
    let _ = writeln!(out, "- **File:** {}", issue.file);
    match issue.line {
        Some(line) => {
            let _ = writeln!(out, "- **Line:** {line}");
        }
        None => {
            let _ = writeln!(out, "- **Area:** Entire file");
        }
    }
    let _ = writeln!(out, "- **Problem:** {}", issue.description);
    if let Some(suggestion) = &issue.suggestion {
        if !suggestion.is_empty() {
            let _ = writeln!(out, "- **Solution:** {suggestion}");
        }
    }
    let _ = writeln!(out);
}

fn count_by_severity(issues: &[Finding], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::{EngineReport, EngineSummary};

    fn sample_record() -> AnalysisRecord {
        AnalysisRecord {
            id: Some("analysis-1".to_string()),
            project_id: "proj-1".to_string(),
            scan_type: "full".to_string(),
            results: EngineReport {
                project_path: "/workspace/demo".to_string(),
                scan_type: Some("full".to_string()),
                analyzers_used: vec!["security".to_string()],
                files: Vec::new(),
                issues: vec![
                    Finding {
                        issue_type: "sql_injection_risk".to_string(),
                        severity: Severity::Critical,
                        description: "Unparameterized query".to_string(),
                        file: "src/db.ts".to_string(),
                        line: Some(42),
                        suggestion: Some("Use prepared statements".to_string()),
                    },
                    Finding {
                        issue_type: "test_missing".to_string(),
                        severity: Severity::Medium,
                        description: "No tests for module".to_string(),
                        file: "src/api.ts".to_string(),
                        line: None,
                        suggestion: None,
                    },
                ],
                summary: EngineSummary {
                    total_files: 12,
                    issues_found: 2,
                    critical_issues: 1,
                    ..EngineSummary::default()
                },
                scanned_at: Utc::now(),
            },
            issues_count: 2,
            report_path: None,
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn renders_project_and_issue_sections() {
        let report = generate(&sample_record(), "Demo Project");

        assert!(report.contains("# CodePulse Analysis Report"));
        assert!(report.contains("**Project Name:** Demo Project"));
        assert!(report.contains("| Total Files Scanned | 12 |"));
        assert!(report.contains("### Issue #1 - CRITICAL"));
        assert!(report.contains("- **Line:** 42"));
        assert!(report.contains("- **Solution:** Use prepared statements"));
        assert!(report.contains("### Issue #2 - MEDIUM"));
        assert!(report.contains("- **Area:** Entire file"));
    }

    #[test]
    fn omits_issue_section_when_clean() {
        let mut record = sample_record();
        record.results.issues.clear();
        let report = generate(&record, "Demo Project");
        assert!(!report.contains("## Detected Issues"));
    }
}
