//! Engine report model
//!
//! The analysis engine is an external executable; it prints one JSON
//! document on stdout describing every file it scanned and every issue it
//! found. These types define that wire format. Anything that fails to
//! decode into them is treated as a hard engine failure upstream.

use crate::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single issue detected by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: Severity,
    pub description: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A file visited during the scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub size: u64,
}

/// Aggregate counters from one engine invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSummary {
    pub total_files: u32,
    #[serde(default)]
    pub js_files: u32,
    #[serde(default)]
    pub ts_files: u32,
    pub issues_found: u32,
    pub critical_issues: u32,
    #[serde(default)]
    pub missing_files: u32,
}

/// Complete output of one engine invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineReport {
    pub project_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_type: Option<String>,
    #[serde(default)]
    pub analyzers_used: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub issues: Vec<Finding>,
    pub summary: EngineSummary,
    #[serde(default = "Utc::now")]
    pub scanned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_full_report() {
        let raw = r#"{
            "project_path": "/workspace/demo",
            "analyzers_used": ["security", "testing"],
            "files": [
                {"path": "src/app.ts", "name": "app.ts", "extension": ".ts", "imports": ["react"], "size": 1024}
            ],
            "issues": [
                {
                    "type": "sql_injection_risk",
                    "severity": "critical",
                    "description": "Unparameterized query",
                    "file": "src/db.ts",
                    "line": 42,
                    "suggestion": "Use prepared statements"
                }
            ],
            "summary": {"total_files": 1, "issues_found": 1, "critical_issues": 1},
            "scanned_at": "2025-06-01T12:00:00Z"
        }"#;

        let report: EngineReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Critical);
        assert_eq!(report.issues[0].line, Some(42));
        assert_eq!(report.summary.total_files, 1);
    }

    #[test]
    fn optional_fields_default() {
        let raw = r#"{
            "project_path": "/workspace/demo",
            "issues": [
                {"type": "test_missing", "severity": "medium", "description": "No tests", "file": "src/lib.rs"}
            ],
            "summary": {"total_files": 3, "issues_found": 1, "critical_issues": 0}
        }"#;

        let report: EngineReport = serde_json::from_str(raw).unwrap();
        assert!(report.files.is_empty());
        assert!(report.analyzers_used.is_empty());
        assert_eq!(report.issues[0].line, None);
        assert_eq!(report.issues[0].suggestion, None);
    }

    #[test]
    fn rejects_unknown_severity() {
        let raw = r#"{"type": "x", "severity": "catastrophic", "description": "d", "file": "f"}"#;
        assert!(serde_json::from_str::<Finding>(raw).is_err());
    }
}
