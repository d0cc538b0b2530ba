//! CodePulse Core Scoring Engine
//!
//! This crate turns raw findings from the analysis engine into weighted
//! category scores, evaluates gamified achievements, and renders report
//! artifacts. Everything here is pure computation; all I/O lives in the
//! API crate.

pub mod achievements;
pub mod category;
pub mod findings;
pub mod messages;
pub mod report;
pub mod scoring;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use achievements::{Achievement, ACHIEVEMENT_CATEGORY_MASTER};
pub use category::{category_info, classify, CategoryInfo, CATEGORY_CATALOG, DEFAULT_CATEGORY};
pub use findings::{EngineReport, EngineSummary, Finding};
pub use scoring::{overall_score, score_categories, CategoryScore};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Severity levels as emitted by the analysis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Points subtracted from a category's score per finding
    pub fn penalty(self) -> f64 {
        match self {
            Severity::Critical => 15.0,
            Severity::High => 10.0,
            Severity::Medium => 5.0,
            Severity::Low => 2.0,
            Severity::Info => 0.0,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Supported scan kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Full,
    Dependency,
    Pattern,
}

impl ScanType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(ScanType::Full),
            "dependency" => Some(ScanType::Dependency),
            "pattern" => Some(ScanType::Pattern),
            _ => None,
        }
    }

    pub fn all() -> &'static [&'static str] {
        &["full", "dependency", "pattern"]
    }
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanType::Full => write!(f, "full"),
            ScanType::Dependency => write!(f, "dependency"),
            ScanType::Pattern => write!(f, "pattern"),
        }
    }
}

/// Lifecycle status of an analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One complete analysis run. Built by the orchestrator, immutable once
/// persisted; a new run always produces a new record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub project_id: String,
    pub scan_type: ScanType,
    pub total_files: u32,
    pub total_issues: u32,
    pub critical_issues: u32,
    pub overall_score: f64,
    pub category_scores: Vec<CategoryScore>,
    pub scan_duration_ms: u64,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
}

/// A stored engine report together with its project linkage, as kept in
/// the `analysis_results` collection and rendered into report artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub project_id: String,
    pub scan_type: String,
    pub results: EngineReport,
    pub issues_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
