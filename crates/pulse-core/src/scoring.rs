//! Severity-weighted category scoring
//!
//! Scores are linear and saturating: each finding subtracts a fixed
//! penalty from the category's maximum and the result is clamped at
//! zero, so a single critical issue in an otherwise clean category is
//! clearly visible. The overall score is the plain mean over category
//! scores, not weighted by issue count.

use crate::category::{classify, CATEGORY_CATALOG};
use crate::findings::Finding;
use crate::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MAX_IMPROVEMENTS: usize = 5;

/// Score card for one category in one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category_name: String,
    pub display_name: String,
    pub score: f64,
    pub max_score: u32,
    pub issue_count: u32,
    pub critical_issues: u32,
    pub warning_issues: u32,
    pub info_issues: u32,
    pub improvements: Vec<String>,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

impl CategoryScore {
    pub fn is_perfect(&self) -> bool {
        self.score == f64::from(self.max_score)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score a single category from its findings. An empty category is a
/// perfect score; penalties accumulate per finding and saturate at zero.
pub fn category_score(findings: &[&Finding], max_score: u32) -> f64 {
    if findings.is_empty() {
        return f64::from(max_score);
    }

    let penalty: f64 = findings.iter().map(|f| f.severity.penalty()).sum();
    round2((f64::from(max_score) - penalty).max(0.0))
}

/// Up to five improvement suggestions, deduplicated by exact text in
/// first-encounter order.
fn improvements(findings: &[&Finding]) -> Vec<String> {
    let mut seen = Vec::with_capacity(MAX_IMPROVEMENTS);
    for finding in findings {
        if seen.len() == MAX_IMPROVEMENTS {
            break;
        }
        if let Some(suggestion) = &finding.suggestion {
            if !suggestion.is_empty() && !seen.contains(suggestion) {
                seen.push(suggestion.clone());
            }
        }
    }
    seen
}

/// Compute one [`CategoryScore`] per catalog entry. Categories with no
/// findings still appear, at full score.
pub fn score_categories(issues: &[Finding]) -> Vec<CategoryScore> {
    let mut by_category: HashMap<&'static str, Vec<&Finding>> = HashMap::new();
    for issue in issues {
        by_category.entry(classify(&issue.issue_type)).or_default().push(issue);
    }

    let now = Utc::now();
    CATEGORY_CATALOG
        .iter()
        .map(|info| {
            let findings = by_category.remove(info.id).unwrap_or_default();
            let score = category_score(&findings, info.max_score);

            let mut critical = 0u32;
            let mut warning = 0u32;
            let mut informational = 0u32;
            for finding in &findings {
                match finding.severity {
                    Severity::Critical | Severity::High => critical += 1,
                    Severity::Medium => warning += 1,
                    Severity::Low => informational += 1,
                    Severity::Info => {}
                }
            }

            CategoryScore {
                category_name: info.id.to_string(),
                display_name: info.display_name.to_string(),
                score,
                max_score: info.max_score,
                issue_count: findings.len() as u32,
                critical_issues: critical,
                warning_issues: warning,
                info_issues: informational,
                improvements: improvements(&findings),
                icon: info.icon.to_string(),
                created_at: now,
            }
        })
        .collect()
}

/// Arithmetic mean of category scores, rounded to two decimals; zero
/// when there are no categories.
pub fn overall_score(scores: &[CategoryScore]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    let total: f64 = scores.iter().map(|s| s.score).sum();
    round2(total / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(issue_type: &str, severity: Severity, suggestion: Option<&str>) -> Finding {
        Finding {
            issue_type: issue_type.to_string(),
            severity,
            description: "test".to_string(),
            file: "src/main.ts".to_string(),
            line: None,
            suggestion: suggestion.map(str::to_string),
        }
    }

    #[test]
    fn empty_category_is_perfect() {
        assert_eq!(category_score(&[], 100), 100.0);
    }

    #[test]
    fn severity_weighted_penalties() {
        // critical + critical + medium => 100 - (15 + 15 + 5)
        let issues = [
            finding("sql_injection_risk", Severity::Critical, None),
            finding("xss_vulnerability", Severity::Critical, None),
            finding("https_missing", Severity::Medium, None),
        ];
        let refs: Vec<&Finding> = issues.iter().collect();
        assert_eq!(category_score(&refs, 100), 65.0);
    }

    #[test]
    fn score_saturates_at_zero() {
        let issues: Vec<Finding> = (0..10)
            .map(|_| finding("secret_exposure", Severity::Critical, None))
            .collect();
        let refs: Vec<&Finding> = issues.iter().collect();
        assert_eq!(category_score(&refs, 100), 0.0);
    }

    #[test]
    fn adding_a_critical_never_raises_the_score() {
        let base = [
            finding("sql_injection_risk", Severity::Low, None),
            finding("https_missing", Severity::Medium, None),
        ];
        let mut extended: Vec<Finding> = base.to_vec();
        extended.push(finding("secret_exposure", Severity::Critical, None));

        let base_refs: Vec<&Finding> = base.iter().collect();
        let ext_refs: Vec<&Finding> = extended.iter().collect();
        assert!(category_score(&ext_refs, 100) <= category_score(&base_refs, 100));
    }

    #[test]
    fn info_findings_carry_no_penalty() {
        let issues = [finding("sql_injection_risk", Severity::Info, None)];
        let refs: Vec<&Finding> = issues.iter().collect();
        assert_eq!(category_score(&refs, 100), 100.0);
    }

    #[test]
    fn all_catalog_categories_present_even_when_clean() {
        let scores = score_categories(&[]);
        assert_eq!(scores.len(), 9);
        assert!(scores.iter().all(|s| s.score == 100.0 && s.issue_count == 0));
        assert_eq!(overall_score(&scores), 100.0);
    }

    #[test]
    fn severity_buckets() {
        let issues = vec![
            finding("sql_injection_risk", Severity::Critical, None),
            finding("xss_vulnerability", Severity::High, None),
            finding("https_missing", Severity::Medium, None),
            finding("input_validation_missing", Severity::Low, None),
            finding("csrf_vulnerability", Severity::Info, None),
        ];
        let scores = score_categories(&issues);
        let security = scores.iter().find(|s| s.category_name == "security").unwrap();

        assert_eq!(security.issue_count, 5);
        assert_eq!(security.critical_issues, 2); // critical + high
        assert_eq!(security.warning_issues, 1);
        assert_eq!(security.info_issues, 1); // low; info has no bucket
    }

    #[test]
    fn unmapped_issue_types_score_against_code_quality() {
        let issues = vec![finding("mystery_issue", Severity::Critical, None)];
        let scores = score_categories(&issues);
        let quality = scores.iter().find(|s| s.category_name == "code_quality").unwrap();
        assert_eq!(quality.issue_count, 1);
        assert_eq!(quality.score, 85.0);
    }

    #[test]
    fn improvements_deduplicate_in_first_encounter_order() {
        let issues = vec![
            finding("sql_injection_risk", Severity::High, Some("Use prepared statements")),
            finding("sql_injection_risk", Severity::High, Some("Use prepared statements")),
            finding("xss_vulnerability", Severity::High, Some("Escape output")),
            finding("https_missing", Severity::Low, None),
            finding("csrf_vulnerability", Severity::Low, Some("")),
        ];
        let scores = score_categories(&issues);
        let security = scores.iter().find(|s| s.category_name == "security").unwrap();
        assert_eq!(
            security.improvements,
            vec!["Use prepared statements".to_string(), "Escape output".to_string()]
        );
    }

    #[test]
    fn improvements_cap_at_five() {
        let issues: Vec<Finding> = (0..8)
            .map(|i| {
                finding(
                    "sql_injection_risk",
                    Severity::Low,
                    Some(&format!("suggestion {i}")),
                )
            })
            .collect();
        let scores = score_categories(&issues);
        let security = scores.iter().find(|s| s.category_name == "security").unwrap();
        assert_eq!(security.improvements.len(), 5);
        assert_eq!(security.improvements[0], "suggestion 0");
    }

    #[test]
    fn overall_is_mean_of_categories() {
        let mut scores = score_categories(&[]);
        scores[0].score = 50.0;
        // 8 categories at 100 plus one at 50 => 850 / 9
        assert_eq!(overall_score(&scores), 94.44);
        assert_eq!(overall_score(&[]), 0.0);
    }
}
