//! Achievement evaluation
//!
//! Achievements are awarded at most once per (user, achievement type,
//! category). Candidate generation is pure; the caller supplies the
//! already-earned lookup so evaluation stays idempotent against
//! re-evaluation with the same inputs.

use crate::category::category_info;
use crate::scoring::CategoryScore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Achievement type awarded for reaching a 90+ category score
pub const ACHIEVEMENT_CATEGORY_MASTER: &str = "category_master";

const MASTERY_THRESHOLD: f64 = 90.0;

/// A persistent gamification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub project_id: String,
    pub achievement_type: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub earned_at: DateTime<Utc>,
}

fn mastery(user_id: &str, project_id: &str, score: &CategoryScore, now: DateTime<Utc>) -> Achievement {
    Achievement {
        id: None,
        user_id: user_id.to_string(),
        project_id: project_id.to_string(),
        achievement_type: ACHIEVEMENT_CATEGORY_MASTER.to_string(),
        category: score.category_name.clone(),
        title: format!("{} Master", score.display_name),
        description: format!("Achieved 90+ score in {}", score.display_name),
        icon: "🏆".to_string(),
        earned_at: now,
    }
}

fn perfect(user_id: &str, project_id: &str, score: &CategoryScore, now: DateTime<Utc>) -> Achievement {
    Achievement {
        id: None,
        user_id: user_id.to_string(),
        project_id: project_id.to_string(),
        achievement_type: format!("perfect_{}", score.category_name),
        category: score.category_name.clone(),
        title: format!("Perfect {}", score.display_name),
        description: format!("Achieved perfect score in {}!", score.display_name),
        icon: "🌟".to_string(),
        earned_at: now,
    }
}

/// All achievements the given scores qualify for, before any
/// already-earned filtering.
pub fn candidates(user_id: &str, project_id: &str, scores: &[CategoryScore]) -> Vec<Achievement> {
    let now = Utc::now();
    let mut out = Vec::new();

    for score in scores {
        if category_info(&score.category_name).is_none() {
            continue;
        }
        if score.score >= MASTERY_THRESHOLD {
            out.push(mastery(user_id, project_id, score, now));
        }
        if score.is_perfect() {
            out.push(perfect(user_id, project_id, score, now));
        }
    }

    out
}

/// Newly earned achievements for this run: candidates minus everything
/// the lookup reports as already earned for the exact
/// (user, achievement type, category) triple.
pub fn evaluate<F>(
    user_id: &str,
    project_id: &str,
    scores: &[CategoryScore],
    mut already_earned: F,
) -> Vec<Achievement>
where
    F: FnMut(&str, &str, &str) -> bool,
{
    candidates(user_id, project_id, scores)
        .into_iter()
        .filter(|a| !already_earned(&a.user_id, &a.achievement_type, &a.category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::score_categories;
    use std::collections::HashSet;

    fn scores_with(category: &str, value: f64) -> Vec<CategoryScore> {
        let mut scores = score_categories(&[]);
        for score in &mut scores {
            score.score = 0.0;
        }
        let entry = scores.iter_mut().find(|s| s.category_name == category).unwrap();
        entry.score = value;
        scores
    }

    #[test]
    fn mastery_awarded_at_threshold() {
        let scores = scores_with("security", 95.0);
        let earned = evaluate("user-1", "proj-1", &scores, |_, _, _| false);

        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].achievement_type, ACHIEVEMENT_CATEGORY_MASTER);
        assert_eq!(earned[0].category, "security");
        assert_eq!(earned[0].title, "Security Analysis Master");
    }

    #[test]
    fn below_threshold_earns_nothing() {
        let scores = scores_with("security", 89.99);
        assert!(evaluate("user-1", "proj-1", &scores, |_, _, _| false).is_empty());
    }

    #[test]
    fn perfect_score_earns_both_mastery_and_perfect() {
        let scores = scores_with("testing", 100.0);
        let earned = evaluate("user-1", "proj-1", &scores, |_, _, _| false);

        let types: Vec<&str> = earned.iter().map(|a| a.achievement_type.as_str()).collect();
        assert_eq!(types, vec![ACHIEVEMENT_CATEGORY_MASTER, "perfect_testing"]);
        assert_eq!(earned[1].icon, "🌟");
    }

    #[test]
    fn evaluation_is_idempotent() {
        let scores = scores_with("security", 95.0);

        let mut recorded: HashSet<(String, String, String)> = HashSet::new();
        let first = evaluate("user-1", "proj-1", &scores, |u, t, c| {
            recorded.contains(&(u.to_string(), t.to_string(), c.to_string()))
        });
        assert_eq!(first.len(), 1);

        for achievement in &first {
            recorded.insert((
                achievement.user_id.clone(),
                achievement.achievement_type.clone(),
                achievement.category.clone(),
            ));
        }

        let second = evaluate("user-1", "proj-1", &scores, |u, t, c| {
            recorded.contains(&(u.to_string(), t.to_string(), c.to_string()))
        });
        assert!(second.is_empty());
    }

    #[test]
    fn lookup_is_scoped_per_category() {
        let mut scores = scores_with("security", 95.0);
        let testing = scores.iter_mut().find(|s| s.category_name == "testing").unwrap();
        testing.score = 92.0;

        // security mastery already earned, testing not
        let earned = evaluate("user-1", "proj-1", &scores, |_, t, c| {
            t == ACHIEVEMENT_CATEGORY_MASTER && c == "security"
        });

        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].category, "testing");
    }
}
