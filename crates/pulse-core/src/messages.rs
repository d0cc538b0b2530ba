//! Motivational progress messages
//!
//! Pure rules over a category's current score and the score from the
//! previous run. Improvement and regression tiers need a previous score;
//! milestone tiers fire on the current score alone.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotivationalMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub category: String,
    pub message: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_change: Option<f64>,
}

/// Messages for one category given its current and previous score.
pub fn messages_for(
    category: &str,
    display_name: &str,
    current: f64,
    previous: Option<f64>,
) -> Vec<MotivationalMessage> {
    let mut messages = Vec::new();

    if let Some(previous) = previous {
        let change = current - previous;
        if change > 10.0 {
            messages.push(MotivationalMessage {
                message_type: "improvement".to_string(),
                category: category.to_string(),
                message: format!(
                    "🎉 Amazing! Your {display_name} score improved by {change:.1} points!"
                ),
                icon: "🎉".to_string(),
                score_change: Some(change),
            });
        } else if change > 5.0 {
            messages.push(MotivationalMessage {
                message_type: "improvement".to_string(),
                category: category.to_string(),
                message: format!("💪 Great progress! {display_name} is getting better!"),
                icon: "💪".to_string(),
                score_change: Some(change),
            });
        } else if change < -5.0 {
            messages.push(MotivationalMessage {
                message_type: "encouragement".to_string(),
                category: category.to_string(),
                message: format!(
                    "🔧 Focus needed: {display_name} score decreased. Let's fix those issues!"
                ),
                icon: "🔧".to_string(),
                score_change: Some(change),
            });
        }
    }

    if current >= 90.0 {
        messages.push(MotivationalMessage {
            message_type: "milestone".to_string(),
            category: category.to_string(),
            message: format!(
                "🏆 Excellent! You've mastered {display_name} with a score of {current:.1}!"
            ),
            icon: "🏆".to_string(),
            score_change: None,
        });
    } else if current >= 75.0 {
        messages.push(MotivationalMessage {
            message_type: "milestone".to_string(),
            category: category.to_string(),
            message: format!(
                "🎯 You're doing great! {display_name} score is {current:.1} - almost there!"
            ),
            icon: "🎯".to_string(),
            score_change: None,
        });
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_improvement_message() {
        let messages = messages_for("security", "Security Analysis", 85.0, Some(70.0));
        assert_eq!(messages.len(), 2); // improvement + 75 milestone
        assert_eq!(messages[0].message_type, "improvement");
        assert_eq!(messages[0].score_change, Some(15.0));
        assert!(messages[0].message.contains("improved by 15.0"));
    }

    #[test]
    fn moderate_improvement_uses_second_tier() {
        let messages = messages_for("testing", "Testing", 60.0, Some(53.0));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].icon, "💪");
    }

    #[test]
    fn regression_message() {
        let messages = messages_for("performance", "Performance", 50.0, Some(60.0));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, "encouragement");
        assert_eq!(messages[0].score_change, Some(-10.0));
    }

    #[test]
    fn milestones_without_history() {
        let high = messages_for("security", "Security Analysis", 92.0, None);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].icon, "🏆");

        let mid = messages_for("security", "Security Analysis", 80.0, None);
        assert_eq!(mid.len(), 1);
        assert_eq!(mid[0].icon, "🎯");

        let low = messages_for("security", "Security Analysis", 40.0, None);
        assert!(low.is_empty());
    }

    #[test]
    fn small_changes_produce_no_progress_message() {
        let messages = messages_for("logging", "Logging", 71.0, Some(70.0));
        assert!(messages.is_empty());
    }
}
