use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

impl Question {
    /// True when the question went live within the last day.
    pub fn was_published_recently(&self) -> bool {
        self.was_published_recently_at(Utc::now())
    }

    /// Same as [`Question::was_published_recently`] against a fixed clock.
    /// Future publication dates never count as recent.
    pub fn was_published_recently_at(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(1) <= self.pub_date && self.pub_date <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_at(pub_date: DateTime<Utc>) -> Question {
        Question {
            id: 1,
            question_text: "What's up?".to_string(),
            pub_date,
        }
    }

    #[test]
    fn future_question_is_not_recent() {
        let now = Utc::now();
        let question = question_at(now + Duration::days(30));
        assert!(!question.was_published_recently_at(now));
    }

    #[test]
    fn question_older_than_a_day_is_not_recent() {
        let now = Utc::now();
        let question = question_at(now - Duration::days(1) - Duration::seconds(1));
        assert!(!question.was_published_recently_at(now));
    }

    #[test]
    fn question_within_last_day_is_recent() {
        let now = Utc::now();
        let question = question_at(
            now - Duration::hours(23) - Duration::minutes(59) - Duration::seconds(59),
        );
        assert!(question.was_published_recently_at(now));
    }

    #[test]
    fn recent_window_is_inclusive_at_both_ends() {
        let now = Utc::now();
        assert!(question_at(now).was_published_recently_at(now));
        assert!(question_at(now - Duration::days(1)).was_published_recently_at(now));
    }
}
