pub mod admin;
pub mod polls;

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use polls_models::{Choice, Question};
use serde_json::{json, Value};

/// Ids in paths that are not integers simply do not match any question.
pub(crate) fn parse_question_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::NotFound)
}

pub(crate) fn question_json(question: &Question, now: DateTime<Utc>) -> Value {
    json!({
        "id": question.id,
        "question_text": question.question_text,
        "pub_date": question.pub_date.to_rfc3339(),
        "was_published_recently": question.was_published_recently_at(now),
    })
}

pub(crate) fn choice_json(choice: &Choice) -> Value {
    json!({
        "id": choice.id,
        "question_id": choice.question_id,
        "choice_text": choice.choice_text,
        "votes": choice.votes,
    })
}
