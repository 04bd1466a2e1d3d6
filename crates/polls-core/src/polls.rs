use crate::error::CoreError;
use chrono::Utc;
use polls_db::DbPool;
use polls_models::{Choice, Question};

/// A question together with its choices, as shown on the detail and results pages.
#[derive(Debug, Clone)]
pub struct QuestionWithChoices {
    pub question: Question,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteReceipt {
    pub question_id: i64,
    pub choice_id: i64,
}

/// Latest questions by publication date, newest first.
///
/// Future-dated questions are listed as well even though the detail page
/// refuses to show them.
pub async fn list_recent(pool: &DbPool, limit: i64) -> Result<Vec<Question>, CoreError> {
    let rows = polls_db::questions::list_recent_questions(pool, limit.max(0)).await?;
    Ok(rows.into_iter().map(Question::from).collect())
}

/// Detail page lookup. Questions not yet published are reported as missing.
pub async fn get_published(
    pool: &DbPool,
    question_id: i64,
) -> Result<QuestionWithChoices, CoreError> {
    let question = polls_db::questions::get_published_question(pool, question_id, Utc::now())
        .await?
        .ok_or(CoreError::NotFound)?;
    with_choices(pool, question.into()).await
}

/// Results page lookup, without a publication filter.
pub async fn get_results(
    pool: &DbPool,
    question_id: i64,
) -> Result<QuestionWithChoices, CoreError> {
    let question = polls_db::questions::get_question(pool, question_id)
        .await?
        .ok_or(CoreError::NotFound)?;
    with_choices(pool, question.into()).await
}

/// Record one vote for `choice_id_raw` (the raw form value) on a question.
///
/// Any question may be voted on regardless of its publication date. A
/// missing, malformed or foreign choice yields `InvalidSelection` and leaves
/// every count untouched.
pub async fn cast_vote(
    pool: &DbPool,
    question_id: i64,
    choice_id_raw: Option<&str>,
) -> Result<VoteReceipt, CoreError> {
    polls_db::questions::get_question(pool, question_id)
        .await?
        .ok_or(CoreError::NotFound)?;

    let choice_id = parse_choice_id(choice_id_raw).ok_or(CoreError::InvalidSelection)?;

    if !polls_db::choices::increment_votes(pool, question_id, choice_id).await? {
        tracing::debug!(
            "vote rejected: choice {} is not part of question {}",
            choice_id,
            question_id
        );
        return Err(CoreError::InvalidSelection);
    }

    tracing::info!("vote recorded for question {} choice {}", question_id, choice_id);
    Ok(VoteReceipt {
        question_id,
        choice_id,
    })
}

async fn with_choices(pool: &DbPool, question: Question) -> Result<QuestionWithChoices, CoreError> {
    let choices = polls_db::choices::get_question_choices(pool, question.id)
        .await?
        .into_iter()
        .map(Choice::from)
        .collect();
    Ok(QuestionWithChoices { question, choices })
}

fn parse_choice_id(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
}
