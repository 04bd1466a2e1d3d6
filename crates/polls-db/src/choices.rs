use crate::{DbError, DbPool};
use polls_models::Choice;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChoiceRow {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i64,
}

impl From<ChoiceRow> for Choice {
    fn from(row: ChoiceRow) -> Self {
        Choice {
            id: row.id,
            question_id: row.question_id,
            choice_text: row.choice_text,
            votes: row.votes,
        }
    }
}

pub async fn create_choice(
    pool: &DbPool,
    question_id: i64,
    choice_text: &str,
) -> Result<ChoiceRow, DbError> {
    let row = sqlx::query_as::<_, ChoiceRow>(
        "INSERT INTO choices (question_id, choice_text)
         VALUES (?1, ?2)
         RETURNING id, question_id, choice_text, votes",
    )
    .bind(question_id)
    .bind(choice_text)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn get_choice(pool: &DbPool, id: i64) -> Result<Option<ChoiceRow>, DbError> {
    let row = sqlx::query_as::<_, ChoiceRow>(
        "SELECT id, question_id, choice_text, votes FROM choices WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn get_question_choices(
    pool: &DbPool,
    question_id: i64,
) -> Result<Vec<ChoiceRow>, DbError> {
    let rows = sqlx::query_as::<_, ChoiceRow>(
        "SELECT id, question_id, choice_text, votes FROM choices
         WHERE question_id = ?1
         ORDER BY id",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Add one vote with a single field-relative update evaluated by SQLite.
///
/// Returns false when `choice_id` is not a choice of `question_id`; nothing
/// is written in that case. Concurrent callers never lose increments since
/// there is no read in application memory between fetch and write.
pub async fn increment_votes(
    pool: &DbPool,
    question_id: i64,
    choice_id: i64,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE choices SET votes = votes + 1
         WHERE id = ?1 AND question_id = ?2",
    )
    .bind(choice_id)
    .bind(question_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}
