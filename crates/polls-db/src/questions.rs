use crate::{datetime_from_db_text, datetime_to_db_text, DbError, DbPool};
use chrono::{DateTime, Utc};
use polls_models::Question;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

#[derive(Debug, Clone)]
pub struct QuestionRow {
    pub id: i64,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for QuestionRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let pub_date_raw: String = row.try_get("pub_date")?;
        Ok(Self {
            id: row.try_get("id")?,
            question_text: row.try_get("question_text")?,
            pub_date: datetime_from_db_text(&pub_date_raw)?,
        })
    }
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            id: row.id,
            question_text: row.question_text,
            pub_date: row.pub_date,
        }
    }
}

pub async fn create_question(
    pool: &DbPool,
    question_text: &str,
    pub_date: DateTime<Utc>,
) -> Result<QuestionRow, DbError> {
    let row = sqlx::query_as::<_, QuestionRow>(
        "INSERT INTO questions (question_text, pub_date)
         VALUES (?1, ?2)
         RETURNING id, question_text, pub_date",
    )
    .bind(question_text)
    .bind(datetime_to_db_text(pub_date))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Insert a question and its choices in one transaction.
pub async fn create_question_with_choices(
    pool: &DbPool,
    question_text: &str,
    pub_date: DateTime<Utc>,
    choice_texts: &[String],
) -> Result<(QuestionRow, Vec<crate::choices::ChoiceRow>), DbError> {
    let mut tx = pool.begin().await?;

    let question = sqlx::query_as::<_, QuestionRow>(
        "INSERT INTO questions (question_text, pub_date)
         VALUES (?1, ?2)
         RETURNING id, question_text, pub_date",
    )
    .bind(question_text)
    .bind(datetime_to_db_text(pub_date))
    .fetch_one(&mut *tx)
    .await?;

    let mut choices = Vec::with_capacity(choice_texts.len());
    for text in choice_texts {
        let choice = sqlx::query_as::<_, crate::choices::ChoiceRow>(
            "INSERT INTO choices (question_id, choice_text)
             VALUES (?1, ?2)
             RETURNING id, question_id, choice_text, votes",
        )
        .bind(question.id)
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;
        choices.push(choice);
    }

    tx.commit().await?;
    Ok((question, choices))
}

pub async fn get_question(pool: &DbPool, id: i64) -> Result<Option<QuestionRow>, DbError> {
    let row = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, question_text, pub_date FROM questions WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a question only if its publication date is at or before `now`.
pub async fn get_published_question(
    pool: &DbPool,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Option<QuestionRow>, DbError> {
    let row = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, question_text, pub_date FROM questions
         WHERE id = ?1 AND pub_date <= ?2",
    )
    .bind(id)
    .bind(datetime_to_db_text(now))
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Newest questions first. Future-dated questions are not filtered out.
pub async fn list_recent_questions(
    pool: &DbPool,
    limit: i64,
) -> Result<Vec<QuestionRow>, DbError> {
    let rows = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, question_text, pub_date FROM questions
         ORDER BY pub_date DESC, id DESC
         LIMIT ?1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Admin listing: optional case-insensitive text search and a half-open
/// `[published_since, published_before)` window on `pub_date`.
pub async fn search_questions(
    pool: &DbPool,
    search: Option<&str>,
    published_since: Option<DateTime<Utc>>,
    published_before: Option<DateTime<Utc>>,
) -> Result<Vec<QuestionRow>, DbError> {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let rows = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, question_text, pub_date FROM questions
         WHERE (?1 IS NULL OR pub_date >= ?1)
           AND (?2 IS NULL OR pub_date < ?2)
         ORDER BY pub_date DESC, id DESC",
    )
    .bind(published_since.map(datetime_to_db_text))
    .bind(published_before.map(datetime_to_db_text))
    .fetch_all(pool)
    .await?;

    // SQLite's LIKE only folds ASCII, so text matching happens here.
    Ok(match needle {
        Some(needle) => rows
            .into_iter()
            .filter(|row| row.question_text.to_lowercase().contains(&needle))
            .collect(),
        None => rows,
    })
}

/// Returns false when no question had that id. Choices go with it (FK cascade).
pub async fn delete_question(pool: &DbPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pool;
    use chrono::Duration;

    async fn create_days_offset(pool: &DbPool, text: &str, days: i64) -> QuestionRow {
        create_question(pool, text, Utc::now() + Duration::days(days))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_question() {
        let pool = test_pool().await;
        let when = Utc::now();
        let row = create_question(&pool, "What's new?", when).await.unwrap();
        assert!(row.id > 0);
        assert_eq!(row.question_text, "What's new?");
        assert_eq!(row.pub_date.timestamp_micros(), when.timestamp_micros());
    }

    #[tokio::test]
    async fn test_get_question_not_found() {
        let pool = test_pool().await;
        assert!(get_question(&pool, 404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_recent_orders_newest_first() {
        let pool = test_pool().await;
        let old = create_days_offset(&pool, "Past question 1.", -30).await;
        let newer = create_days_offset(&pool, "Past question 2.", -5).await;
        let rows = list_recent_questions(&pool, 5).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![newer.id, old.id]);
    }

    #[tokio::test]
    async fn test_list_recent_includes_future_questions() {
        let pool = test_pool().await;
        let future = create_days_offset(&pool, "Future question.", 30).await;
        let rows = list_recent_questions(&pool, 5).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, future.id);
    }

    #[tokio::test]
    async fn test_list_recent_truncates_to_limit() {
        let pool = test_pool().await;
        for day in 1..=7 {
            create_days_offset(&pool, &format!("Question {day}"), -day).await;
        }
        let rows = list_recent_questions(&pool, 5).await.unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].question_text, "Question 1");
        assert_eq!(rows[4].question_text, "Question 5");
    }

    #[tokio::test]
    async fn test_get_published_question_hides_future() {
        let pool = test_pool().await;
        let future = create_days_offset(&pool, "Future question.", 5).await;
        let past = create_days_offset(&pool, "Past Question.", -5).await;
        let now = Utc::now();
        assert!(get_published_question(&pool, future.id, now)
            .await
            .unwrap()
            .is_none());
        let found = get_published_question(&pool, past.id, now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.question_text, "Past Question.");
    }

    #[tokio::test]
    async fn test_search_questions_matches_text_case_insensitively() {
        let pool = test_pool().await;
        create_days_offset(&pool, "What's your favourite colour?", -1).await;
        create_days_offset(&pool, "Tabs or spaces?", -1).await;
        let rows = search_questions(&pool, Some("COLOUR"), None, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].question_text, "What's your favourite colour?");
    }

    #[tokio::test]
    async fn test_search_questions_treats_wildcards_literally() {
        let pool = test_pool().await;
        create_days_offset(&pool, "100% sure?", -1).await;
        create_days_offset(&pool, "1000 times?", -1).await;
        let rows = search_questions(&pool, Some("0%"), None, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].question_text, "100% sure?");
    }

    #[tokio::test]
    async fn test_search_questions_folds_non_ascii_case() {
        let pool = test_pool().await;
        create_days_offset(&pool, "Vacances d'été?", -1).await;
        create_days_offset(&pool, "Winter plans?", -1).await;
        let rows = search_questions(&pool, Some("ÉTÉ"), None, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].question_text, "Vacances d'été?");
    }

    #[tokio::test]
    async fn test_search_questions_filters_by_date() {
        let pool = test_pool().await;
        create_days_offset(&pool, "Old", -30).await;
        let recent = create_days_offset(&pool, "Recent", -2).await;
        create_days_offset(&pool, "Upcoming", 3).await;
        let now = Utc::now();
        let rows = search_questions(
            &pool,
            None,
            Some(now - Duration::days(7)),
            Some(now + Duration::days(1)),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, recent.id);
    }

    #[tokio::test]
    async fn test_blank_search_returns_everything() {
        let pool = test_pool().await;
        create_days_offset(&pool, "One", -1).await;
        create_days_offset(&pool, "Two", -2).await;
        let rows = search_questions(&pool, Some("   "), None, None).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_create_question_with_choices() {
        let pool = test_pool().await;
        let (question, choices) = create_question_with_choices(
            &pool,
            "Pick one",
            Utc::now(),
            &["Red".to_string(), "Blue".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(choices.len(), 2);
        assert!(choices.iter().all(|c| c.question_id == question.id));
        assert!(choices.iter().all(|c| c.votes == 0));
    }

    #[tokio::test]
    async fn test_delete_question_cascades_to_choices() {
        let pool = test_pool().await;
        let (question, _) = create_question_with_choices(
            &pool,
            "Doomed",
            Utc::now(),
            &["A".to_string(), "B".to_string()],
        )
        .await
        .unwrap();
        assert!(delete_question(&pool, question.id).await.unwrap());
        assert!(get_question(&pool, question.id).await.unwrap().is_none());
        let remaining = crate::choices::get_question_choices(&pool, question.id)
            .await
            .unwrap();
        assert!(remaining.is_empty());
        assert!(!delete_question(&pool, question.id).await.unwrap());
    }
}
