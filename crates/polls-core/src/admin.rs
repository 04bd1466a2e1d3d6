//! Admin registration for questions: site titles, list columns, search,
//! the publication-date filter, and inline choice creation.

use crate::error::CoreError;
use crate::polls::QuestionWithChoices;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use polls_db::DbPool;
use polls_models::{Choice, Question};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Columns shown on the question change list.
pub const QUESTION_LIST_DISPLAY: [&str; 3] = ["question_text", "pub_date", "was_published_recently"];
/// Fields searched by the change list `q` parameter.
pub const QUESTION_SEARCH_FIELDS: [&str; 1] = ["question_text"];
/// Blank inline choice rows an add form should render. Submissions are not
/// capped by it; any number of rows may be sent and blank ones are skipped.
pub const EXTRA_CHOICE_SLOTS: usize = 3;

const MAX_TEXT_LEN: usize = 200;

/// Titles for the admin site. Built from configuration at startup and
/// passed around inside `AppConfig`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSite {
    pub site_header: String,
    pub site_title: String,
    pub index_title: String,
}

impl Default for AdminSite {
    fn default() -> Self {
        Self {
            site_header: "Polls Administration".to_string(),
            site_title: "Polls Admin Portal".to_string(),
            index_title: "Welcome to the Polls Admin Area".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PubDateFilter {
    #[default]
    Any,
    Today,
    Past7Days,
    ThisMonth,
    ThisYear,
}

impl FromStr for PubDateFilter {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "" | "any" => Ok(Self::Any),
            "today" => Ok(Self::Today),
            "past_7_days" => Ok(Self::Past7Days),
            "this_month" => Ok(Self::ThisMonth),
            "this_year" => Ok(Self::ThisYear),
            other => Err(CoreError::BadRequest(format!(
                "unknown pub_date filter '{other}'"
            ))),
        }
    }
}

impl PubDateFilter {
    /// Half-open `[since, before)` window relative to `now`, in UTC days.
    pub fn window(
        self,
        now: DateTime<Utc>,
    ) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let today = now.date_naive();
        let tomorrow = today + Duration::days(1);
        match self {
            Self::Any => (None, None),
            Self::Today => (Some(midnight(today)), Some(midnight(tomorrow))),
            Self::Past7Days => (
                Some(midnight(today - Duration::days(7))),
                Some(midnight(tomorrow)),
            ),
            Self::ThisMonth => {
                let first = today.with_day(1).unwrap_or(today);
                let next = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
                };
                (Some(midnight(first)), next.map(midnight))
            }
            Self::ThisYear => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1).map(midnight),
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).map(midnight),
            ),
        }
    }
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone, Default)]
pub struct QuestionListQuery {
    pub search: Option<String>,
    pub pub_date: PubDateFilter,
}

/// One row of the question change list.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionListRow {
    #[serde(flatten)]
    pub question: Question,
    pub was_published_recently: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewQuestion {
    pub question_text: String,
    /// Defaults to the moment of creation.
    pub pub_date: Option<DateTime<Utc>>,
    /// Inline choice rows; blank rows are skipped.
    pub choices: Vec<String>,
}

pub async fn list_questions(
    pool: &DbPool,
    query: &QuestionListQuery,
) -> Result<Vec<QuestionListRow>, CoreError> {
    let now = Utc::now();
    let (since, before) = query.pub_date.window(now);
    let rows =
        polls_db::questions::search_questions(pool, query.search.as_deref(), since, before)
            .await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let question = Question::from(row);
            let was_published_recently = question.was_published_recently_at(now);
            QuestionListRow {
                question,
                was_published_recently,
            }
        })
        .collect())
}

pub async fn create_question(
    pool: &DbPool,
    new: NewQuestion,
) -> Result<QuestionWithChoices, CoreError> {
    let question_text = new.question_text.trim();
    if question_text.is_empty() {
        return Err(CoreError::BadRequest("question_text is required".into()));
    }
    if question_text.chars().count() > MAX_TEXT_LEN {
        return Err(CoreError::BadRequest(format!(
            "question_text must be at most {MAX_TEXT_LEN} characters"
        )));
    }

    let choices: Vec<String> = new
        .choices
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if choices.iter().any(|c| c.chars().count() > MAX_TEXT_LEN) {
        return Err(CoreError::BadRequest(format!(
            "choice_text must be at most {MAX_TEXT_LEN} characters"
        )));
    }

    let pub_date = new.pub_date.unwrap_or_else(Utc::now);
    if !polls_db::datetime_fits_db_text(pub_date) {
        return Err(CoreError::BadRequest(
            "pub_date must fall between years 0 and 9999".into(),
        ));
    }
    let (question, choices) = polls_db::questions::create_question_with_choices(
        pool,
        question_text,
        pub_date,
        &choices,
    )
    .await?;

    tracing::info!(
        "admin: created question {} with {} choices",
        question.id,
        choices.len()
    );
    Ok(QuestionWithChoices {
        question: question.into(),
        choices: choices.into_iter().map(Choice::from).collect(),
    })
}

pub async fn delete_question(pool: &DbPool, question_id: i64) -> Result<(), CoreError> {
    if !polls_db::questions::delete_question(pool, question_id).await? {
        return Err(CoreError::NotFound);
    }
    tracing::info!("admin: deleted question {}", question_id);
    Ok(())
}
