use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use polls_core::admin::{
    self, NewQuestion, PubDateFilter, QuestionListQuery, EXTRA_CHOICE_SLOTS,
    QUESTION_LIST_DISPLAY, QUESTION_SEARCH_FIELDS,
};
use polls_core::AppState;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{choice_json, parse_question_id, question_json};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct QuestionListParams {
    pub q: Option<String>,
    pub pub_date: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateQuestionRequest {
    pub question_text: String,
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub choices: Vec<String>,
}

pub async fn site_index(State(state): State<AppState>) -> Json<Value> {
    let site = &state.config.admin_site;
    Json(json!({
        "site_header": site.site_header,
        "site_title": site.site_title,
        "index_title": site.index_title,
        "models": [{
            "name": "questions",
            "list_display": QUESTION_LIST_DISPLAY,
            "search_fields": QUESTION_SEARCH_FIELDS,
            "list_filter": ["pub_date"],
            "inline": { "model": "choices", "extra": EXTRA_CHOICE_SLOTS },
        }],
    }))
}

pub async fn list_questions(
    State(state): State<AppState>,
    Query(params): Query<QuestionListParams>,
) -> Result<Json<Value>, ApiError> {
    let pub_date = match params.pub_date.as_deref() {
        Some(raw) => raw.parse::<PubDateFilter>()?,
        None => PubDateFilter::Any,
    };
    let rows = admin::list_questions(
        &state.db,
        &QuestionListQuery {
            search: params.q,
            pub_date,
        },
    )
    .await?;
    let total = rows.len();
    Ok(Json(json!({
        "results": rows,
        "total": total,
    })))
}

pub async fn create_question(
    State(state): State<AppState>,
    Json(body): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let created = admin::create_question(
        &state.db,
        NewQuestion {
            question_text: body.question_text,
            pub_date: body.pub_date,
            choices: body.choices,
        },
    )
    .await?;
    let choices: Vec<Value> = created.choices.iter().map(choice_json).collect();
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "question": question_json(&created.question, Utc::now()),
            "choices": choices,
        })),
    ))
}

pub async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let question_id = parse_question_id(&question_id)?;
    admin::delete_question(&state.db, question_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
