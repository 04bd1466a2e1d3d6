use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use polls_core::error::CoreError;
use polls_core::polls::{self, QuestionWithChoices};
use polls_core::AppState;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{choice_json, parse_question_id, question_json};
use crate::error::ApiError;

pub const NO_POLLS_MESSAGE: &str = "No polls are available.";
pub const NO_CHOICE_MESSAGE: &str = "You didn't select a choice.";

#[derive(Deserialize)]
pub struct VoteForm {
    pub choice: Option<String>,
}

pub async fn index(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let questions = polls::list_recent(&state.db, state.config.latest_limit).await?;
    let now = Utc::now();
    let message = if questions.is_empty() {
        Value::from(NO_POLLS_MESSAGE)
    } else {
        Value::Null
    };
    let list: Vec<Value> = questions.iter().map(|q| question_json(q, now)).collect();
    Ok(Json(json!({
        "latest_question_list": list,
        "message": message,
    })))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let question_id = parse_question_id(&question_id)?;
    let page = polls::get_published(&state.db, question_id).await?;
    Ok(Json(detail_json(&page, None)))
}

pub async fn results(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let question_id = parse_question_id(&question_id)?;
    let page = polls::get_results(&state.db, question_id).await?;
    let choices: Vec<Value> = page.choices.iter().map(choice_json).collect();
    Ok(Json(json!({
        "question": question_json(&page.question, Utc::now()),
        "choices": choices,
        "total_votes": polls_models::choice::total_votes(&page.choices),
    })))
}

/// Redirects to the results page after a successful vote so a refresh
/// cannot submit twice. A bad selection re-presents the detail payload.
pub async fn vote(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    form: Result<Form<VoteForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let question_id = parse_question_id(&question_id)?;
    let choice = match form {
        Ok(Form(body)) => body.choice,
        Err(rejection) => {
            tracing::debug!("vote form rejected: {}", rejection);
            None
        }
    };

    match polls::cast_vote(&state.db, question_id, choice.as_deref()).await {
        Ok(receipt) => {
            Ok(Redirect::to(&format!("/{}/results/", receipt.question_id)).into_response())
        }
        Err(CoreError::InvalidSelection) => {
            // Voting is not gated on publication, so neither is the re-render.
            let page = polls::get_results(&state.db, question_id).await?;
            Ok(Json(detail_json(&page, Some(NO_CHOICE_MESSAGE))).into_response())
        }
        Err(other) => Err(other.into()),
    }
}

fn detail_json(page: &QuestionWithChoices, error_message: Option<&str>) -> Value {
    let choices: Vec<Value> = page.choices.iter().map(choice_json).collect();
    json!({
        "question": question_json(&page.question, Utc::now()),
        "choices": choices,
        "error_message": error_message,
    })
}
