pub mod error;
pub mod routes;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use polls_core::{AppConfig, AppState};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub fn build_router(config: &AppConfig) -> Router<AppState> {
    let mut router = Router::new()
        .route("/", get(routes::polls::index))
        .route("/health", get(health))
        .route("/{question_id}/", get(routes::polls::detail))
        .route("/{question_id}/results/", get(routes::polls::results))
        .route("/{question_id}/vote/", post(routes::polls::vote));

    if config.admin_enabled {
        router = router
            .route("/admin/", get(routes::admin::site_index))
            .route(
                "/admin/questions",
                get(routes::admin::list_questions).post(routes::admin::create_question),
            )
            .route(
                "/admin/questions/{question_id}",
                delete(routes::admin::delete_question),
            );
    }

    router.layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
