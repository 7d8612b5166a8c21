use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedChangelog {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub date: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct AppState {
    pub changelogs: Arc<Mutex<Vec<PublishedChangelog>>>,
}

type ApiError = (StatusCode, String);

impl AppState {
    fn changelogs(&self) -> Result<MutexGuard<'_, Vec<PublishedChangelog>>, ApiError> {
        self.changelogs.lock().map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Changelog state is unavailable".to_string(),
            )
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/changelogs", get(list_changelogs).post(create_changelog))
        .route("/changelogs/:id", get(get_changelog))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[derive(Deserialize)]
struct CreateChangelogRequest {
    title: String,
    content: String,
    date: Option<String>,
}

async fn create_changelog(
    State(state): State<AppState>,
    Json(req): Json<CreateChangelogRequest>,
) -> Result<(StatusCode, Json<PublishedChangelog>), ApiError> {
    if req.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title is required".to_string()));
    }
    if req.content.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Content is required".to_string()));
    }

    let received_at = Utc::now();
    let changelog = PublishedChangelog {
        id: Uuid::new_v4(),
        title: req.title,
        content: req.content,
        date: req.date.unwrap_or_else(|| received_at.to_rfc3339()),
        received_at,
    };

    state.changelogs()?.push(changelog.clone());
    info!("Received changelog \"{}\" ({})", changelog.title, changelog.id);

    Ok((StatusCode::CREATED, Json(changelog)))
}

async fn list_changelogs(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublishedChangelog>>, ApiError> {
    let mut changelogs = state.changelogs()?.clone();
    changelogs.sort_by(|a, b| b.received_at.cmp(&a.received_at));
    Ok(Json(changelogs))
}

async fn get_changelog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublishedChangelog>, ApiError> {
    let changelog_id =
        Uuid::parse_str(&id).map_err(|_| (StatusCode::BAD_REQUEST, "Invalid UUID".to_string()))?;

    state
        .changelogs()?
        .iter()
        .find(|c| c.id == changelog_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Changelog not found: {}", id)))
}
