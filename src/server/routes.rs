use super::error::ApiError;
use super::SharedApp;
use crate::models::{HistoryKind, HistoryRecord, ImageRecord, PromptRequest, TextRecord};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryRecord>,
}

/// Which log(s) a DELETE empties.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearScope {
    Text,
    Image,
    #[default]
    All,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    pub mode: ClearScope,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub cleared: ClearScope,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn generate_text(
    State(app): State<SharedApp>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<TextRecord>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(app.generate_text(request).await?))
}

pub async fn generate_image(
    State(app): State<SharedApp>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<ImageRecord>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(app.generate_image(request).await?))
}

pub async fn text_history(
    State(app): State<SharedApp>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(query) = query?;
    read_history(&app, HistoryKind::Text, query).await
}

pub async fn image_history(
    State(app): State<SharedApp>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(query) = query?;
    read_history(&app, HistoryKind::Image, query).await
}

async fn read_history(
    app: &SharedApp,
    kind: HistoryKind,
    query: HistoryQuery,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = app.history().read_recent(kind, query.limit).await?;
    Ok(Json(HistoryResponse { history }))
}

pub async fn clear_history(
    State(app): State<SharedApp>,
    query: Result<Query<ClearQuery>, QueryRejection>,
) -> Result<Json<ClearResponse>, ApiError> {
    let Query(query) = query?;
    match query.mode {
        ClearScope::Text => app.history().clear(HistoryKind::Text).await?,
        ClearScope::Image => app.history().clear(HistoryKind::Image).await?,
        ClearScope::All => app.history().clear_all().await?,
    }
    tracing::info!("Cleared history ({:?})", query.mode);
    Ok(Json(ClearResponse {
        cleared: query.mode,
    }))
}

pub async fn clear_image_history(
    State(app): State<SharedApp>,
) -> Result<Json<ClearResponse>, ApiError> {
    app.history().clear(HistoryKind::Image).await?;
    tracing::info!("Cleared image history");
    Ok(Json(ClearResponse {
        cleared: ClearScope::Image,
    }))
}
