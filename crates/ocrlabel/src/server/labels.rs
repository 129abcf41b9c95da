use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use ocrlabel_core::{LabelEntry, LabelQuery};

use super::error::{map_core_error, AppError};
use super::{SharedState, FILES_ROUTE};

// ==============================================================================
// DTOs
// ==============================================================================

#[derive(Serialize)]
pub(super) struct LabelItem {
    file: String,
    label: String,
    image_url: String,
}

#[derive(Serialize)]
pub(super) struct LabelListResponse {
    total: usize,
    page: i64,
    size: usize,
    items: Vec<LabelItem>,
}

#[derive(Serialize)]
pub(super) struct StoredLabel {
    file: String,
    label: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct SetLabelRequest {
    label: String,
}

// ==============================================================================
// Handlers
// ==============================================================================

pub(super) async fn list_labels(
    State(state): State<SharedState>,
    query: Result<Query<LabelQuery>, QueryRejection>,
) -> Result<Json<LabelListResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.to_string()))?;
    let page = state.store.list(&query).map_err(map_core_error)?;

    Ok(Json(LabelListResponse {
        total: page.total,
        page: query.page,
        size: query.size,
        items: page.items.into_iter().map(label_item).collect(),
    }))
}

pub(super) async fn get_label(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Result<Json<LabelItem>, AppError> {
    let entry = state.store.get_label(&filename).map_err(map_core_error)?;
    Ok(Json(label_item(entry)))
}

pub(super) async fn set_label(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
    req: Result<Json<SetLabelRequest>, JsonRejection>,
) -> Result<Json<StoredLabel>, AppError> {
    let Json(req) = req.map_err(|e| AppError::BadRequest(e.to_string()))?;

    let entry = state
        .store
        .set_label(&filename, &req.label)
        .map_err(map_core_error)?;

    Ok(Json(StoredLabel {
        file: entry.name,
        label: entry.label,
    }))
}

pub(super) async fn refresh_labels(
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.refresh().map_err(map_core_error)?;
    Ok(Json(serde_json::json!({ "status": "refreshed" })))
}

// ==============================================================================
// Helpers
// ==============================================================================

fn label_item(entry: LabelEntry) -> LabelItem {
    LabelItem {
        image_url: format!("{FILES_ROUTE}/{}", entry.name),
        file: entry.name,
        label: entry.label,
    }
}
