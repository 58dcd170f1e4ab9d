//! HTTP handlers for annotation persistence.
//!
//! Every JSON reply carries `success`; failures add an `error` message.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use cellmark_core::classes::ClassRegistry;
use cellmark_core::storage::{
    AnnotationStorage, DatasetExport, DatasetStats, FileStorage, StorageError, dataset_stats, export_dataset,
};
use cellmark_core::Annotation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared application state
pub struct AppState {
    pub storage: FileStorage,
    pub registry: ClassRegistry,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/save_annotation", post(save_annotation))
        .route("/api/load_annotation/{image_id}", get(load_annotation))
        .route("/api/annotation/{image_id}", delete(delete_annotation))
        .route("/api/download/{image_id}/{file_type}", get(download_annotation))
        .route("/api/stats", get(stats))
        .route("/api/export", get(export))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SaveBody {
    pub image_id: String,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Serialize)]
struct Failure {
    success: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct SaveReply {
    success: bool,
    message: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct LoadReply {
    success: bool,
    annotations: Vec<Annotation>,
}

#[derive(Debug, Serialize)]
struct DeleteReply {
    success: bool,
    deleted: bool,
}

#[derive(Debug, Serialize)]
struct Stats {
    /// Images with a stored annotation file.
    total_images: usize,
    #[serde(flatten)]
    dataset: DatasetStats,
}

#[derive(Debug, Serialize)]
struct StatsReply {
    success: bool,
    stats: Stats,
}

#[derive(Debug, Serialize)]
struct ExportReply {
    success: bool,
    path: String,
    export: DatasetExport,
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(Failure {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

fn storage_failure(err: StorageError) -> Response {
    error!("Storage error: {err}");
    let status = match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    failure(status, err.to_string())
}

/// Index page
async fn index() -> &'static str {
    "Cellmark annotation server"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

async fn save_annotation(State(state): State<SharedState>, body: Result<Json<SaveBody>, JsonRejection>) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!("Rejected save request: {}", rejection.body_text());
            return failure(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    if body.image_id.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "image_id is required");
    }
    if let Some(index) = body.annotations.iter().position(|a| !a.is_valid()) {
        warn!("Rejected save for {}: annotation {index} is invalid", body.image_id);
        return failure(StatusCode::BAD_REQUEST, format!("Annotation {index} is invalid"));
    }

    match state.storage.save(&body.image_id, &body.annotations).await {
        Ok(receipt) => {
            info!("Saved {} annotations for {}", receipt.count, body.image_id);
            Json(SaveReply {
                success: true,
                message: receipt.message,
                count: receipt.count,
            })
            .into_response()
        }
        Err(err) => storage_failure(err),
    }
}

/// An image without a file loads as an empty list.
async fn load_annotation(State(state): State<SharedState>, Path(image_id): Path<String>) -> Response {
    let annotations = match state.storage.load(&image_id).await {
        Ok(annotations) => annotations,
        Err(StorageError::NotFound(_)) => Vec::new(),
        Err(err) => return storage_failure(err),
    };
    Json(LoadReply {
        success: true,
        annotations,
    })
    .into_response()
}

async fn delete_annotation(State(state): State<SharedState>, Path(image_id): Path<String>) -> Response {
    match state.storage.delete(&image_id).await {
        Ok(deleted) => {
            if deleted {
                info!("Deleted annotations for {image_id}");
            } else {
                warn!("No annotations to delete for {image_id}");
            }
            Json(DeleteReply { success: true, deleted }).into_response()
        }
        Err(err) => storage_failure(err),
    }
}

/// Raw JSON or CSV file of one image, as an attachment.
async fn download_annotation(
    State(state): State<SharedState>,
    Path((image_id, file_type)): Path<(String, String)>,
) -> Response {
    let (path, content_type) = match file_type.as_str() {
        "json" => (state.storage.json_path(&image_id), "application/json"),
        "csv" => (state.storage.csv_path(&image_id), "text/csv"),
        other => return failure(StatusCode::BAD_REQUEST, format!("Unknown file type: {other}")),
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("annotations.{file_type}"));
            (
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
                ],
                bytes,
            )
                .into_response()
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            failure(StatusCode::NOT_FOUND, format!("No {file_type} file for {image_id}"))
        }
        Err(err) => storage_failure(StorageError::Io(err.to_string())),
    }
}

async fn stats(State(state): State<SharedState>) -> Response {
    let total_images = match state.storage.list().await {
        Ok(ids) => ids.len(),
        Err(err) => return storage_failure(err),
    };
    match dataset_stats(&state.storage, &state.registry).await {
        Ok(dataset) => Json(StatsReply {
            success: true,
            stats: Stats { total_images, dataset },
        })
        .into_response(),
        Err(err) => storage_failure(err),
    }
}

/// Write a dataset export file and return it with its path.
async fn export(State(state): State<SharedState>) -> Response {
    let export = match export_dataset(&state.storage, &state.registry).await {
        Ok(export) => export,
        Err(err) => return storage_failure(err),
    };
    if export.annotations.is_empty() {
        return failure(StatusCode::NOT_FOUND, "No annotations to export");
    }
    match state.storage.write_export(&export) {
        Ok(path) => {
            info!("Exported {} images to {}", export.dataset_info.total_images, path.display());
            Json(ExportReply {
                success: true,
                path: path.display().to_string(),
                export,
            })
            .into_response()
        }
        Err(err) => storage_failure(err),
    }
}
