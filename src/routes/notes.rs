use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http::header;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{ContentTree, NoteRequest};
use crate::services::note_service::{self, CompletionReport};
use crate::state::AppState;

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate_note))
        .route("/preview", post(preview_note))
        .route("/completion", post(completion))
}

pub async fn generate_note(
    State(state): State<AppState>,
    Json(req): Json<NoteRequest>,
) -> Result<Response, AppError> {
    info!("POST /notes/generate - \"{}\"", req.title);
    let doc = note_service::generate(state.serializer.as_ref(), &state.market, req)
        .await
        .map_err(|e| {
            error!("Failed to generate document: {}", e);
            e
        })?;

    let headers = [
        (header::CONTENT_TYPE, DOCX_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", doc.file_name),
        ),
    ];
    Ok((headers, doc.bytes).into_response())
}

pub async fn preview_note(
    State(state): State<AppState>,
    Json(req): Json<NoteRequest>,
) -> Result<Json<ContentTree>, AppError> {
    info!("POST /notes/preview - \"{}\"", req.title);
    Ok(Json(note_service::preview(&state.market, req).await))
}

pub async fn completion(
    Json(req): Json<NoteRequest>,
) -> Result<Json<CompletionReport>, AppError> {
    Ok(Json(note_service::completion(&req)))
}
