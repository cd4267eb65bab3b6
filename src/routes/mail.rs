use axum::routing::post;
use axum::{Json, Router};
use chrono::Local;
use serde::Serialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::services::mail_service::{self, DraftRequest, MailDraft, SendOutcome};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/draft", post(draft))
        .route("/send", post(send))
}

pub async fn draft(Json(req): Json<DraftRequest>) -> Result<Json<MailDraft>, AppError> {
    info!("POST /mail/draft - {}", req.note_type.label());
    Ok(Json(mail_service::build_draft(&req, Local::now())?))
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub outcome: SendOutcome,
    pub draft: MailDraft,
}

pub async fn send(Json(req): Json<DraftRequest>) -> Result<Json<SendResponse>, AppError> {
    info!("POST /mail/send - {}", req.note_type.label());
    let draft = mail_service::build_draft(&req, Local::now())?;
    let outcome = mail_service::send(&draft).await.map_err(|e| {
        error!("Failed to send draft: {}", e);
        e
    })?;
    Ok(Json(SendResponse { outcome, draft }))
}
