//! Submission orchestration: wire DTO to domain conversion, content assembly,
//! serialization, and the download file name.

use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::external::document_serializer::DocumentSerializer;
use crate::external::upload::FsUpload;
use crate::models::{Author, ContentTree, FormSubmission, NoteRequest, NoteType};
use crate::services::assembler_service::{self, EquityMarketData};
use crate::services::market_snapshot::MarketSnapshot;
use crate::services::phone;

#[derive(Debug)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// Convert the wire request into a submission: phones canonicalized, image
/// paths turned into upload capabilities, timestamp captured once.
pub fn to_submission(req: NoteRequest) -> FormSubmission {
    let to_author = |a: crate::models::AuthorInput| Author {
        phone: phone::canonical(&a.country_code, &a.phone),
        last_name: a.last_name,
        first_name: a.first_name,
    };

    FormSubmission {
        note_type: req.note_type,
        title: req.title,
        topic: req.topic,
        primary_author: to_author(req.primary_author),
        co_authors: req.co_authors.into_iter().map(to_author).collect(),
        analysis: req.analysis,
        key_takeaways: req.key_takeaways,
        content: req.content,
        cordoba_view: req.cordoba_view,
        images: req
            .image_paths
            .into_iter()
            .map(|p| Box::new(FsUpload::new(p)) as _)
            .collect(),
        generated_at: Local::now(),
    }
}

/// Assemble and serialize one submission into a downloadable document.
///
/// A missing document engine aborts before any assembly work, with the form
/// state untouched on the client so the user can retry as-is.
pub async fn generate(
    serializer: &dyn DocumentSerializer,
    snapshot: &MarketSnapshot,
    req: NoteRequest,
) -> Result<GeneratedDocument, AppError> {
    serializer.available().map_err(AppError::from)?;

    let submission = to_submission(req);
    let file_name = document_file_name(&submission.title, submission.note_type.label());
    info!(
        "Generating \"{}\" ({})",
        submission.title,
        submission.note_type.label()
    );

    let tree = assemble_with_market(&submission, snapshot).await;
    let bytes = serializer.serialize(&tree).await?;

    info!("✓ Document \"{}\" generated ({} bytes)", file_name, bytes.len());
    Ok(GeneratedDocument { bytes, file_name })
}

/// Content tree only, for previewing without a document engine.
pub async fn preview(snapshot: &MarketSnapshot, req: NoteRequest) -> ContentTree {
    let submission = to_submission(req);
    assemble_with_market(&submission, snapshot).await
}

async fn assemble_with_market(
    submission: &FormSubmission,
    snapshot: &MarketSnapshot,
) -> ContentTree {
    let market = match &submission.note_type {
        NoteType::EquityResearch(_) => snapshot
            .equity_data()
            .map(|(stats, chart)| EquityMarketData { stats, chart }),
        NoteType::General => None,
    };
    assembler_service::assemble(submission, market.as_ref()).await
}

/// `{title slug}_{note label slug}.docx`: non-alphanumeric runs collapse to
/// single underscores, trimmed at both ends, lowercased.
pub fn document_file_name(title: &str, note_label: &str) -> String {
    format!("{}_{}.docx", slug(title), slug(note_label))
}

fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionReport {
    /// Filled required fields over total required fields, 0..=1.
    pub ratio: f64,
    pub missing: Vec<&'static str>,
}

/// Completion meter for the form: which required fields are still blank.
/// Equity fields count only for equity notes.
pub fn completion(req: &NoteRequest) -> CompletionReport {
    let mut required: Vec<(&'static str, bool)> = vec![
        ("title", filled(&req.title)),
        ("topic", filled(&req.topic)),
        ("primary_author.last_name", filled(&req.primary_author.last_name)),
        ("primary_author.first_name", filled(&req.primary_author.first_name)),
        ("primary_author.phone", filled(&req.primary_author.phone)),
        ("analysis", filled(&req.analysis)),
        ("key_takeaways", filled(&req.key_takeaways)),
        ("content", filled(&req.content)),
    ];

    if let NoteType::EquityResearch(equity) = &req.note_type {
        required.extend([
            ("equity.ticker", filled(&equity.ticker)),
            ("equity.crg_rating", filled(&equity.crg_rating)),
            ("equity.target_price", filled(&equity.target_price)),
            ("equity.valuation_summary", filled(&equity.valuation_summary)),
            ("equity.key_assumptions", filled(&equity.key_assumptions)),
        ]);
    }

    let total = required.len();
    let done = required.iter().filter(|(_, ok)| *ok).count();
    CompletionReport {
        ratio: done as f64 / total as f64,
        missing: required
            .into_iter()
            .filter_map(|(name, ok)| (!ok).then_some(name))
            .collect(),
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}
