//! Prefilled email handoff for a generated note.
//!
//! Composes recipient, derived cc, subject and a metadata body, plus a
//! `mailto:` URL the form opens in the user's mail client. Attachments are
//! not programmatically possible; the body says so. When SMTP is enabled the
//! draft can also be sent directly, otherwise a send request is logged.

use anyhow::Context;
use chrono::{DateTime, Local};
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;
use url::Url;

use crate::errors::AppError;
use crate::models::NoteType;

const DEFAULT_RECIPIENT: &str = "distribution@cordobagroup.com";

#[derive(Debug, Clone, Deserialize)]
pub struct DraftRequest {
    #[serde(flatten)]
    pub note_type: NoteType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topic: String,
    /// Display name of the primary author, e.g. "Smith, Jane".
    #[serde(default)]
    pub author: String,
    /// Overrides the MAIL_RECIPIENT default.
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MailDraft {
    pub to: String,
    pub cc: String,
    pub subject: String,
    pub body: String,
    pub mailto_url: String,
}

/// Desk address cc'd on every note of the given kind.
fn cc_for(note_type: &NoteType) -> &'static str {
    match note_type {
        NoteType::General => "research.notes@cordobagroup.com",
        NoteType::EquityResearch(_) => "equity.research@cordobagroup.com",
    }
}

pub fn build_draft(req: &DraftRequest, now: DateTime<Local>) -> Result<MailDraft, AppError> {
    let to = req
        .to
        .clone()
        .or_else(|| env::var("MAIL_RECIPIENT").ok())
        .unwrap_or_else(|| DEFAULT_RECIPIENT.to_string());
    let cc = cc_for(&req.note_type).to_string();
    let label = req.note_type.label();

    let mut subject = format!("{} - {}", label, now.format("%b %-d, %Y"));
    if !req.title.trim().is_empty() {
        subject.push_str(" - ");
        subject.push_str(req.title.trim());
    }

    let body = format!(
        "Note Type: {label}\n\
         Title: {}\n\
         Topic: {}\n\
         Author: {}\n\
         Generated: {}\n\
         \n\
         Please attach the generated document manually before sending.",
        req.title,
        req.topic,
        req.author,
        now.format("%B %-d, %Y %-I:%M %p"),
    );

    let mut url = Url::parse(&format!("mailto:{to}"))
        .map_err(|e| AppError::Validation(format!("invalid recipient {to}: {e}")))?;
    url.query_pairs_mut()
        .append_pair("cc", &cc)
        .append_pair("subject", &subject)
        .append_pair("body", &body);

    Ok(MailDraft {
        to,
        cc,
        subject,
        body,
        mailto_url: url.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendOutcome {
    Sent,
    Logged,
}

/// Send the draft via SMTP when `SMTP_ENABLED=true`; otherwise log it so the
/// request is never silently swallowed.
pub async fn send(draft: &MailDraft) -> Result<SendOutcome, AppError> {
    let smtp_enabled = env::var("SMTP_ENABLED")
        .unwrap_or_else(|_| "false".to_string())
        .to_lowercase()
        == "true";

    if !smtp_enabled {
        info!(
            "📧 SMTP disabled; draft logged. To: {} Cc: {} Subject: {}",
            draft.to, draft.cc, draft.subject
        );
        return Ok(SendOutcome::Logged);
    }

    send_via_smtp(draft)
        .map(|_| SendOutcome::Sent)
        .map_err(|e| AppError::External(format!("SMTP send failed: {e}")))
}

fn send_via_smtp(draft: &MailDraft) -> anyhow::Result<()> {
    let smtp_host = env::var("SMTP_HOST").context("SMTP_HOST not set")?;
    let smtp_port = env::var("SMTP_PORT")
        .context("SMTP_PORT not set")?
        .parse::<u16>()
        .context("SMTP_PORT is not a port number")?;
    let smtp_username = env::var("SMTP_USERNAME").context("SMTP_USERNAME not set")?;
    let smtp_password = env::var("SMTP_PASSWORD").context("SMTP_PASSWORD not set")?;
    let from_email = env::var("SMTP_FROM_EMAIL").context("SMTP_FROM_EMAIL not set")?;
    let from_name =
        env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Cordoba Notes".to_string());

    let email = Message::builder()
        .from(format!("{from_name} <{from_email}>").parse()?)
        .to(draft.to.parse()?)
        .cc(draft.cc.parse()?)
        .subject(&draft.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(draft.body.clone())?;

    let creds = Credentials::new(smtp_username, smtp_password);
    let mailer = SmtpTransport::starttls_relay(&smtp_host)?
        .port(smtp_port)
        .credentials(creds)
        .build();

    mailer.send(&email)?;
    info!("✅ Draft emailed to {}", draft.to);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EquityFields;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 6, 15, 5, 0).unwrap()
    }

    fn request(note_type: NoteType) -> DraftRequest {
        DraftRequest {
            note_type,
            title: "Q3 Outlook".to_string(),
            topic: "Rates".to_string(),
            author: "Smith, Jane".to_string(),
            to: Some("desk@cordobagroup.com".to_string()),
        }
    }

    #[test]
    fn cc_follows_note_type() {
        let draft = build_draft(&request(NoteType::General), at()).unwrap();
        assert_eq!(draft.cc, "research.notes@cordobagroup.com");

        let draft = build_draft(
            &request(NoteType::EquityResearch(EquityFields::default())),
            at(),
        )
        .unwrap();
        assert_eq!(draft.cc, "equity.research@cordobagroup.com");
    }

    #[test]
    fn subject_is_label_date_and_title() {
        let draft = build_draft(&request(NoteType::General), at()).unwrap();
        assert_eq!(draft.subject, "Research Note - Aug 6, 2026 - Q3 Outlook");

        let mut req = request(NoteType::General);
        req.title = String::new();
        let draft = build_draft(&req, at()).unwrap();
        assert_eq!(draft.subject, "Research Note - Aug 6, 2026");
    }

    #[test]
    fn body_lists_labeled_metadata_and_attachment_note() {
        let draft = build_draft(&request(NoteType::General), at()).unwrap();
        assert!(draft.body.contains("Note Type: Research Note"));
        assert!(draft.body.contains("Title: Q3 Outlook"));
        assert!(draft.body.contains("Topic: Rates"));
        assert!(draft.body.contains("Author: Smith, Jane"));
        assert!(draft.body.contains("attach the generated document manually"));
    }

    #[test]
    fn mailto_url_targets_recipient_with_cc_and_subject() {
        let draft = build_draft(&request(NoteType::General), at()).unwrap();
        assert!(draft.mailto_url.starts_with("mailto:desk@cordobagroup.com?"));
        assert!(draft.mailto_url.contains("cc=research.notes%40cordobagroup.com"));
        assert!(draft.mailto_url.contains("subject="));
        assert!(draft.mailto_url.contains("body="));
    }
}
