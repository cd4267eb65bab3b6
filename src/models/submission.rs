use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::external::upload::ReadableBinary;

/// Which kind of note is being written. The equity variant carries its extra
/// fields so downstream code pattern-matches instead of comparing strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "equity", rename_all = "snake_case")]
pub enum NoteType {
    General,
    EquityResearch(EquityFields),
}

impl NoteType {
    /// Display label used in the page header, email subject and file name.
    pub fn label(&self) -> &'static str {
        match self {
            NoteType::General => "Research Note",
            NoteType::EquityResearch(_) => "Equity Research",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EquityFields {
    pub ticker: String,
    #[serde(default)]
    pub crg_rating: String,
    /// Numeric string as typed into the form; parsed where needed.
    #[serde(default)]
    pub target_price: String,
    #[serde(default)]
    pub valuation_summary: String,
    #[serde(default)]
    pub key_assumptions: String,
    #[serde(default)]
    pub scenario_notes: String,
    /// File names only; model workbooks are never embedded.
    #[serde(default)]
    pub model_files: Vec<String>,
    #[serde(default)]
    pub model_link: Option<String>,
}

/// An author as the document renders it: `phone` is the canonical normalized
/// value and may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub last_name: String,
    pub first_name: String,
    #[serde(default)]
    pub phone: String,
}

/// Author as submitted by the form: a country-code selection plus free-text
/// national number, normalized during conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorInput {
    pub last_name: String,
    pub first_name: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub phone: String,
}

/// Wire shape of a submission. Images are referenced by path and read from
/// disk through the upload capability, one at a time, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRequest {
    #[serde(flatten)]
    pub note_type: NoteType,
    pub title: String,
    #[serde(default)]
    pub topic: String,
    pub primary_author: AuthorInput,
    #[serde(default)]
    pub co_authors: Vec<AuthorInput>,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub key_takeaways: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cordoba_view: String,
    #[serde(default)]
    pub image_paths: Vec<String>,
}

/// One submission's worth of form data, built per request and dropped after
/// the document is produced.
pub struct FormSubmission {
    pub note_type: NoteType,
    pub title: String,
    pub topic: String,
    pub primary_author: Author,
    /// Insertion order is display order. May be empty.
    pub co_authors: Vec<Author>,
    pub analysis: String,
    pub key_takeaways: String,
    pub content: String,
    pub cordoba_view: String,
    /// Upload order is figure-numbering order.
    pub images: Vec<Box<dyn ReadableBinary>>,
    /// Captured once at submission time, formatted once, reused everywhere.
    pub generated_at: DateTime<Local>,
}

impl FormSubmission {
    /// Header/footer timestamp, e.g. `August 6, 2026 3:05 PM`.
    pub fn formatted_timestamp(&self) -> String {
        self.generated_at.format("%B %-d, %Y %-I:%M %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_type_tag_round_trips() {
        let json = r#"{"kind":"general"}"#;
        let t: NoteType = serde_json::from_str(json).unwrap();
        assert_eq!(t, NoteType::General);
        assert_eq!(t.label(), "Research Note");

        let json = r#"{"kind":"equity_research","equity":{"ticker":"CRG.L"}}"#;
        let t: NoteType = serde_json::from_str(json).unwrap();
        match &t {
            NoteType::EquityResearch(eq) => assert_eq!(eq.ticker, "CRG.L"),
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(t.label(), "Equity Research");
    }

    #[test]
    fn note_request_accepts_minimal_general_payload() {
        let json = r#"{
            "kind": "general",
            "title": "Rates outlook",
            "primary_author": {"last_name": "Smith", "first_name": "Jane"}
        }"#;
        let req: NoteRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.note_type, NoteType::General);
        assert!(req.co_authors.is_empty());
        assert!(req.image_paths.is_empty());
    }
}
