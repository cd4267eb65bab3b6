//! Content Assembler: turns one form submission into the ordered, styled
//! block tree the document serializer consumes.
//!
//! Section order is fixed: info block, divider, optional equity block, Key
//! Takeaways, Analysis and Commentary, Content, optional Cordoba View,
//! optional Figures and Charts. The assembler validates nothing; it emits
//! blocks for whatever strings it is given.

use tracing::warn;

use crate::external::upload::ReadableBinary;
use crate::models::{
    Alignment, Block, BlockStyle, ContentTree, EquityFields, FormSubmission, MarketStats,
    NoteType, PageGeometry,
};
use crate::services::text_blocks::{self, BlankLines};

const SPACING_PROSE: u32 = 150;
const SPACING_EQUITY_PROSE: u32 = 120;
const SPACING_BULLET: u32 = 100;

const IMAGE_WIDTH: u32 = 500;
const IMAGE_HEIGHT: u32 = 375;

/// Stats and captured chart for the equity section, taken from the market
/// snapshot at submission time.
pub struct EquityMarketData {
    pub stats: MarketStats,
    pub chart: Option<Vec<u8>>,
}

/// Build the full content tree for one submission. Async only because image
/// reads suspend; reads are sequential and a failed read skips that image
/// without renumbering the rest.
pub async fn assemble(
    submission: &FormSubmission,
    market: Option<&EquityMarketData>,
) -> ContentTree {
    let timestamp = submission.formatted_timestamp();

    let mut body: Vec<Block> = Vec::new();

    // Info block: title, rule, topic, authors, rule
    body.push(Block::heading(
        submission.title.as_str(),
        1,
        BlockStyle {
            bold: true,
            size: Some(28),
            spacing_after: Some(100),
            ..BlockStyle::default()
        },
    ));
    body.push(Block::divider(None, Some(200)));
    body.push(Block::paragraph(
        "Topic:",
        BlockStyle {
            bold: true,
            size: Some(28),
            spacing_after: Some(100),
            ..BlockStyle::default()
        },
    ));
    body.push(Block::paragraph(
        submission.topic.as_str(),
        BlockStyle {
            size: Some(20),
            spacing_after: Some(200),
            ..BlockStyle::default()
        },
    ));

    body.push(author_line(&submission.primary_author.last_name, &submission.primary_author.first_name, &submission.primary_author.phone));
    for co_author in &submission.co_authors {
        body.push(author_line(&co_author.last_name, &co_author.first_name, &co_author.phone));
    }

    body.push(Block::divider(Some(100), Some(300)));

    if let NoteType::EquityResearch(equity) = &submission.note_type {
        body.extend(equity_section(equity, market));
    }

    body.push(section_heading("Key Takeaways", None));
    body.extend(text_blocks::bullets(
        &submission.key_takeaways,
        BlankLines::Keep,
        SPACING_BULLET,
    ));
    body.push(Block::paragraph("", BlockStyle::spaced_after(300)));

    body.push(section_heading("Analysis and Commentary", None));
    body.extend(text_blocks::paragraphs(&submission.analysis, SPACING_PROSE));

    body.push(section_heading("Content", None));
    body.extend(text_blocks::paragraphs(&submission.content, SPACING_PROSE));

    if !submission.cordoba_view.trim().is_empty() {
        body.push(section_heading("Cordoba View", None));
        body.extend(text_blocks::paragraphs(
            &submission.cordoba_view,
            SPACING_PROSE,
        ));
    }

    let figures = figure_blocks(&submission.images).await;
    if !figures.is_empty() {
        body.push(section_heading("Figures and Charts", Some(400)));
        body.extend(figures);
    }

    ContentTree {
        page: PageGeometry::default(),
        header: header_blocks(submission.note_type.label(), &timestamp),
        footer: footer_blocks(),
        body,
    }
}

fn section_heading(text: &str, spacing_before: Option<u32>) -> Block {
    Block::heading(
        text,
        2,
        BlockStyle {
            bold: true,
            size: Some(24),
            spacing_before,
            spacing_after: Some(200),
            ..BlockStyle::default()
        },
    )
}

/// `"LAST, FIRST (phone)"`, right-aligned. A blank phone shows the `N/A`
/// placeholder; a value that already arrives bracketed is not wrapped again.
fn author_line(last_name: &str, first_name: &str, phone: &str) -> Block {
    Block::paragraph(
        format!(
            "{}, {} {}",
            last_name.to_uppercase(),
            first_name.to_uppercase(),
            phone_display(phone)
        ),
        BlockStyle {
            alignment: Alignment::Right,
            spacing_after: Some(100),
            ..BlockStyle::default()
        },
    )
}

fn phone_display(phone: &str) -> String {
    let shown = phone.trim();
    let shown = if shown.is_empty() { "N/A" } else { shown };
    if shown.starts_with('(') && shown.ends_with(')') {
        shown.to_string()
    } else {
        format!("({shown})")
    }
}

fn equity_section(equity: &EquityFields, market: Option<&EquityMarketData>) -> Vec<Block> {
    let mut out = Vec::new();

    out.push(section_heading("Equity Research", None));
    out.push(Block::paragraph(
        format!("Ticker: {}", equity.ticker),
        BlockStyle::spaced_after(100),
    ));
    out.push(Block::paragraph(
        format!("CRG Rating: {}", equity.crg_rating),
        BlockStyle::spaced_after(100),
    ));
    if let Some(link) = &equity.model_link {
        out.push(Block::paragraph(
            format!("Model: {link}"),
            BlockStyle::spaced_after(100),
        ));
    }

    if let Some(chart) = market.and_then(|m| m.chart.as_ref()) {
        out.push(Block::Image {
            data: chart.clone(),
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            style: BlockStyle {
                alignment: Alignment::Center,
                spacing_before: Some(200),
                spacing_after: Some(200),
                ..BlockStyle::default()
            },
        });
    }

    out.push(stats_table(market.map(|m| m.stats).unwrap_or_default()));

    out.push(Block::paragraph(
        "Attached Models:",
        BlockStyle {
            bold: true,
            spacing_before: Some(200),
            spacing_after: Some(100),
            ..BlockStyle::default()
        },
    ));
    if equity.model_files.is_empty() {
        out.push(Block::paragraph("None uploaded", BlockStyle::spaced_after(200)));
    } else {
        for name in &equity.model_files {
            out.push(Block::bullet(name.as_str(), BlockStyle::spaced_after(SPACING_BULLET)));
        }
    }

    out.push(section_heading("Valuation Summary", None));
    out.extend(text_blocks::paragraphs(
        &equity.valuation_summary,
        SPACING_EQUITY_PROSE,
    ));

    out.push(section_heading("Key Assumptions", None));
    out.extend(text_blocks::bullets(
        &equity.key_assumptions,
        BlankLines::Drop,
        SPACING_BULLET,
    ));

    out.push(section_heading("Scenario Notes", None));
    out.extend(text_blocks::paragraphs(
        &equity.scenario_notes,
        SPACING_EQUITY_PROSE,
    ));

    out
}

fn stats_table(stats: MarketStats) -> Block {
    Block::Table {
        rows: vec![
            vec!["Current Price".to_string(), fmt_price(stats.current_price)],
            vec!["Range Return".to_string(), fmt_signed_pct(stats.range_return)],
            vec![
                "Realised Volatility (ann.)".to_string(),
                fmt_pct(stats.realised_vol_ann),
            ],
            vec![
                "Upside to Target".to_string(),
                fmt_signed_pct(stats.upside_to_target),
            ],
        ],
        style: BlockStyle {
            spacing_before: Some(100),
            spacing_after: Some(200),
            ..BlockStyle::default()
        },
    }
}

const UNAVAILABLE: &str = "unavailable";

fn fmt_price(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

fn fmt_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

fn fmt_signed_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:+.2}%", v * 100.0))
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

/// Image block plus caption per uploaded file, in upload order. Reads are
/// sequential; a failed read is logged and skipped, and the caption index
/// stays tied to the file's position in the original upload list, so skipped
/// files leave a numbering gap.
async fn figure_blocks(images: &[Box<dyn ReadableBinary>]) -> Vec<Block> {
    let mut out = Vec::new();

    for (index, file) in images.iter().enumerate() {
        let data = match file.read_bytes().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Skipping image {} ({}): {}", index + 1, file.name(), e);
                continue;
            }
        };

        out.push(Block::Image {
            data,
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            style: BlockStyle {
                alignment: Alignment::Center,
                spacing_before: Some(200),
                spacing_after: Some(100),
                ..BlockStyle::default()
            },
        });
        out.push(Block::paragraph(
            format!("Figure {}: {}", index + 1, file_stem(file.name())),
            BlockStyle {
                italics: true,
                size: Some(18),
                alignment: Alignment::Center,
                spacing_after: Some(300),
                ..BlockStyle::default()
            },
        ));
    }

    out
}

/// File name without its last extension; extensionless and dot-led names
/// pass through unchanged.
fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

fn header_blocks(note_label: &str, timestamp: &str) -> Vec<Block> {
    vec![Block::paragraph(
        format!("Cordoba Research Group | {note_label} | {timestamp}"),
        BlockStyle {
            spacing_after: Some(200),
            border_bottom: true,
            ..BlockStyle::default()
        },
    )]
}

fn footer_blocks() -> Vec<Block> {
    vec![
        Block::paragraph(
            "",
            BlockStyle {
                border_top: true,
                spacing_before: Some(100),
                ..BlockStyle::default()
            },
        ),
        Block::paragraph(
            "Cordoba Research Group Internal Information\t\tPage {PAGE} of {PAGES}",
            BlockStyle {
                alignment: Alignment::Center,
                size: Some(20),
                ..BlockStyle::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::upload::MemoryUpload;
    use crate::models::Author;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FailingUpload(&'static str);

    #[async_trait]
    impl ReadableBinary for FailingUpload {
        fn name(&self) -> &str {
            self.0
        }

        async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
            Err(std::io::Error::other("disk unplugged"))
        }
    }

    fn submission(note_type: NoteType) -> FormSubmission {
        FormSubmission {
            note_type,
            title: "Q3 Outlook".to_string(),
            topic: "Rates".to_string(),
            primary_author: Author {
                last_name: "Smith".to_string(),
                first_name: "Jane".to_string(),
                phone: String::new(),
            },
            co_authors: vec![],
            analysis: "para one\npara two".to_string(),
            key_takeaways: "- first\n- second".to_string(),
            content: "body".to_string(),
            cordoba_view: String::new(),
            images: vec![],
            generated_at: chrono::Local.with_ymd_and_hms(2026, 8, 6, 15, 5, 0).unwrap(),
        }
    }

    fn paragraph_texts(blocks: &[Block]) -> Vec<&str> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn heading_texts(blocks: &[Block]) -> Vec<&str> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn author_line_substitutes_na_without_double_wrapping() {
        let tree = assemble(&submission(NoteType::General), None).await;
        let texts = paragraph_texts(&tree.body);
        assert!(texts.contains(&"SMITH, JANE (N/A)"));
        assert!(!texts.iter().any(|t| t.contains("((")));
    }

    #[test]
    fn bracketed_phone_is_not_rewrapped() {
        assert_eq!(phone_display("(N/A)"), "(N/A)");
        assert_eq!(phone_display("44-7398344190"), "(44-7398344190)");
        assert_eq!(phone_display("  "), "(N/A)");
    }

    #[tokio::test]
    async fn general_note_has_no_equity_section() {
        let tree = assemble(&submission(NoteType::General), None).await;
        let headings = heading_texts(&tree.body);
        assert_eq!(
            headings,
            vec!["Q3 Outlook", "Key Takeaways", "Analysis and Commentary", "Content"]
        );
    }

    #[tokio::test]
    async fn equity_sections_come_in_fixed_order() {
        let equity = EquityFields {
            ticker: "CRG.L".to_string(),
            crg_rating: "Buy".to_string(),
            ..EquityFields::default()
        };
        let tree = assemble(&submission(NoteType::EquityResearch(equity)), None).await;
        let headings = heading_texts(&tree.body);
        assert_eq!(
            headings,
            vec![
                "Q3 Outlook",
                "Equity Research",
                "Valuation Summary",
                "Key Assumptions",
                "Scenario Notes",
                "Key Takeaways",
                "Analysis and Commentary",
                "Content",
            ]
        );
    }

    #[tokio::test]
    async fn cordoba_view_appears_only_when_non_blank() {
        let mut sub = submission(NoteType::General);
        sub.cordoba_view = "  \n ".to_string();
        let tree = assemble(&sub, None).await;
        assert!(!heading_texts(&tree.body).contains(&"Cordoba View"));

        sub.cordoba_view = "house view".to_string();
        let tree = assemble(&sub, None).await;
        assert!(heading_texts(&tree.body).contains(&"Cordoba View"));
    }

    #[tokio::test]
    async fn failed_image_leaves_a_numbering_gap() {
        let mut sub = submission(NoteType::General);
        sub.images = vec![
            Box::new(MemoryUpload::new("alpha.png", vec![1])),
            Box::new(FailingUpload("beta.png")),
            Box::new(MemoryUpload::new("gamma.jpeg", vec![2])),
        ];
        let tree = assemble(&sub, None).await;
        let texts = paragraph_texts(&tree.body);

        assert!(texts.contains(&"Figure 1: alpha"));
        assert!(texts.contains(&"Figure 3: gamma"));
        assert!(!texts.iter().any(|t| t.starts_with("Figure 2")));

        let images = tree
            .body
            .iter()
            .filter(|b| matches!(b, Block::Image { .. }))
            .count();
        assert_eq!(images, 2);
    }

    #[tokio::test]
    async fn figures_section_needs_at_least_one_surviving_image() {
        let mut sub = submission(NoteType::General);
        sub.images = vec![Box::new(FailingUpload("only.png"))];
        let tree = assemble(&sub, None).await;
        assert!(!heading_texts(&tree.body).contains(&"Figures and Charts"));

        sub.images = vec![Box::new(MemoryUpload::new("only.png", vec![9]))];
        let tree = assemble(&sub, None).await;
        assert!(heading_texts(&tree.body).contains(&"Figures and Charts"));
    }

    #[tokio::test]
    async fn empty_model_file_list_reads_none_uploaded() {
        let tree = assemble(
            &submission(NoteType::EquityResearch(EquityFields::default())),
            None,
        )
        .await;
        assert!(paragraph_texts(&tree.body).contains(&"None uploaded"));

        let equity = EquityFields {
            model_files: vec!["dcf_v3.xlsx".to_string(), "comps.xlsx".to_string()],
            ..EquityFields::default()
        };
        let tree = assemble(&submission(NoteType::EquityResearch(equity)), None).await;
        let bullets: Vec<&str> = tree
            .body
            .iter()
            .filter_map(|b| match b {
                Block::Bullet { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(bullets.contains(&"dcf_v3.xlsx"));
        assert!(bullets.contains(&"comps.xlsx"));
        assert!(!paragraph_texts(&tree.body).contains(&"None uploaded"));
    }

    #[tokio::test]
    async fn stats_table_reports_unavailable_without_market_data() {
        let tree = assemble(
            &submission(NoteType::EquityResearch(EquityFields::default())),
            None,
        )
        .await;
        let table = tree
            .body
            .iter()
            .find_map(|b| match b {
                Block::Table { rows, .. } => Some(rows),
                _ => None,
            })
            .expect("equity note carries a stats table");
        assert_eq!(table.len(), 4);
        assert!(table.iter().all(|row| row[1] == "unavailable"));
    }

    #[tokio::test]
    async fn header_carries_brand_note_type_and_timestamp() {
        let tree = assemble(&submission(NoteType::General), None).await;
        match &tree.header[0] {
            Block::Paragraph { text, style } => {
                assert_eq!(text, "Cordoba Research Group | Research Note | August 6, 2026 3:05 PM");
                assert!(style.border_bottom);
            }
            other => panic!("unexpected header block: {other:?}"),
        }
    }

    #[test]
    fn file_stem_strips_only_the_last_extension() {
        assert_eq!(file_stem("chart.final.png"), "chart.final");
        assert_eq!(file_stem("README"), "README");
        assert_eq!(file_stem(".gitignore"), ".gitignore");
    }
}
