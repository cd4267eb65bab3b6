//! Deterministic text-to-block rules for the free-form form fields.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{Block, BlockStyle};

/// Leading bullet marker: `-`, `*` or `•` plus any following whitespace.
fn bullet_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*•]\s*").unwrap())
}

/// Split into lines on `\n`, tolerating CRLF. Blank lines are kept.
fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l))
}

/// One paragraph block per line, verbatim (not trimmed). Blank lines become
/// empty paragraphs so the document keeps the author's vertical whitespace;
/// block count always equals line count.
pub fn paragraphs(text: &str, spacing_after: u32) -> Vec<Block> {
    lines(text)
        .map(|line| Block::paragraph(line, BlockStyle::spaced_after(spacing_after)))
        .collect()
}

/// Strip one leading bullet marker and trim the remainder. A no-op on lines
/// that carry no marker, so stripping is idempotent.
pub fn strip_bullet_marker(line: &str) -> String {
    bullet_marker().replace(line, "").trim().to_string()
}

/// What a bulleted field does with blank lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankLines {
    /// Blank line becomes an empty non-bulleted paragraph (key takeaways).
    Keep,
    /// Blank line is dropped entirely (key assumptions).
    Drop,
}

/// Bullet-item block per non-blank line, marker stripped.
pub fn bullets(text: &str, blanks: BlankLines, spacing_after: u32) -> Vec<Block> {
    let mut out = Vec::new();
    for line in lines(text) {
        if line.trim().is_empty() {
            if blanks == BlankLines::Keep {
                out.push(Block::paragraph("", BlockStyle::spaced_after(spacing_after)));
            }
            continue;
        }
        out.push(Block::bullet(
            strip_bullet_marker(line),
            BlockStyle::spaced_after(spacing_after),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .map(|b| match b {
                Block::Paragraph { text, .. } | Block::Bullet { text, .. } => text.clone(),
                other => panic!("unexpected block: {other:?}"),
            })
            .collect()
    }

    #[test]
    fn paragraph_count_equals_line_count() {
        let text = "first\n\n  third, untrimmed \nfourth";
        let blocks = paragraphs(text, 150);
        assert_eq!(blocks.len(), text.split('\n').count());
        assert_eq!(texts(&blocks), vec!["first", "", "  third, untrimmed ", "fourth"]);
    }

    #[test]
    fn crlf_input_splits_the_same_way() {
        let blocks = paragraphs("a\r\nb\r\n\r\nc", 150);
        assert_eq!(texts(&blocks), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn bullet_markers_are_stripped() {
        let blocks = bullets("- first\n* second\n• third\nbare", BlankLines::Drop, 100);
        assert_eq!(texts(&blocks), vec!["first", "second", "third", "bare"]);
        assert!(blocks.iter().all(|b| matches!(b, Block::Bullet { .. })));
    }

    #[test]
    fn stripping_is_idempotent() {
        let once = strip_bullet_marker("-   bullet text");
        let twice = strip_bullet_marker(&once);
        assert_eq!(once, "bullet text");
        assert_eq!(once, twice);
    }

    #[test]
    fn takeaway_blanks_become_plain_paragraphs() {
        let blocks = bullets("- one\n\n- two", BlankLines::Keep, 100);
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[0], Block::Bullet { .. }));
        assert!(matches!(&blocks[1], Block::Paragraph { text, .. } if text.is_empty()));
        assert!(matches!(blocks[2], Block::Bullet { .. }));
    }

    #[test]
    fn assumption_blanks_are_dropped() {
        let text = "- one\n\n\n- two\n";
        let blocks = bullets(text, BlankLines::Drop, 100);
        let non_blank = text.split('\n').filter(|l| !l.trim().is_empty()).count();
        assert_eq!(blocks.len(), non_blank);
    }
}
