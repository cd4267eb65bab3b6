use serde::Serialize;

/// Abstract document representation handed to the document serializer.
///
/// Produced once per submission and never mutated afterward. The byte-level
/// output format is the serializer's concern, not ours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTree {
    pub page: PageGeometry,
    pub header: Vec<Block>,
    pub footer: Vec<Block>,
    pub body: Vec<Block>,
}

/// Page margins in twentieths of a point (1440 = 1 inch).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageGeometry {
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            margin_top: 1440,
            margin_right: 1440,
            margin_bottom: 1440,
            margin_left: 1440,
        }
    }
}

/// One atomic content unit. Horizontal rules are empty paragraphs with a
/// bottom border. Footer text may carry the literal `{PAGE}` / `{PAGES}`
/// tokens, which the serializer replaces with page counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    Heading {
        text: String,
        level: u8,
        style: BlockStyle,
    },
    Paragraph {
        text: String,
        style: BlockStyle,
    },
    Bullet {
        text: String,
        level: u8,
        style: BlockStyle,
    },
    Image {
        /// Raw image bytes. Not serialized: the JSON rendering of the tree is
        /// for previews and the reference serializer, not for carrying blobs.
        #[serde(skip_serializing)]
        data: Vec<u8>,
        width: u32,
        height: u32,
        style: BlockStyle,
    },
    Table {
        rows: Vec<Vec<String>>,
        style: BlockStyle,
    },
}

impl Block {
    pub fn paragraph(text: impl Into<String>, style: BlockStyle) -> Self {
        Block::Paragraph { text: text.into(), style }
    }

    pub fn heading(text: impl Into<String>, level: u8, style: BlockStyle) -> Self {
        Block::Heading { text: text.into(), level, style }
    }

    pub fn bullet(text: impl Into<String>, style: BlockStyle) -> Self {
        Block::Bullet { text: text.into(), level: 0, style }
    }

    /// Empty paragraph whose bottom border renders as a horizontal rule.
    pub fn divider(spacing_before: Option<u32>, spacing_after: Option<u32>) -> Self {
        Block::Paragraph {
            text: String::new(),
            style: BlockStyle {
                border_bottom: true,
                spacing_before,
                spacing_after,
                ..BlockStyle::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-block style attributes. `size` is in half-points (20 = 10pt), matching
/// the serializer contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BlockStyle {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italics: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    pub alignment: Alignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing_before: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing_after: Option<u32>,
    #[serde(skip_serializing_if = "is_false")]
    pub border_top: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub border_bottom: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl BlockStyle {
    pub fn spaced_after(spacing: u32) -> Self {
        Self { spacing_after: Some(spacing), ..Self::default() }
    }
}
