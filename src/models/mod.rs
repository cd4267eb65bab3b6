mod content_tree;
mod market;
mod submission;

pub use content_tree::{Alignment, Block, BlockStyle, ContentTree, PageGeometry};
pub use market::{MarketStats, PricePoint, RangeTag};
pub use submission::{
    Author, AuthorInput, EquityFields, FormSubmission, NoteRequest, NoteType,
};
