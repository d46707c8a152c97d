//! The vocabulary collection: expressions, example sentences and their links.

mod model;
mod store;

pub use model::{
    Expression, ExpressionChanges, ExpressionKind, MANUAL_ORIGIN, STATUS_ACTIVE, STATUS_IGNORED,
    Sentence, SentenceChanges,
};
pub use store::VocabularyStore;
