//! Markdown notes: metadata, plain-text extraction and the document cache.

mod document;
mod library;

pub use document::{MarkdownDocument, MarkdownMetadata, extract_words, strip_markdown};
pub use library::MarkdownLibrary;
