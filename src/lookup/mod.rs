//! Interactive word lookup.
//!
//! A REPL that defines words as they are typed, with slash commands for the
//! context sentence, the target language and saving to the vocabulary.

/// Slash command parsing and autocomplete.
pub mod command;
mod session;
mod ui;

pub use session::{Definition, LookupSession};
