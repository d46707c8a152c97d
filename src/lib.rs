//! # oxygen - notes and vocabulary for language learners
//!
//! `oxygen` keeps a folder of markdown notes, looks up and translates words
//! through OpenAI-compatible chat endpoints, and collects the words into a
//! vocabulary reviewed with flashcards.
//!
//! ## Quick Start
//!
//! ```bash
//! # Configure the endpoint
//! oxygen settings set openai.apiKey sk-...
//! oxygen settings set openai.targetLanguage Français
//!
//! # Browse notes (~/oxygen2, or $OXYGEN_HOME)
//! oxygen tree
//! oxygen words travel/paris.md
//!
//! # Look words up and keep them
//! oxygen define serendipity --sentence "A happy serendipity." --save
//! oxygen lookup
//! oxygen review
//!
//! # Translate a file or stdin
//! cat report.md | oxygen translate --stream
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/oxygen/settings.json`:
//!
//! ```json
//! {
//!   "theme": "light",
//!   "appLanguage": "en",
//!   "openai": {
//!     "apiKey": "",
//!     "apiModel": "gpt-4o",
//!     "apiUrl": "https://api.openai.com",
//!     "apiUrlPath": "/v1/chat/completions",
//!     "targetLanguage": "中文"
//!   }
//! }
//! ```

/// Command-line interface definitions and handlers.
pub mod cli;

/// The notes folder and its file tree.
pub mod files;

/// Flashcard review over the vocabulary.
pub mod flashcard;

/// File system utilities.
pub mod fs;

/// Input reading from files and stdin.
pub mod input;

/// Chat completion clients, request cancellation and the language assistant.
pub mod llm;

/// Interactive word lookup.
pub mod lookup;

/// Markdown documents and the document cache.
pub mod markdown;

/// Output routing, quiet mode and log setup.
pub mod output;

/// XDG-style path utilities for settings, data and notes.
pub mod paths;

/// Settings file management.
pub mod settings;

/// Terminal UI components (spinner, colors, streamed output).
pub mod ui;

/// Expressions and example sentences stored in `SQLite`.
pub mod vocab;
