//! Subcommand implementations.

use anyhow::Result;
use std::sync::Arc;

use crate::llm::{ChatClient, LanguageAssistant, RequestRegistry};
use crate::settings::SettingsManager;

/// Word definition command handler.
pub mod define;

/// Interactive lookup command handler.
pub mod lookup;

/// Notes folder commands (tree, open, search, words).
pub mod notes;

/// Flashcard review command handler.
pub mod review;

/// Settings command handler.
pub mod settings;

/// Translation command handler.
pub mod translate;

/// Vocabulary command handler.
pub mod vocab;

/// Builds the language assistant from the stored settings.
///
/// Fails with [`crate::llm::ChatError::MissingApiKey`] before any request
/// is made when no key is configured.
pub(crate) fn load_assistant(to: Option<String>) -> Result<LanguageAssistant> {
    let settings = SettingsManager::new()?.load_or_default();
    let config = settings.openai.chat_config();
    config.api_key()?;

    let target_language = to
        .filter(|lang| !lang.trim().is_empty())
        .unwrap_or_else(|| settings.openai.target_language().to_string());
    let client = ChatClient::new(Arc::new(RequestRegistry::new()));

    Ok(LanguageAssistant::new(client, config, target_language))
}
