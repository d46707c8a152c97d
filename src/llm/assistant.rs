//! Translation and word-definition helpers on top of the chat clients.

use super::client::{ChatClient, ChatOptions, ChatStream, empty_stream};
use super::error::ChatError;
use super::prompt::{define_word_messages, translate_messages};
use super::types::{ChatConfig, DEFAULT_TEMPERATURE};

/// Request key for dictionary lookups; one lookup is in flight at a time.
pub const WORD_LOOKUP_KEY: &str = "word-lookup";

/// Request key for sentence translations.
pub const TRANSLATION_KEY: &str = "translation";

/// Language assistant bound to one endpoint configuration.
#[derive(Clone)]
pub struct LanguageAssistant {
    client: ChatClient,
    config: ChatConfig,
    target_language: String,
}

impl LanguageAssistant {
    /// `target_language` is used whenever a call does not name one.
    pub fn new(client: ChatClient, config: ChatConfig, target_language: impl Into<String>) -> Self {
        Self {
            client,
            config,
            target_language: target_language.into(),
        }
    }

    pub const fn client(&self) -> &ChatClient {
        &self.client
    }

    pub const fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn set_target_language(&mut self, target_language: impl Into<String>) {
        self.target_language = target_language.into();
    }

    /// Translates `text`. Blank input resolves to an empty string without a request.
    pub async fn translate(
        &self,
        text: &str,
        target_language: Option<&str>,
        request_key: Option<&str>,
    ) -> Result<String, ChatError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let messages = translate_messages(text, self.language(target_language));
        let response = self
            .client
            .complete_chat(&messages, &self.config, DEFAULT_TEMPERATURE, request_key)
            .await?;

        Ok(response.first_content().unwrap_or_default().to_string())
    }

    /// Defines `word`, optionally in the context of `sentence`.
    /// A blank word resolves to an empty string without a request.
    pub async fn define_word(
        &self,
        word: &str,
        sentence: Option<&str>,
        target_language: Option<&str>,
        request_key: Option<&str>,
    ) -> Result<String, ChatError> {
        if word.trim().is_empty() {
            return Ok(String::new());
        }

        let messages = define_word_messages(word, self.language(target_language), sentence);
        let response = self
            .client
            .complete_chat(&messages, &self.config, DEFAULT_TEMPERATURE, request_key)
            .await?;

        Ok(response.first_content().unwrap_or_default().to_string())
    }

    /// Streaming variant of [`Self::translate`].
    pub fn translate_stream(
        &self,
        text: &str,
        target_language: Option<&str>,
        options: ChatOptions,
    ) -> ChatStream {
        if text.trim().is_empty() {
            return empty_stream();
        }

        let messages = translate_messages(text, self.language(target_language));
        self.client.stream_chat(messages, &self.config, options)
    }

    /// Streaming variant of [`Self::define_word`].
    pub fn define_word_stream(
        &self,
        word: &str,
        sentence: Option<&str>,
        target_language: Option<&str>,
        options: ChatOptions,
    ) -> ChatStream {
        if word.trim().is_empty() {
            return empty_stream();
        }

        let messages = define_word_messages(word, self.language(target_language), sentence);
        self.client.stream_chat(messages, &self.config, options)
    }

    fn language<'a>(&'a self, target_language: Option<&'a str>) -> &'a str {
        target_language
            .filter(|lang| !lang.trim().is_empty())
            .unwrap_or(&self.target_language)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::llm::{RequestRegistry, collect_stream};
    use std::sync::Arc;

    // Port 9 (discard) is never expected to answer; blank input must not reach it.
    fn assistant() -> LanguageAssistant {
        let client = ChatClient::new(Arc::new(RequestRegistry::new()));
        let config = ChatConfig {
            api_key: "sk-test".to_string(),
            api_url: "http://127.0.0.1:9".to_string(),
            api_url_path: "/v1/chat/completions".to_string(),
            api_model: "gpt-4o".to_string(),
        };
        LanguageAssistant::new(client, config, "中文")
    }

    #[tokio::test]
    async fn test_blank_translation_short_circuits() {
        let assistant = assistant();
        assert_eq!(assistant.translate("", Some("中文"), None).await.unwrap(), "");
        assert_eq!(assistant.translate("  \n", None, None).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_blank_definition_short_circuits() {
        let assistant = assistant();
        assert_eq!(
            assistant.define_word("", None, Some("中文"), None).await.unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn test_blank_streams_finish_empty() {
        let assistant = assistant();

        let stream = assistant.define_word_stream(" ", None, None, ChatOptions::default());
        assert_eq!(collect_stream(stream).await.unwrap(), Some(String::new()));

        let stream = assistant.translate_stream("", None, ChatOptions::default());
        assert_eq!(collect_stream(stream).await.unwrap(), Some(String::new()));
        assert!(assistant.client().registry().is_empty());
    }

    #[test]
    fn test_language_fallback() {
        let mut assistant = assistant();
        assert_eq!(assistant.language(None), "中文");
        assert_eq!(assistant.language(Some("")), "中文");
        assert_eq!(assistant.language(Some("English")), "English");

        assistant.set_target_language("日本語");
        assert_eq!(assistant.target_language(), "日本語");
    }
}
