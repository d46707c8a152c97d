use serde::{Deserialize, Serialize};

use super::error::ChatError;

/// Sampling temperature used when the caller does not pick one.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Endpoint and credentials for one chat completion call.
///
/// Supplied per call; usually derived from the `openai` settings block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub api_key: String,
    pub api_url: String,
    pub api_url_path: String,
    pub api_model: String,
}

impl ChatConfig {
    /// Full request URL: the base URL followed by the path, verbatim.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_url, self.api_url_path)
    }

    /// Returns the API key, refusing to send a request without one.
    pub fn api_key(&self) -> Result<&str, ChatError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            Err(ChatError::MissingApiKey)
        } else {
            Ok(key)
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub temperature: f32,
}

/// Body of a non-streaming chat completion response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if the model produced any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(api_key: &str) -> ChatConfig {
        ChatConfig {
            api_key: api_key.to_string(),
            api_url: "https://api.example.com".to_string(),
            api_url_path: "/v1/chat/completions".to_string(),
            api_model: "gpt-4o".to_string(),
        }
    }

    #[test]
    fn test_endpoint_concatenates_url_and_path() {
        assert_eq!(
            config("sk-test").endpoint(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        assert!(matches!(config("").api_key(), Err(ChatError::MissingApiKey)));
        assert!(matches!(config("  ").api_key(), Err(ChatError::MissingApiKey)));
        assert_eq!(config("sk-test").api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let request = ChatCompletionRequest {
            model: "gpt-4o",
            messages: &messages,
            stream: true,
            temperature: DEFAULT_TEMPERATURE,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_first_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Bonjour"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_content(), Some("Bonjour"));
    }

    #[test]
    fn test_first_content_missing() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(response.first_content(), None);

        let response: ChatResponse = serde_json::from_str(r#"{"choices":[{}]}"#).unwrap();
        assert_eq!(response.first_content(), None);
    }
}
