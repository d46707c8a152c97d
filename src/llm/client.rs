use futures_util::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder, Response};
use std::pin::Pin;
use std::sync::Arc;

use super::cancel::{CancellationToken, either_cancelled};
use super::error::ChatError;
use super::registry::{RequestHandle, RequestRegistry};
use super::sse_parser::chat_event_stream;
use super::types::{ChatCompletionRequest, ChatConfig, ChatMessage, ChatResponse, DEFAULT_TEMPERATURE};

/// Incremental result of a streaming chat completion.
#[derive(Debug)]
pub enum StreamEvent {
    /// HTTP status of the response, emitted once headers arrive.
    Status(u16),
    /// Text accumulated so far; `done` is set on the single final chunk.
    Chunk { text: String, done: bool },
    /// Terminal failure. Cancellation is never reported this way.
    Error(ChatError),
}

pub type ChatStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Per-call options for [`ChatClient::stream_chat`].
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Sampling temperature; [`DEFAULT_TEMPERATURE`] when unset.
    pub temperature: Option<f32>,
    /// Logical operation key; a newer request under the same key aborts this one.
    pub request_key: Option<String>,
    /// Caller-owned cancellation signal.
    pub signal: Option<CancellationToken>,
}

impl ChatOptions {
    #[must_use]
    pub fn with_request_key(mut self, key: impl Into<String>) -> Self {
        self.request_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Removes a request from the registry when its call ends, however it ends.
struct Registration {
    registry: Arc<RequestRegistry>,
    key: String,
    handle: RequestHandle,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.registry.release(&self.key, &self.handle) {
            tracing::trace!(key = %self.key, "request released");
        }
    }
}

/// Client for OpenAI-compatible chat completion endpoints.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    registry: Arc<RequestRegistry>,
}

impl ChatClient {
    pub fn new(registry: Arc<RequestRegistry>) -> Self {
        Self::with_http_client(Client::new(), registry)
    }

    pub const fn with_http_client(http: Client, registry: Arc<RequestRegistry>) -> Self {
        Self { http, registry }
    }

    pub const fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    /// Starts a streaming chat completion.
    ///
    /// The request key (if any) is registered before this returns, so any
    /// earlier request under the same key is already cancelled when the new
    /// request is sent.
    pub fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        config: &ChatConfig,
        options: ChatOptions,
    ) -> ChatStream {
        let registration = self.register(options.request_key.as_deref());
        let handle_token = registration.as_ref().map(|r| r.handle.token().clone());
        let signal = options.signal;
        let temperature = options.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        let url = config.endpoint();
        let request = self.build_request(config, &messages, true, temperature);
        let request_key = options.request_key;

        Box::pin(async_stream::stream! {
            let registration = registration;

            let request = match request {
                Ok(request) => request,
                Err(e) => {
                    yield StreamEvent::Error(e);
                    return;
                }
            };

            tracing::debug!(%url, key = ?request_key, "sending streaming chat request");

            let response = tokio::select! {
                biased;
                () = either_cancelled(handle_token.as_ref(), signal.as_ref()) => {
                    tracing::info!(key = ?request_key, "request was cancelled");
                    return;
                }
                result = request.send() => result,
            };

            let response = match response {
                Ok(response) => response,
                Err(source) => {
                    yield StreamEvent::Error(ChatError::Transport { url, source });
                    return;
                }
            };

            let status = response.status();
            yield StreamEvent::Status(status.as_u16());

            if !status.is_success() {
                let body = tokio::select! {
                    biased;
                    () = either_cancelled(handle_token.as_ref(), signal.as_ref()) => return,
                    body = response.text() => body.unwrap_or_default(),
                };
                yield StreamEvent::Error(ChatError::Status { status: status.as_u16(), body });
                return;
            }

            let mut events = Box::pin(chat_event_stream(
                response.bytes_stream(),
                handle_token.clone(),
                signal.clone(),
            ));
            let mut terminated = false;
            while let Some(event) = events.next().await {
                terminated |= matches!(
                    event,
                    StreamEvent::Chunk { done: true, .. } | StreamEvent::Error(_)
                );
                yield event;
            }

            if !terminated {
                tracing::info!(key = ?request_key, "request was cancelled");
            }
            drop(registration);
        })
    }

    /// Runs a chat completion and returns the whole response.
    ///
    /// A newer request under the same `request_key` aborts this call with
    /// [`ChatError::Cancelled`].
    pub async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        config: &ChatConfig,
        temperature: f32,
        request_key: Option<&str>,
    ) -> Result<ChatResponse, ChatError> {
        let registration = self.register(request_key);
        let request = self.build_request(config, messages, false, temperature)?;
        let token = registration.as_ref().map(|r| r.handle.token().clone());

        tokio::select! {
            biased;
            () = either_cancelled(token.as_ref(), None) => {
                tracing::info!(key = ?request_key, "request was cancelled");
                Err(ChatError::Cancelled)
            }
            result = Self::send_and_parse(request, config.endpoint()) => {
                if let Err(e) = &result {
                    tracing::error!(error = %e, "chat completion failed");
                }
                result
            }
        }
    }

    async fn send_and_parse(request: RequestBuilder, url: String) -> Result<ChatResponse, ChatError> {
        tracing::debug!(%url, "sending chat request");

        let response: Response = request
            .send()
            .await
            .map_err(|source| ChatError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ChatError::Transport { url, source })?;

        Ok(serde_json::from_slice(&body)?)
    }

    fn register(&self, request_key: Option<&str>) -> Option<Registration> {
        request_key.map(|key| Registration {
            registry: Arc::clone(&self.registry),
            key: key.to_string(),
            handle: self.registry.register(key),
        })
    }

    fn build_request(
        &self,
        config: &ChatConfig,
        messages: &[ChatMessage],
        stream: bool,
        temperature: f32,
    ) -> Result<RequestBuilder, ChatError> {
        let api_key = config.api_key()?;

        let body = ChatCompletionRequest {
            model: &config.api_model,
            messages,
            stream,
            temperature,
        };

        Ok(self
            .http
            .post(config.endpoint())
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body))
    }
}

/// Drains a chat stream into its final text.
///
/// Returns `Ok(None)` when the stream ended without a final chunk, which only
/// happens when the request was cancelled.
pub async fn collect_stream(mut stream: ChatStream) -> Result<Option<String>, ChatError> {
    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Chunk { text, done: true } => return Ok(Some(text)),
            StreamEvent::Error(e) => return Err(e),
            StreamEvent::Status(_) | StreamEvent::Chunk { .. } => {}
        }
    }
    Ok(None)
}

/// A stream that finishes immediately with empty text.
pub fn empty_stream() -> ChatStream {
    Box::pin(futures_util::stream::once(async {
        StreamEvent::Chunk {
            text: String::new(),
            done: true,
        }
    }))
}
