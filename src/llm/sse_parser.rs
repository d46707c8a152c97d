//! Server-Sent Events (SSE) decoding for OpenAI-compatible streaming responses.
//!
//! Raw body bytes are split into complete lines by [`SseLineDecoder`], each
//! line is classified by [`parse_sse_line`], and [`chat_event_stream`] turns a
//! whole byte stream into accumulated-text [`StreamEvent`]s.

use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;
use std::fmt::Display;

use super::cancel::{CancellationToken, either_cancelled};
use super::client::StreamEvent;
use super::error::ChatError;

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "data: [DONE]";

/// Response structure for streaming chat completions.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

/// Classification of one SSE line.
#[derive(Debug)]
pub enum SseLine {
    /// Blank lines, comments and non-data fields.
    Ignored,
    /// The `data: [DONE]` terminal marker.
    Done,
    /// Content fragment of the first choice (empty when absent).
    Delta(String),
    /// A data line whose payload is not valid JSON.
    Malformed(serde_json::Error),
}

/// Incremental line splitter.
///
/// Bytes are buffered until a newline arrives, so a line (or a multi-byte
/// UTF-8 sequence) split across network chunks is decoded whole.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            lines.push(decode_line(&line[..line.len() - 1]));
        }
        lines
    }

    /// Returns the trailing unterminated line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(decode_line(&rest))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

/// Parses a single SSE line.
///
/// # Example
///
/// ```ignore
/// let line = r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#;
/// assert!(matches!(parse_sse_line(line), SseLine::Delta(s) if s == "Hello"));
/// ```
pub fn parse_sse_line(line: &str) -> SseLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return SseLine::Ignored;
    }
    if trimmed == DONE_MARKER {
        return SseLine::Done;
    }

    let Some(json_str) = line.strip_prefix(DATA_PREFIX) else {
        return SseLine::Ignored;
    };

    match serde_json::from_str::<StreamResponse>(json_str) {
        Ok(response) => SseLine::Delta(
            response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta)
                .and_then(|delta| delta.content)
                .unwrap_or_default(),
        ),
        Err(e) => SseLine::Malformed(e),
    }
}

/// Converts a raw SSE byte stream into chat events.
///
/// Every data line appends its fragment to the accumulated text and yields a
/// non-final [`StreamEvent::Chunk`]; the end of the body (or the `[DONE]`
/// marker) yields exactly one final chunk. If either cancellation token fires,
/// the stream ends without yielding anything further.
pub fn chat_event_stream<S, E>(
    byte_stream: S,
    handle: Option<CancellationToken>,
    signal: Option<CancellationToken>,
) -> impl Stream<Item = StreamEvent> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    async_stream::stream! {
        use futures_util::StreamExt;

        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut decoder = SseLineDecoder::new();
        let mut text = String::new();
        let is_cancelled = || {
            handle.as_ref().is_some_and(CancellationToken::is_cancelled)
                || signal.as_ref().is_some_and(CancellationToken::is_cancelled)
        };

        loop {
            let next = tokio::select! {
                biased;
                () = either_cancelled(handle.as_ref(), signal.as_ref()) => {
                    tracing::debug!("stream cancelled while waiting for data");
                    return;
                }
                next = byte_stream.next() => next,
            };

            let finished = next.is_none();
            let lines = match next {
                Some(Ok(chunk)) => decoder.push(&chunk),
                Some(Err(e)) => {
                    yield StreamEvent::Error(ChatError::Stream(e.to_string()));
                    return;
                }
                None => decoder.finish().into_iter().collect(),
            };

            for line in lines {
                match parse_sse_line(&line) {
                    SseLine::Ignored => {}
                    SseLine::Done => {
                        if is_cancelled() {
                            return;
                        }
                        yield StreamEvent::Chunk { text: text.clone(), done: true };
                        return;
                    }
                    SseLine::Delta(fragment) => {
                        if is_cancelled() {
                            return;
                        }
                        text.push_str(&fragment);
                        yield StreamEvent::Chunk { text: text.clone(), done: false };
                    }
                    SseLine::Malformed(e) => {
                        tracing::warn!(error = %e, line = %line, "skipping malformed stream line");
                    }
                }
            }

            if finished {
                if !is_cancelled() {
                    yield StreamEvent::Chunk { text, done: true };
                }
                return;
            }
        }
    }
}
