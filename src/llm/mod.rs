mod assistant;
mod cancel;
mod client;
mod error;
mod prompt;
mod registry;
mod sse_parser;
mod types;

pub use assistant::{LanguageAssistant, TRANSLATION_KEY, WORD_LOOKUP_KEY};
pub use cancel::CancellationToken;
pub use client::{ChatClient, ChatOptions, ChatStream, StreamEvent, collect_stream, empty_stream};
pub use error::ChatError;
pub use prompt::{define_word_messages, translate_messages};
pub use registry::{RequestHandle, RequestRegistry};
pub use sse_parser::{SseLine, SseLineDecoder, chat_event_stream, parse_sse_line};
pub use types::{
    ChatConfig, ChatMessage, ChatResponse, Choice, DEFAULT_TEMPERATURE, ResponseMessage, Role,
};
