use super::types::ChatMessage;

pub const TRANSLATE_PROMPT_TEMPLATE: &str = "You are a professional translator. \
     Translate the following text into {target_language}. \
     Only respond with the translation without any explanations or additional text.";

pub const DEFINE_PROMPT_TEMPLATE: &str = "You are an intelligent dictionary assistant. \
     Provide a clear, concise definition of the given word in {target_language}. \
     Include part of speech, pronunciation if relevant";

#[allow(clippy::literal_string_with_formatting_args)]
fn fill(template: &str, target_language: &str) -> String {
    // {target_language} is a placeholder for string replacement, not a format argument
    template.replace("{target_language}", target_language)
}

/// Conversation asking for a bare translation of `text`.
pub fn translate_messages(text: &str, target_language: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(fill(TRANSLATE_PROMPT_TEMPLATE, target_language)),
        ChatMessage::user(text),
    ]
}

/// Conversation asking for a dictionary-style definition of `word`,
/// optionally in the context of the sentence it was found in.
pub fn define_word_messages(
    word: &str,
    target_language: &str,
    context_sentence: Option<&str>,
) -> Vec<ChatMessage> {
    let question = match context_sentence.map(str::trim) {
        Some(sentence) if !sentence.is_empty() => format!(
            "Define the word: \"{word}\" in the context of the following sentence: \"{sentence}\""
        ),
        _ => format!("Define the word: \"{word}\""),
    };

    vec![
        ChatMessage::system(fill(DEFINE_PROMPT_TEMPLATE, target_language)),
        ChatMessage::user(question),
    ]
}
