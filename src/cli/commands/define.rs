use anyhow::Result;

use crate::llm::{CancellationToken, ChatOptions, WORD_LOOKUP_KEY};
use crate::ui::{Style, print_stream};
use crate::vocab::VocabularyStore;

use super::load_assistant;

pub struct DefineOptions {
    pub word: String,
    pub sentence: Option<String>,
    pub to: Option<String>,
    pub save: bool,
}

pub async fn run_define(options: DefineOptions) -> Result<()> {
    let assistant = load_assistant(options.to)?;

    let signal = CancellationToken::new();
    let chat_options = ChatOptions::default()
        .with_request_key(WORD_LOOKUP_KEY)
        .with_signal(signal.clone());
    let stream = assistant.define_word_stream(
        &options.word,
        options.sentence.as_deref(),
        None,
        chat_options,
    );

    let Some(definition) = print_stream(stream, &signal, "Looking up...").await? else {
        crate::status!("Lookup cancelled");
        return Ok(());
    };

    if options.save && !definition.trim().is_empty() {
        let store = VocabularyStore::open_default()?;
        let expression = store.save_definition(
            &options.word,
            &definition,
            options.sentence.as_deref(),
            None,
        )?;
        crate::status!(
            "{} Saved {}",
            Style::success("✓"),
            Style::value(&expression.expression)
        );
    }

    Ok(())
}
