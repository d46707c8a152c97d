use anyhow::{Result, bail};

use crate::input::InputReader;
use crate::llm::{CancellationToken, ChatOptions, TRANSLATION_KEY};
use crate::ui::{Spinner, print_stream};

use super::load_assistant;

pub struct TranslateOptions {
    pub file: Option<String>,
    pub to: Option<String>,
    pub stream: bool,
}

pub async fn run_translate(options: TranslateOptions) -> Result<()> {
    let assistant = load_assistant(options.to)?;

    let source_text = InputReader::read(options.file.as_deref())?;
    if source_text.trim().is_empty() {
        bail!("Error: Input is empty");
    }

    tracing::info!(
        chars = source_text.chars().count(),
        to = assistant.target_language(),
        "translating"
    );

    if options.stream {
        let signal = CancellationToken::new();
        let options = ChatOptions::default()
            .with_request_key(TRANSLATION_KEY)
            .with_signal(signal.clone());
        let stream = assistant.translate_stream(&source_text, None, options);

        if print_stream(stream, &signal, "Translating...").await?.is_none() {
            crate::status!("Translation cancelled");
        }
        return Ok(());
    }

    let spinner = Spinner::new("Translating...");
    let translation = assistant
        .translate(&source_text, None, Some(TRANSLATION_KEY))
        .await;
    spinner.stop();

    println!("{}", translation?);
    Ok(())
}
