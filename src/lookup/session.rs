use anyhow::Result;
use inquire::Text;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};

use super::command::{Input, SlashCommand, SlashCommandCompleter, parse_input};
use super::ui;
use crate::llm::{CancellationToken, ChatOptions, LanguageAssistant, WORD_LOOKUP_KEY};
use crate::ui::print_stream;
use crate::vocab::VocabularyStore;

/// The most recent successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub word: String,
    pub sentence: Option<String>,
    pub text: String,
}

/// An interactive dictionary session.
///
/// Each line is looked up as a word, in the context of the current
/// sentence when one is set. A new lookup aborts the previous one.
pub struct LookupSession {
    assistant: LanguageAssistant,
    store: VocabularyStore,
    sentence: Option<String>,
    last: Option<Definition>,
}

impl LookupSession {
    pub const fn new(assistant: LanguageAssistant, store: VocabularyStore) -> Self {
        Self {
            assistant,
            store,
            sentence: None,
            last: None,
        }
    }

    pub const fn assistant(&self) -> &LanguageAssistant {
        &self.assistant
    }

    pub fn sentence(&self) -> Option<&str> {
        self.sentence.as_deref()
    }

    pub async fn run(&mut self) -> Result<()> {
        ui::print_header();

        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);

        // Non-highlighted suggestions: gray
        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        // Highlighted suggestion: purple
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        loop {
            let input = Text::new("")
                .with_render_config(render_config)
                .with_autocomplete(SlashCommandCompleter)
                .with_help_message("Type a word to look up, /help for commands, Ctrl+C to quit")
                .prompt();

            match input {
                Ok(line) => match parse_input(&line) {
                    Input::Empty => {}
                    Input::Command(cmd) => {
                        if !self.handle_command(cmd) {
                            break;
                        }
                    }
                    Input::Word(word) => self.define_and_print(&word).await,
                },
                Err(
                    inquire::InquireError::OperationCanceled
                    | inquire::InquireError::OperationInterrupted,
                ) => {
                    println!(); // Clear line before goodbye message
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        ui::print_goodbye();
        Ok(())
    }

    /// Applies a slash command; returns `false` when the session should end.
    pub fn handle_command(&mut self, cmd: SlashCommand) -> bool {
        match cmd {
            SlashCommand::Sentence(sentence) => {
                match &sentence {
                    Some(text) => ui::print_success(&format!("Context sentence: {text}")),
                    None => ui::print_success("Context sentence cleared"),
                }
                self.sentence = sentence;
            }
            SlashCommand::To(Some(language)) => {
                ui::print_success(&format!("Target language set to {language}"));
                self.assistant.set_target_language(language);
            }
            SlashCommand::To(None) => ui::print_error("Usage: /to <language>"),
            SlashCommand::Save => self.save_last(),
            SlashCommand::Config => ui::print_config(self),
            SlashCommand::Help => ui::print_help(),
            SlashCommand::Quit => return false,
            SlashCommand::Unknown(cmd) => ui::print_error(&format!("Unknown command: /{cmd}")),
        }
        true
    }

    fn save_last(&self) {
        let Some(last) = &self.last else {
            ui::print_error("Nothing to save yet; look up a word first");
            return;
        };

        match self
            .store
            .save_definition(&last.word, &last.text, last.sentence.as_deref(), None)
        {
            Ok(expression) => {
                ui::print_success(&format!("Saved \"{}\"", expression.expression));
            }
            Err(e) => {
                tracing::error!(word = %last.word, error = %format!("{e:#}"), "failed to save word");
                ui::print_error(&format!("{e:#}"));
            }
        }
    }

    async fn define_and_print(&mut self, word: &str) {
        let signal = CancellationToken::new();
        let options = ChatOptions::default()
            .with_request_key(WORD_LOOKUP_KEY)
            .with_signal(signal.clone());
        let stream = self
            .assistant
            .define_word_stream(word, self.sentence.as_deref(), None, options);

        match print_stream(stream, &signal, "Looking up...").await {
            Ok(Some(text)) => {
                println!();
                self.last = Some(Definition {
                    word: word.to_string(),
                    sentence: self.sentence.clone(),
                    text,
                });
            }
            Ok(None) => tracing::info!(word, "lookup cancelled"),
            Err(e) => ui::print_error(&e.to_string()),
        }
    }
}
