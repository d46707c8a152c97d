use anyhow::Result;
use clap::Parser;

use oxygen_notes::cli::commands::{define, lookup, notes, review, settings, translate, vocab};
use oxygen_notes::cli::{Args, Command};
use oxygen_notes::llm::ChatError;
use oxygen_notes::output::{self, OutputConfig};
use oxygen_notes::ui::Style;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    output::init(OutputConfig {
        quiet: args.quiet,
        no_color: args.no_color || std::env::var_os("NO_COLOR").is_some(),
        verbosity: args.verbose,
    });

    if let Err(e) = run(args.command).await {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("{} {e:#}", Style::error("Error:"));
        std::process::exit(exit_code(&e));
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Tree { json } => notes::run_tree(json),
        Command::Open { file } => notes::run_open(&file),
        Command::Search { query } => notes::run_search(&query),
        Command::Words { file } => notes::run_words(&file),
        Command::Settings { command } => settings::run_settings(command),
        Command::Translate { file, to, stream } => {
            translate::run_translate(translate::TranslateOptions { file, to, stream }).await
        }
        Command::Define {
            word,
            sentence,
            to,
            save,
        } => {
            define::run_define(define::DefineOptions {
                word,
                sentence,
                to,
                save,
            })
            .await
        }
        Command::Lookup { to } => lookup::run_lookup(to).await,
        Command::Vocab { command } => vocab::run_vocab(command),
        Command::Review => review::run_review(),
    }
}

fn exit_code(error: &anyhow::Error) -> exitcode::ExitCode {
    match error.downcast_ref::<ChatError>() {
        Some(ChatError::MissingApiKey) => exitcode::CONFIG,
        Some(ChatError::Transport { .. }) => exitcode::UNAVAILABLE,
        Some(_) => exitcode::PROTOCOL,
        None => exitcode::SOFTWARE,
    }
}
