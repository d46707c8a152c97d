//! Lookup mode UI components.

use crate::ui::Style;

use super::session::LookupSession;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_header() {
    println!(
        "{} {} - Word Lookup",
        Style::header("oxygen"),
        Style::version(format!("v{VERSION}"))
    );
    println!();
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

pub fn print_config(session: &LookupSession) {
    let config = session.assistant().config();

    println!("{}", Style::header("Configuration"));
    println!(
        "  {}      {}",
        Style::label("model"),
        Style::value(&config.api_model)
    );
    println!(
        "  {}         {}",
        Style::label("to"),
        Style::value(session.assistant().target_language())
    );
    println!(
        "  {}   {}",
        Style::label("endpoint"),
        Style::secondary(config.endpoint())
    );
    println!(
        "  {}   {}",
        Style::label("sentence"),
        session
            .sentence()
            .map_or_else(|| Style::hint("(none)"), Style::secondary)
    );
    println!();
}

pub fn print_help() {
    println!("{}", Style::header("Available commands"));
    for (command, description) in [
        ("/sentence <text>", "Look up words in the context of this sentence"),
        ("/sentence", "Clear the context sentence"),
        ("/to <language>", "Change the target language"),
        ("/save", "Save the last word and its definition"),
        ("/config", "Show current configuration"),
        ("/help", "Show this help"),
        ("/quit", "Exit lookup mode"),
    ] {
        println!(
            "  {:<18} {}",
            Style::command(command),
            Style::secondary(description)
        );
    }
    println!();
}

pub fn print_success(message: &str) {
    println!("{} {message}", Style::success("✓"));
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}
