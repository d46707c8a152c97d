use anyhow::{Result, bail};
use serde_json::Value;

use crate::cli::SettingsCommand;
use crate::settings::{API_KEY_ENV, Settings, SettingsManager};
use crate::ui::Style;

pub fn run_settings(command: Option<SettingsCommand>) -> Result<()> {
    let manager = SettingsManager::new()?;

    match command.unwrap_or(SettingsCommand::Show) {
        SettingsCommand::Show => show(&manager.load_or_default()),
        SettingsCommand::Get { key } => {
            let Some(value) = manager.get(&key) else {
                bail!("Unknown setting: '{key}'");
            };
            println!("{}", format_value(&value));
        }
        SettingsCommand::Set { key, value } => {
            let settings = manager.set(&key, parse_value(&value))?;
            let stored = settings.get(&key).unwrap_or(Value::Null);
            crate::status!(
                "{} {} = {}",
                Style::success("✓"),
                Style::label(&key),
                Style::value(format_value(&stored))
            );
        }
        SettingsCommand::Path => println!("{}", manager.settings_path().display()),
    }

    Ok(())
}

fn show(settings: &Settings) {
    let mut display = settings.clone();
    display.openai.api_key = mask_key(&settings.openai.get_api_key());

    println!("{}", Style::header("Settings"));
    match serde_json::to_string_pretty(&display) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "failed to render settings"),
    }

    if std::env::var_os(API_KEY_ENV).is_some() {
        println!();
        println!(
            "{}",
            Style::hint(format!("openai.apiKey is taken from {API_KEY_ENV}"))
        );
    }
}

/// Parses a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Strings print bare; everything else prints as JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Shows only the last four characters of a key.
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = key.chars().collect();
    let visible = chars.len().saturating_sub(4);
    format!("{}{}", "*".repeat(visible.min(8)), chars[visible..].iter().collect::<String>())
}
