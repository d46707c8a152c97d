use inquire::autocompletion::{Autocomplete, Replacement};

// Available slash commands: (command, description)
const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/sentence", "Set the context sentence (no text clears it)"),
    ("/to", "Change the target language"),
    ("/save", "Save the last word to the vocabulary"),
    ("/config", "Show current configuration"),
    ("/help", "Show available commands"),
    ("/quit", "Exit lookup mode"),
];

/// Slash command autocompleter
#[derive(Clone, Default)]
pub struct SlashCommandCompleter;

impl Autocomplete for SlashCommandCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, inquire::CustomUserError> {
        if !input.starts_with('/') {
            return Ok(vec![]);
        }

        let suggestions: Vec<String> = SLASH_COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| format!("{cmd}  {desc}"))
            .collect();

        Ok(suggestions)
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, inquire::CustomUserError> {
        let replacement =
            highlighted_suggestion.map(|s| s.split_whitespace().next().unwrap_or("").to_string());
        Ok(replacement)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// `None` clears the sentence.
    Sentence(Option<String>),
    To(Option<String>),
    Save,
    Config,
    Help,
    Quit,
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Word(String),
    Command(SlashCommand),
    Empty,
}

pub fn parse_input(input: &str) -> Input {
    let input = input.trim();

    if input.is_empty() {
        return Input::Empty;
    }

    input
        .strip_prefix('/')
        .map_or_else(|| Input::Word(input.to_string()), parse_slash_command)
}

fn parse_slash_command(cmd: &str) -> Input {
    let (name, rest) = cmd.split_once(char::is_whitespace).unwrap_or((cmd, ""));
    let argument = Some(rest.trim())
        .filter(|arg| !arg.is_empty())
        .map(str::to_string);

    let command = match name {
        "sentence" | "s" => SlashCommand::Sentence(argument),
        "to" => SlashCommand::To(argument),
        "save" => SlashCommand::Save,
        "config" => SlashCommand::Config,
        "help" => SlashCommand::Help,
        "quit" | "exit" | "q" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(cmd.split_whitespace().collect::<Vec<_>>().join(" ")),
    };

    Input::Command(command)
}
