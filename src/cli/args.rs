use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "oxygen")]
#[command(about = "Markdown notes, word lookup and flashcards for language learners")]
#[command(version)]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress status output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the notes folder tree
    Tree {
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a note with its metadata
    Open {
        /// Note path, absolute or relative to the notes folder
        file: String,
    },
    /// Find notes containing a text (case-insensitive)
    Search { query: String },
    /// List the unique words of a note
    Words {
        /// Note path, absolute or relative to the notes folder
        file: String,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommand>,
    },
    /// Translate a file or stdin
    Translate {
        /// File to translate (reads from stdin if not provided)
        file: Option<String>,

        /// Target language (defaults to openai.targetLanguage)
        #[arg(short = 't', long = "to")]
        to: Option<String>,

        /// Print the translation as it arrives
        #[arg(short = 's', long)]
        stream: bool,
    },
    /// Define a word, optionally in the context of a sentence
    Define {
        word: String,

        /// Sentence the word appears in
        #[arg(short = 's', long)]
        sentence: Option<String>,

        /// Target language (defaults to openai.targetLanguage)
        #[arg(short = 't', long = "to")]
        to: Option<String>,

        /// Save the word and definition to the vocabulary
        #[arg(long)]
        save: bool,
    },
    /// Interactive word lookup
    Lookup {
        /// Target language (defaults to openai.targetLanguage)
        #[arg(short = 't', long = "to")]
        to: Option<String>,
    },
    /// Manage the vocabulary
    Vocab {
        #[command(subcommand)]
        command: VocabCommand,
    },
    /// Review active vocabulary with flashcards
    Review,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show all settings
    Show,
    /// Print one setting (dotted keys such as openai.apiModel)
    Get { key: String },
    /// Change one setting; the value is parsed as JSON, else taken as a string
    Set { key: String, value: String },
    /// Print the settings file path
    Path,
}

#[derive(Subcommand, Debug)]
pub enum VocabCommand {
    /// List expressions
    List {
        /// Include ignored expressions
        #[arg(short = 'a', long)]
        all: bool,
    },
    /// Add an expression (or update its meaning)
    Add {
        expression: String,

        #[arg(short = 'm', long)]
        meaning: Option<String>,
    },
    /// Show an expression with its example sentences
    Show { expression: String },
    /// Attach an example sentence to an expression
    Sentence {
        expression: String,
        text: String,

        /// Translation of the sentence
        #[arg(long, default_value = "")]
        trans: String,

        /// Where the sentence comes from
        #[arg(long)]
        origin: Option<String>,
    },
}
