use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::SystemTime;

/// Compiles a pattern known at compile time.
#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    // expect is safe: every pattern below is a constant checked by the tests
    Regex::new(re).expect("invalid built-in markdown pattern")
}

static FRONT_MATTER: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?s)\A---\r?\n(.*?)\r?\n---"));
static TITLE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^#[ \t]+(.+?)[ \t]*$"));

/// Replacements applied in order to reduce markdown to plain prose.
static STRIP_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (pattern(r"(?s)\A---\r?\n.*?\r?\n---"), ""),
        (pattern(r"(?s)```.*?```"), ""),
        (pattern(r"``.*?``"), ""),
        (pattern(r"`[^`]*`"), ""),
        (pattern(r"!\[[^\]]*\]\([^)]*\)"), ""),
        (pattern(r"\[([^\]]*)\]\([^)]*\)"), "$1"),
        (pattern(r"(?m)^#{1,6}[ \t]+.*$"), ""),
        (pattern(r"(?m)^[ \t]*>[ \t]?"), ""),
        (pattern(r"(?m)^[ \t]*[-+*][ \t]+"), ""),
        (pattern(r"(?m)^[ \t]*\d+\.[ \t]+"), ""),
        (pattern(r"~~.*?~~"), ""),
        (pattern(r"\*\*(.*?)\*\*"), "$1"),
        (pattern(r"__(.*?)__"), "$1"),
        (pattern(r"\*(.*?)\*"), "$1"),
        (pattern(r"\b_(.*?)_\b"), "$1"),
    ]
});

/// Metadata found in a note's front matter, plus its title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownMetadata {
    /// `title` from the front matter, else the first `# ` heading.
    pub title: Option<String>,
    /// Every other `key: value` front matter line.
    pub fields: BTreeMap<String, String>,
}

impl MarkdownMetadata {
    /// Extracts metadata from the raw file content.
    pub fn parse(content: &str) -> Self {
        let mut metadata = Self::default();

        if let Some(front_matter) = FRONT_MATTER.captures(content).and_then(|c| c.get(1)) {
            for line in front_matter.as_str().lines() {
                let Some((key, value)) = line.split_once(':') else {
                    continue;
                };
                let (key, value) = (key.trim(), value.trim());
                if key.is_empty() || value.is_empty() {
                    continue;
                }
                if key == "title" {
                    metadata.title = Some(value.to_string());
                } else {
                    metadata.fields.insert(key.to_string(), value.to_string());
                }
            }
        }

        if metadata.title.is_none() {
            metadata.title = TITLE
                .captures(content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());
        }

        metadata
    }
}

/// A markdown note loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub path: PathBuf,
    pub filename: String,
    pub content: String,
    pub metadata: MarkdownMetadata,
    pub last_modified: SystemTime,
}

impl MarkdownDocument {
    pub fn new(path: PathBuf, content: String, last_modified: SystemTime) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let metadata = MarkdownMetadata::parse(&content);

        Self {
            path,
            filename,
            content,
            metadata,
            last_modified,
        }
    }

    /// Replaces the content and re-derives the metadata.
    pub fn set_content(&mut self, content: String) {
        self.metadata = MarkdownMetadata::parse(&content);
        self.content = content;
    }

    pub fn contains_ignore_case(&self, query: &str) -> bool {
        self.content.to_lowercase().contains(&query.to_lowercase())
    }

    /// Unique lowercased words of the note's prose, in order of first use.
    pub fn words(&self) -> Vec<String> {
        extract_words(&self.content)
    }
}

/// Removes markdown syntax, keeping the readable text.
///
/// Front matter, headings, code, images and struck-through text are dropped;
/// link text and emphasized text are kept.
pub fn strip_markdown(content: &str) -> String {
    STRIP_RULES
        .iter()
        .fold(content.to_string(), |text, (re, replacement)| {
            re.replace_all(&text, *replacement).into_owned()
        })
}

/// Unique lowercased words of `content`, in order of first use.
pub fn extract_words(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    strip_markdown(content)
        .split_whitespace()
        .map(|word| {
            word.to_lowercase()
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .filter(|word| seen.insert(word.clone()))
        .collect()
}
