use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Status of a newly created expression.
pub const STATUS_ACTIVE: i64 = 1;
/// Status of an expression the learner chose to ignore.
pub const STATUS_IGNORED: i64 = -1;
/// Origin recorded for sentences entered by hand.
pub const MANUAL_ORIGIN: &str = "manual";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpressionKind {
    #[default]
    Word,
    Phrase,
}

impl ExpressionKind {
    /// Phrases are expressions made of more than one word.
    pub fn classify(text: &str) -> Self {
        if text.split_whitespace().nth(1).is_some() {
            Self::Phrase
        } else {
            Self::Word
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Word => "WORD",
            Self::Phrase => "PHRASE",
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for ExpressionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ExpressionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "WORD" => Ok(Self::Word),
            "PHRASE" => Ok(Self::Phrase),
            other => Err(FromSqlError::Other(
                format!("unknown expression kind: {other}").into(),
            )),
        }
    }
}

/// A word or phrase the learner is collecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// Row id; 0 until the expression is stored.
    pub id: i64,
    pub expression: String,
    pub meaning: String,
    /// `> 0` active, `-1` ignored.
    pub status: i64,
    pub kind: ExpressionKind,
    /// Milliseconds since the Unix epoch of the last change.
    pub date: i64,
    pub notes: Vec<String>,
    /// Ids of example sentences, without duplicates.
    pub sentences: Vec<i64>,
    pub connections: BTreeMap<String, String>,
}

impl Expression {
    pub fn new(text: impl Into<String>) -> Self {
        let expression = text.into();
        Self {
            id: 0,
            kind: ExpressionKind::classify(&expression),
            expression,
            meaning: String::new(),
            status: STATUS_ACTIVE,
            date: now_millis(),
            notes: Vec::new(),
            sentences: Vec::new(),
            connections: BTreeMap::new(),
        }
    }

    pub const fn is_active(&self) -> bool {
        self.status > 0
    }
}

/// An example sentence, shared between expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub id: i64,
    pub text: String,
    pub trans: String,
    pub origin: String,
}

impl Sentence {
    pub fn new(text: impl Into<String>, trans: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            id: 0,
            text: text.into(),
            trans: trans.into(),
            origin: origin.into(),
        }
    }
}

/// A partial update of an [`Expression`]; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionChanges {
    pub expression: Option<String>,
    pub meaning: Option<String>,
    pub status: Option<i64>,
    pub kind: Option<ExpressionKind>,
    pub notes: Option<Vec<String>>,
    pub sentences: Option<Vec<i64>>,
    pub connections: Option<BTreeMap<String, String>>,
}

impl ExpressionChanges {
    pub fn meaning(meaning: impl Into<String>) -> Self {
        Self {
            meaning: Some(meaning.into()),
            ..Self::default()
        }
    }

    pub fn status(status: i64) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// A partial update of a [`Sentence`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceChanges {
    pub text: Option<String>,
    pub trans: Option<String>,
    pub origin: Option<String>,
}

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(ExpressionKind::classify("serendipity"), ExpressionKind::Word);
        assert_eq!(ExpressionKind::classify("  hello  "), ExpressionKind::Word);
        assert_eq!(ExpressionKind::classify("break the ice"), ExpressionKind::Phrase);
    }

    #[test]
    fn test_new_expression_defaults() {
        let expression = Expression::new("ice");

        assert_eq!(expression.id, 0);
        assert_eq!(expression.status, STATUS_ACTIVE);
        assert!(expression.is_active());
        assert!(expression.date > 0);
        assert!(expression.sentences.is_empty());
    }
}
