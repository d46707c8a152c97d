use anyhow::{Context, Result, bail};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use super::model::{
    Expression, ExpressionChanges, MANUAL_ORIGIN, Sentence, SentenceChanges, now_millis,
};
use crate::paths;

const EXPRESSION_COLUMNS: &str =
    "id, expression, meaning, status, kind, date, notes, sentences, connections";

/// The learner's expressions and example sentences, kept in SQLite.
#[derive(Debug, Clone)]
pub struct VocabularyStore {
    db_path: PathBuf,
}

impl VocabularyStore {
    /// Opens `vocabulary.db` in the application data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(paths::data_dir()?.join("vocabulary.db"))
    }

    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let store = Self { db_path };
        store.init_db()?;

        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS expressions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                expression TEXT NOT NULL,
                meaning TEXT NOT NULL DEFAULT '',
                status INTEGER NOT NULL DEFAULT 1,
                kind TEXT NOT NULL DEFAULT 'WORD',
                date INTEGER NOT NULL,
                notes TEXT NOT NULL DEFAULT '[]',
                sentences TEXT NOT NULL DEFAULT '[]',
                connections TEXT NOT NULL DEFAULT '{}'
            )",
            [],
        )
        .context("Failed to create expressions table")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sentences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                trans TEXT NOT NULL DEFAULT '',
                origin TEXT NOT NULL DEFAULT 'manual'
            )",
            [],
        )
        .context("Failed to create sentences table")?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_expressions_expression ON expressions(expression)",
            "CREATE INDEX IF NOT EXISTS idx_expressions_status ON expressions(status)",
            "CREATE INDEX IF NOT EXISTS idx_sentences_text ON sentences(text)",
        ] {
            conn.execute(index, []).context("Failed to create index")?;
        }

        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path).with_context(|| {
            format!(
                "Failed to open vocabulary database: {}",
                self.db_path.display()
            )
        })
    }

    pub fn find_expression_by_text(&self, text: &str) -> Result<Option<Expression>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {EXPRESSION_COLUMNS} FROM expressions WHERE expression = ?1 ORDER BY id LIMIT 1"
        );

        conn.query_row(&sql, [text], expression_from_row)
            .optional()
            .context("Failed to look up expression")
    }

    pub fn get_expression(&self, id: i64) -> Result<Option<Expression>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {EXPRESSION_COLUMNS} FROM expressions WHERE id = ?1");

        conn.query_row(&sql, [id], expression_from_row)
            .optional()
            .context("Failed to read expression")
    }

    /// Every expression, oldest first.
    pub fn list_expressions(&self) -> Result<Vec<Expression>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {EXPRESSION_COLUMNS} FROM expressions ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;

        stmt.query_map([], expression_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list expressions")
    }

    /// Inserts the expression (its `id` is ignored) and returns the new id.
    pub fn add_expression(&self, expression: &Expression) -> Result<i64> {
        let conn = self.connect()?;

        conn.execute(
            "INSERT INTO expressions
             (expression, meaning, status, kind, date, notes, sentences, connections)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                expression.expression,
                expression.meaning,
                expression.status,
                expression.kind,
                expression.date,
                to_json(&expression.notes)?,
                to_json(&expression.sentences)?,
                to_json(&expression.connections)?,
            ],
        )
        .context("Failed to insert expression")?;

        Ok(conn.last_insert_rowid())
    }

    /// Applies `changes` and stamps `date` with the current time.
    ///
    /// Returns `false` when no expression has this id.
    pub fn update_expression(&self, id: i64, changes: ExpressionChanges) -> Result<bool> {
        let mut assignments = vec!["date = ?"];
        let mut values = vec![Value::Integer(now_millis())];

        if let Some(expression) = changes.expression {
            assignments.push("expression = ?");
            values.push(Value::Text(expression));
        }
        if let Some(meaning) = changes.meaning {
            assignments.push("meaning = ?");
            values.push(Value::Text(meaning));
        }
        if let Some(status) = changes.status {
            assignments.push("status = ?");
            values.push(Value::Integer(status));
        }
        if let Some(kind) = changes.kind {
            assignments.push("kind = ?");
            values.push(Value::Text(kind.as_str().to_string()));
        }
        if let Some(notes) = changes.notes {
            assignments.push("notes = ?");
            values.push(Value::Text(to_json(&notes)?));
        }
        if let Some(sentences) = changes.sentences {
            assignments.push("sentences = ?");
            values.push(Value::Text(to_json(&sentences)?));
        }
        if let Some(connections) = changes.connections {
            assignments.push("connections = ?");
            values.push(Value::Text(to_json(&connections)?));
        }
        values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE expressions SET {} WHERE id = ?",
            assignments.join(", ")
        );
        let updated = self
            .connect()?
            .execute(&sql, params_from_iter(values))
            .context("Failed to update expression")?;

        Ok(updated > 0)
    }

    pub fn find_sentence_by_text(&self, text: &str) -> Result<Option<Sentence>> {
        let conn = self.connect()?;

        conn.query_row(
            "SELECT id, text, trans, origin FROM sentences WHERE text = ?1 ORDER BY id LIMIT 1",
            [text],
            sentence_from_row,
        )
        .optional()
        .context("Failed to look up sentence")
    }

    pub fn get_sentence(&self, id: i64) -> Result<Option<Sentence>> {
        let conn = self.connect()?;

        conn.query_row(
            "SELECT id, text, trans, origin FROM sentences WHERE id = ?1",
            [id],
            sentence_from_row,
        )
        .optional()
        .context("Failed to read sentence")
    }

    pub fn add_sentence(&self, sentence: &Sentence) -> Result<i64> {
        let conn = self.connect()?;

        conn.execute(
            "INSERT INTO sentences (text, trans, origin) VALUES (?1, ?2, ?3)",
            params![sentence.text, sentence.trans, sentence.origin],
        )
        .context("Failed to insert sentence")?;

        Ok(conn.last_insert_rowid())
    }

    /// Returns `false` when no sentence has this id.
    pub fn update_sentence(&self, id: i64, changes: SentenceChanges) -> Result<bool> {
        let mut assignments = Vec::new();
        let mut values = Vec::new();

        for (column, value) in [
            ("text = ?", changes.text),
            ("trans = ?", changes.trans),
            ("origin = ?", changes.origin),
        ] {
            if let Some(value) = value {
                assignments.push(column);
                values.push(Value::Text(value));
            }
        }

        if assignments.is_empty() {
            return Ok(self.get_sentence(id)?.is_some());
        }
        values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE sentences SET {} WHERE id = ?",
            assignments.join(", ")
        );
        let updated = self
            .connect()?
            .execute(&sql, params_from_iter(values))
            .context("Failed to update sentence")?;

        Ok(updated > 0)
    }

    /// The sentences with these ids, in the given order; unknown ids are skipped.
    pub fn sentences_by_ids(&self, ids: &[i64]) -> Result<Vec<Sentence>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, text, trans, origin FROM sentences WHERE id = ?1")?;

        let mut sentences = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(sentence) = stmt
                .query_row([id], sentence_from_row)
                .optional()
                .context("Failed to read sentence")?
            {
                sentences.push(sentence);
            }
        }

        Ok(sentences)
    }

    pub fn sentences_for_expression(&self, expression: &Expression) -> Result<Vec<Sentence>> {
        self.sentences_by_ids(&expression.sentences)
    }

    /// Returns the stored expression with this text, creating an active one
    /// if there is none.
    pub fn find_or_create_expression(&self, text: &str) -> Result<Expression> {
        if let Some(existing) = self.find_expression_by_text(text)? {
            return Ok(existing);
        }

        let mut expression = Expression::new(text);
        expression.id = self.add_expression(&expression)?;
        tracing::debug!(id = expression.id, expression = text, "created expression");

        Ok(expression)
    }

    /// Returns the stored sentence with this text, creating it if needed.
    ///
    /// `origin` defaults to `"manual"`. An existing sentence is returned
    /// unchanged.
    pub fn find_or_create_sentence(
        &self,
        text: &str,
        trans: &str,
        origin: Option<&str>,
    ) -> Result<Sentence> {
        if let Some(existing) = self.find_sentence_by_text(text)? {
            return Ok(existing);
        }

        let mut sentence = Sentence::new(text, trans, origin.unwrap_or(MANUAL_ORIGIN));
        sentence.id = self.add_sentence(&sentence)?;

        Ok(sentence)
    }

    /// Finds or creates the sentence and links it to the expression once.
    pub fn add_sentence_to_expression(
        &self,
        expression_id: i64,
        text: &str,
        trans: &str,
        origin: Option<&str>,
    ) -> Result<Sentence> {
        let Some(expression) = self.get_expression(expression_id)? else {
            bail!("Expression not found: {expression_id}");
        };

        let sentence = self.find_or_create_sentence(text, trans, origin)?;
        self.link_sentence(&expression, sentence.id)?;

        Ok(sentence)
    }

    /// Records a looked-up word: stores `meaning` and links `sentence` as an
    /// example when one is given.
    pub fn save_definition(
        &self,
        word: &str,
        meaning: &str,
        sentence: Option<&str>,
        origin: Option<&str>,
    ) -> Result<Expression> {
        let expression = self.find_or_create_expression(word.trim())?;
        self.update_expression(expression.id, ExpressionChanges::meaning(meaning))?;

        if let Some(sentence) = sentence.map(str::trim).filter(|s| !s.is_empty()) {
            self.add_sentence_to_expression(expression.id, sentence, "", origin)?;
        }

        self.get_expression(expression.id)?
            .with_context(|| format!("Expression disappeared: {}", expression.id))
    }

    /// Adds `sentence_id` to the expression's sentence list unless present.
    pub fn link_sentence(&self, expression: &Expression, sentence_id: i64) -> Result<()> {
        if expression.sentences.contains(&sentence_id) {
            return Ok(());
        }

        let mut sentences = expression.sentences.clone();
        sentences.push(sentence_id);
        self.update_expression(
            expression.id,
            ExpressionChanges {
                sentences: Some(sentences),
                ..ExpressionChanges::default()
            },
        )?;

        Ok(())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("Failed to encode column as JSON")
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn expression_from_row(row: &Row<'_>) -> rusqlite::Result<Expression> {
    Ok(Expression {
        id: row.get(0)?,
        expression: row.get(1)?,
        meaning: row.get(2)?,
        status: row.get(3)?,
        kind: row.get(4)?,
        date: row.get(5)?,
        notes: json_column(row, 6)?,
        sentences: json_column(row, 7)?,
        connections: json_column(row, 8)?,
    })
}

fn sentence_from_row(row: &Row<'_>) -> rusqlite::Result<Sentence> {
    Ok(Sentence {
        id: row.get(0)?,
        text: row.get(1)?,
        trans: row.get(2)?,
        origin: row.get(3)?,
    })
}
