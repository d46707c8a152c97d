use anyhow::{Context, Result};

use crate::cli::VocabCommand;
use crate::ui::Style;
use crate::vocab::{Expression, ExpressionChanges, VocabularyStore};

pub fn run_vocab(command: VocabCommand) -> Result<()> {
    let store = VocabularyStore::open_default()?;

    match command {
        VocabCommand::List { all } => list(&store, all),
        VocabCommand::Add {
            expression,
            meaning,
        } => add(&store, &expression, meaning),
        VocabCommand::Show { expression } => show(&store, &expression),
        VocabCommand::Sentence {
            expression,
            text,
            trans,
            origin,
        } => {
            let stored = find(&store, &expression)?;
            let sentence =
                store.add_sentence_to_expression(stored.id, &text, &trans, origin.as_deref())?;
            crate::status!(
                "{} Linked sentence #{} to {}",
                Style::success("✓"),
                sentence.id,
                Style::value(&stored.expression)
            );
            Ok(())
        }
    }
}

fn list(store: &VocabularyStore, all: bool) -> Result<()> {
    let expressions: Vec<_> = store
        .list_expressions()?
        .into_iter()
        .filter(|e| all || e.is_active())
        .collect();

    if expressions.is_empty() {
        crate::status!("The vocabulary is empty");
        return Ok(());
    }

    for expression in &expressions {
        println!("{}", summary_line(expression));
    }

    Ok(())
}

fn add(store: &VocabularyStore, text: &str, meaning: Option<String>) -> Result<()> {
    let expression = store.find_or_create_expression(text.trim())?;
    if let Some(meaning) = meaning {
        store.update_expression(expression.id, ExpressionChanges::meaning(meaning))?;
    }

    crate::status!(
        "{} Saved {} ({})",
        Style::success("✓"),
        Style::value(&expression.expression),
        expression.kind
    );
    Ok(())
}

fn show(store: &VocabularyStore, text: &str) -> Result<()> {
    let expression = find(store, text)?;

    println!(
        "{}  {}",
        Style::header(&expression.expression),
        Style::status(status_label(expression.status))
    );
    if !expression.meaning.is_empty() {
        println!();
        println!("{}", expression.meaning);
    }
    for note in &expression.notes {
        println!("{} {note}", Style::label("note"));
    }

    let sentences = store.sentences_for_expression(&expression)?;
    if !sentences.is_empty() {
        println!();
        println!("{}", Style::header("Sentences"));
        for sentence in sentences {
            println!("  {}", sentence.text);
            if !sentence.trans.is_empty() {
                println!("  {}", Style::secondary(&sentence.trans));
            }
        }
    }

    Ok(())
}

fn find(store: &VocabularyStore, text: &str) -> Result<Expression> {
    store
        .find_expression_by_text(text.trim())?
        .with_context(|| format!("Expression not found: '{}'", text.trim()))
}

/// One line per expression: status, text and the first line of its meaning.
pub fn summary_line(expression: &Expression) -> String {
    let meaning = expression.meaning.lines().next().unwrap_or_default();
    format!(
        "{:<8} {}  {}",
        status_label(expression.status),
        expression.expression,
        meaning
    )
}

pub const fn status_label(status: i64) -> &'static str {
    match status {
        i64::MIN..=-1 => "ignored",
        0 => "new",
        1 => "learning",
        2 => "familiar",
        _ => "known",
    }
}
