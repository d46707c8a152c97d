use anyhow::Result;
use inquire::Select;
use std::fmt;

use crate::flashcard::{Card, Deck};
use crate::ui::{Style, handle_prompt_cancellation};
use crate::vocab::{STATUS_IGNORED, VocabularyStore};

/// Highest status reached by marking a card as known.
const MAX_STATUS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Flip,
    Known,
    Next,
    Previous,
    Ignore,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Flip => "Flip",
            Self::Known => "I know it",
            Self::Next => "Next",
            Self::Previous => "Previous",
            Self::Ignore => "Ignore this word",
            Self::Quit => "Quit",
        };
        f.write_str(label)
    }
}

pub fn run_review() -> Result<()> {
    let mut deck = Deck::load(VocabularyStore::open_default()?)?;
    if deck.is_empty() {
        crate::status!("No active words to review; add some with `oxygen vocab add`");
        return Ok(());
    }

    handle_prompt_cancellation(|| review_loop(&mut deck))
}

fn review_loop(deck: &mut Deck) -> Result<()> {
    let actions = vec![
        Action::Flip,
        Action::Known,
        Action::Next,
        Action::Previous,
        Action::Ignore,
        Action::Quit,
    ];

    while let Some(card) = deck.current() {
        print_card(card, deck.is_flipped(), deck.position(), deck.len());

        match Select::new("", actions.clone()).prompt()? {
            Action::Flip => deck.flip(),
            Action::Known => {
                let status = (card.expression.status + 1).min(MAX_STATUS);
                deck.set_status(status)?;
                deck.next();
            }
            Action::Next => deck.next(),
            Action::Previous => deck.previous(),
            Action::Ignore => deck.set_status(STATUS_IGNORED)?,
            Action::Quit => return Ok(()),
        }
    }

    println!("{}", Style::success("All cards reviewed."));
    Ok(())
}

fn print_card(card: &Card, flipped: bool, position: usize, total: usize) {
    println!();
    println!(
        "{} {}",
        Style::hint(format!("[{}/{}]", position + 1, total)),
        Style::header(&card.expression.expression)
    );

    if !flipped {
        return;
    }

    if card.expression.meaning.is_empty() {
        println!("{}", Style::hint("(no meaning saved)"));
    } else {
        println!("{}", card.expression.meaning);
    }
    for sentence in &card.sentences {
        println!("  {}", Style::secondary(&sentence.text));
    }
}
