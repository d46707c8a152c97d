//! Flashcard review over the active vocabulary.

use anyhow::Result;

use crate::vocab::{Expression, ExpressionChanges, Sentence, VocabularyStore};

/// One expression with its example sentences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub expression: Expression,
    pub sentences: Vec<Sentence>,
}

/// A review session over every active expression.
///
/// Moving to another card always shows its front side.
#[derive(Debug)]
pub struct Deck {
    store: VocabularyStore,
    cards: Vec<Card>,
    index: usize,
    flipped: bool,
}

impl Deck {
    /// Builds a deck from the expressions whose status is positive.
    pub fn load(store: VocabularyStore) -> Result<Self> {
        let mut cards = Vec::new();
        for expression in store.list_expressions()? {
            if !expression.is_active() {
                continue;
            }
            let sentences = store.sentences_for_expression(&expression)?;
            cards.push(Card {
                expression,
                sentences,
            });
        }

        Ok(Self {
            store,
            cards,
            index: 0,
            flipped: false,
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Zero-based position of the current card.
    pub const fn position(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Card> {
        self.cards.get(self.index)
    }

    pub const fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn next(&mut self) {
        if !self.cards.is_empty() {
            self.index = (self.index + 1) % self.cards.len();
        }
        self.flipped = false;
    }

    pub fn previous(&mut self) {
        if !self.cards.is_empty() {
            self.index = (self.index + self.cards.len() - 1) % self.cards.len();
        }
        self.flipped = false;
    }

    /// Stores a new status for the current card.
    ///
    /// A non-positive status takes the card out of the deck; the next card
    /// then becomes current, wrapping to the first.
    pub fn set_status(&mut self, status: i64) -> Result<()> {
        let Some(card) = self.cards.get_mut(self.index) else {
            return Ok(());
        };

        self.store
            .update_expression(card.expression.id, ExpressionChanges::status(status))?;
        card.expression.status = status;

        if status <= 0 {
            tracing::debug!(expression = %card.expression.expression, status, "removed card from deck");
            self.cards.remove(self.index);
            if self.index >= self.cards.len() {
                self.index = 0;
            }
            self.flipped = false;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::STATUS_IGNORED;
    use tempfile::TempDir;

    fn create_store(temp_dir: &TempDir, words: &[&str]) -> VocabularyStore {
        let store = VocabularyStore::open(temp_dir.path().join("vocabulary.db")).unwrap();
        for word in words {
            store.find_or_create_expression(word).unwrap();
        }
        store
    }

    fn current_word(deck: &Deck) -> &str {
        &deck.current().unwrap().expression.expression
    }

    #[test]
    fn test_deck_skips_inactive_expressions() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir, &["ice", "fire", "water"]);
        let fire = store.find_expression_by_text("fire").unwrap().unwrap();
        store
            .update_expression(fire.id, ExpressionChanges::status(STATUS_IGNORED))
            .unwrap();

        let deck = Deck::load(store).unwrap();

        assert_eq!(deck.len(), 2);
        assert_eq!(current_word(&deck), "ice");
    }

    #[test]
    fn test_cards_carry_sentences() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir, &["ice"]);
        let ice = store.find_expression_by_text("ice").unwrap().unwrap();
        store
            .add_sentence_to_expression(ice.id, "Thin ice.", "薄冰。", None)
            .unwrap();

        let deck = Deck::load(store).unwrap();

        assert_eq!(deck.current().unwrap().sentences[0].trans, "薄冰。");
    }

    #[test]
    fn test_navigation_wraps_and_unflips() {
        let temp_dir = TempDir::new().unwrap();
        let mut deck = Deck::load(create_store(&temp_dir, &["a", "b", "c"])).unwrap();

        deck.flip();
        assert!(deck.is_flipped());
        deck.next();
        assert!(!deck.is_flipped());
        assert_eq!(current_word(&deck), "b");

        deck.next();
        deck.next();
        assert_eq!(current_word(&deck), "a");

        deck.previous();
        assert_eq!(current_word(&deck), "c");
        assert_eq!(deck.position(), 2);
    }

    #[test]
    fn test_ignoring_last_card_keeps_index_in_range() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir, &["a", "b"]);
        let mut deck = Deck::load(store.clone()).unwrap();

        deck.next();
        deck.set_status(STATUS_IGNORED).unwrap();

        assert_eq!(deck.len(), 1);
        assert_eq!(current_word(&deck), "a");
        let b = store.find_expression_by_text("b").unwrap().unwrap();
        assert_eq!(b.status, STATUS_IGNORED);

        deck.set_status(STATUS_IGNORED).unwrap();
        assert!(deck.is_empty());
        assert!(deck.current().is_none());
        deck.next();
        deck.set_status(2).unwrap();
    }

    #[test]
    fn test_positive_status_keeps_card() {
        let temp_dir = TempDir::new().unwrap();
        let mut deck = Deck::load(create_store(&temp_dir, &["a"])).unwrap();

        deck.set_status(3).unwrap();

        assert_eq!(deck.len(), 1);
        assert_eq!(deck.current().unwrap().expression.status, 3);
    }
}
