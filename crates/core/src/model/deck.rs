use std::sync::Arc;

use crate::model::flashcard::Flashcard;

/// An ordered, immutable run of flashcards for one practice session.
///
/// Built fresh on every rebuild and replaced wholesale. Clones share storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Arc<[Flashcard]>,
}

impl Deck {
    #[must_use]
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self {
            cards: cards.into(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Flashcard> {
        self.cards.get(index)
    }

    #[must_use]
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    /// Index of the last card, or `None` for an empty deck.
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.cards.len().checked_sub(1)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FromIterator<Flashcard> for Deck {
    fn from_iter<I: IntoIterator<Item = Flashcard>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
