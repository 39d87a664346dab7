use std::num::NonZeroU32;

use serde::Serialize;

use drill_core::model::{Deck, Flashcard};

use super::view::PracticeView;

/// Lifecycle of a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeState {
    /// No deck, or an empty one.
    Empty,
    /// A card is shown and its countdown is running.
    Active,
    /// The last card's countdown reached zero.
    Finished,
}

/// What a single [`PracticeSession::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to count down.
    Idle,
    CountedDown,
    /// Time ran out and the next card is now shown.
    Advanced,
    /// Time ran out on the last card.
    Finished,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Timed walk through a deck, one card at a time.
///
/// Every transition is a plain state change; the one-second cadence is owned by
/// whoever calls [`tick`](Self::tick).
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeSession {
    deck: Deck,
    position: usize,
    remaining: u32,
    time_limit: NonZeroU32,
}

impl PracticeSession {
    /// Create a session with no deck yet.
    #[must_use]
    pub fn new(time_limit: NonZeroU32) -> Self {
        Self::with_deck(Deck::empty(), time_limit)
    }

    #[must_use]
    pub fn with_deck(deck: Deck, time_limit: NonZeroU32) -> Self {
        Self {
            deck,
            position: 0,
            remaining: time_limit.get(),
            time_limit,
        }
    }

    #[must_use]
    pub fn state(&self) -> PracticeState {
        match self.deck.last_index() {
            None => PracticeState::Empty,
            Some(last) if self.position == last && self.remaining == 0 => PracticeState::Finished,
            Some(_) => PracticeState::Active,
        }
    }

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Zero-based index of the current card.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Seconds left on the current card.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn time_limit(&self) -> NonZeroU32 {
        self.time_limit
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        self.deck.get(self.position)
    }

    /// True while a later card exists.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.deck
            .last_index()
            .is_some_and(|last| self.position < last)
    }

    /// Replace the deck and restart from its first card.
    pub fn rebuild(&mut self, deck: Deck) {
        self.deck = deck;
        self.position = 0;
        self.remaining = self.time_limit.get();
    }

    /// Apply one second of countdown.
    ///
    /// Reaching zero on any card but the last moves to the next card with a full
    /// countdown. On the last card the countdown stays at zero.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state() != PracticeState::Active {
            return TickOutcome::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TickOutcome::CountedDown;
        }

        if self.can_advance() {
            self.move_next();
            TickOutcome::Advanced
        } else {
            TickOutcome::Finished
        }
    }

    /// Move to the next card on user request.
    ///
    /// Returns `false` (and changes nothing) on the last card or an empty deck.
    pub fn advance_manually(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        self.move_next();
        true
    }

    /// Change the per-card limit.
    ///
    /// The running countdown is not restarted; it is only clamped so it never
    /// exceeds the new limit. A finished session stays finished.
    pub fn set_time_limit(&mut self, time_limit: NonZeroU32) {
        self.time_limit = time_limit;
        self.remaining = self.remaining.min(time_limit.get());
    }

    /// Render-ready snapshot of the session.
    #[must_use]
    pub fn view(&self) -> PracticeView {
        PracticeView::from_session(self)
    }

    fn move_next(&mut self) {
        self.position += 1;
        self.remaining = self.time_limit.get();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
