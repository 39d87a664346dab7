use serde::Serialize;

use drill_core::model::Flashcard;

use super::session::{PracticeSession, PracticeState};
use crate::deck_builder::EmptyDeckReason;

/// One-based progress through the deck, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// Everything a presentation layer needs to draw the practice panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PracticeView {
    pub state: PracticeState,
    pub card: Option<Flashcard>,
    pub remaining_secs: u32,
    pub progress: Option<Progress>,
    pub can_advance: bool,
    /// Set by the driver when the latest build came back empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<EmptyDeckReason>,
}

impl PracticeView {
    #[must_use]
    pub fn from_session(session: &PracticeSession) -> Self {
        let card = session.current_card().cloned();
        let progress = card.as_ref().map(|_| Progress {
            current: session.position() + 1,
            total: session.deck().len(),
        });

        Self {
            state: session.state(),
            card,
            remaining_secs: session.remaining(),
            progress,
            can_advance: session.can_advance(),
            empty_reason: None,
        }
    }

    #[must_use]
    pub fn with_empty_reason(mut self, reason: Option<EmptyDeckReason>) -> Self {
        self.empty_reason = reason;
        self
    }

    /// Single status line, e.g. `"Time left: 12s  Progress: 2/5"`.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self.progress {
            None => "No valid flashcards found".to_string(),
            Some(Progress { current, total }) if self.state == PracticeState::Finished => {
                format!("Time is up  Progress: {current}/{total}  (finished)")
            }
            Some(Progress { current, total }) => {
                format!("Time left: {}s  Progress: {current}/{total}", self.remaining_secs)
            }
        }
    }

    /// Hint shown under the empty-state message.
    #[must_use]
    pub fn empty_hint(&self) -> Option<&'static str> {
        if self.state != PracticeState::Empty {
            return None;
        }
        let hint = match self.empty_reason {
            Some(EmptyDeckReason::NoDocuments) => "Configure at least one document id.",
            Some(EmptyDeckReason::AllDocumentsFailed) => {
                "None of the configured documents could be loaded. Check the document ids."
            }
            Some(EmptyDeckReason::ZeroQuota) => "Cards per document is set to 0.",
            Some(EmptyDeckReason::NoCandidates) | None => {
                "Check the document ids, and that each card has a question and an answer child."
            }
        };
        Some(hint)
    }
}

impl Default for PracticeView {
    fn default() -> Self {
        Self {
            state: PracticeState::Empty,
            card: None,
            remaining_secs: 0,
            progress: None,
            can_advance: false,
            empty_reason: None,
        }
    }
}
