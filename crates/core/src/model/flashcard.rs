use serde::Serialize;
use thiserror::Error;

use crate::model::{document::DocumentNode, ids::NodeId};

//
// ─── FLASHCARD ─────────────────────────────────────────────────────────────────
//

/// A question/answer pair lifted out of a document tree.
///
/// Both sides are trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flashcard {
    source_id: NodeId,
    question: String,
    answer: String,
}

impl Flashcard {
    /// Build a flashcard, trimming both sides.
    ///
    /// # Errors
    ///
    /// Returns `FlashcardError` if the question or answer is blank after trimming.
    pub fn new(
        source_id: NodeId,
        question: impl AsRef<str>,
        answer: impl AsRef<str>,
    ) -> Result<Self, FlashcardError> {
        let question = question.as_ref().trim();
        if question.is_empty() {
            return Err(FlashcardError::EmptyQuestion);
        }
        let answer = answer.as_ref().trim();
        if answer.is_empty() {
            return Err(FlashcardError::EmptyAnswer);
        }

        Ok(Self {
            source_id,
            question: question.to_owned(),
            answer: answer.to_owned(),
        })
    }

    /// Interpret a node as a flashcard candidate.
    ///
    /// The node's first child is the question and its second child the answer.
    /// Any further children are ignored.
    ///
    /// # Errors
    ///
    /// Returns `FlashcardError::MissingChildren` when the node has fewer than two
    /// children, or the blank-side error from [`Flashcard::new`].
    pub fn from_candidate(node: &DocumentNode) -> Result<Self, FlashcardError> {
        let [question, answer, ..] = node.children() else {
            return Err(FlashcardError::MissingChildren);
        };
        Self::new(node.id().clone(), question.content(), answer.content())
    }

    #[must_use]
    pub fn source_id(&self) -> &NodeId {
        &self.source_id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FlashcardError {
    #[error("candidate needs at least two children")]
    MissingChildren,

    #[error("question cannot be empty")]
    EmptyQuestion,

    #[error("answer cannot be empty")]
    EmptyAnswer,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
