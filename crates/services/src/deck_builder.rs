use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, error, warn};

use drill_core::model::{Deck, DocumentId, Flashcard, collect_candidates};
use storage::repository::{DocumentRepository, StorageError};

use crate::error::DocumentIssue;

/// Why a build produced no cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyDeckReason {
    /// No document ids were configured.
    NoDocuments,
    /// Every configured document failed to resolve.
    AllDocumentsFailed,
    /// Documents resolved but none held a question/answer child.
    NoCandidates,
    /// Candidates exist but the per-document quota is zero.
    ZeroQuota,
}

/// Outcome of one deck build.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckBuild {
    pub deck: Deck,
    pub issues: Vec<DocumentIssue>,
    pub documents_resolved: usize,
    pub candidates_found: usize,
}

impl DeckBuild {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            deck: Deck::empty(),
            issues: Vec::new(),
            documents_resolved: 0,
            candidates_found: 0,
        }
    }

    /// Explain an empty deck. Returns `None` when the deck has cards.
    #[must_use]
    pub fn empty_reason(&self) -> Option<EmptyDeckReason> {
        if !self.deck.is_empty() {
            return None;
        }
        let reason = if self.documents_resolved == 0 && self.issues.is_empty() {
            EmptyDeckReason::NoDocuments
        } else if self.documents_resolved == 0 {
            EmptyDeckReason::AllDocumentsFailed
        } else if self.candidates_found == 0 {
            EmptyDeckReason::NoCandidates
        } else {
            EmptyDeckReason::ZeroQuota
        };
        Some(reason)
    }
}

/// Draw up to `quota` cards uniformly at random, without replacement.
///
/// Uses a partial Fisher-Yates shuffle, so every subset of the resulting size is
/// equally likely and the drawn cards come out in random order.
pub fn draw_cards<R>(mut candidates: Vec<Flashcard>, quota: usize, rng: &mut R) -> Vec<Flashcard>
where
    R: Rng + ?Sized,
{
    let take = quota.min(candidates.len());
    let (chosen, _) = candidates.partial_shuffle(rng, take);
    chosen.to_vec()
}

/// Builds a practice deck by sampling a fixed quota of cards from each document.
#[derive(Clone)]
pub struct DeckBuilder {
    documents: Arc<dyn DocumentRepository>,
    rng: Arc<Mutex<StdRng>>,
}

impl DeckBuilder {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentRepository>) -> Self {
        Self {
            documents,
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    /// Use a fixed seed so builds are reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    /// Resolve each document in order and draw up to `per_document` cards from it.
    ///
    /// Cards from earlier documents always precede cards from later ones. A
    /// document that fails to resolve is skipped and recorded in
    /// [`DeckBuild::issues`]; the build itself never fails.
    pub async fn build(&self, document_ids: &[DocumentId], per_document: usize) -> DeckBuild {
        let mut build = DeckBuild::empty();
        let mut cards = Vec::new();

        for document_id in document_ids {
            let root = match self.documents.resolve_document(document_id).await {
                Ok(root) => root,
                Err(StorageError::NotFound) => {
                    warn!(%document_id, "document not found, skipping");
                    build.issues.push(DocumentIssue::NotFound {
                        document_id: document_id.clone(),
                    });
                    continue;
                }
                Err(err) => {
                    error!(%document_id, error = %err, "failed to resolve document, skipping");
                    build.issues.push(DocumentIssue::Resolution {
                        document_id: document_id.clone(),
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            build.documents_resolved += 1;

            let candidates = collect_candidates(&root);
            build.candidates_found += candidates.len();
            let found = candidates.len();

            let drawn = {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                draw_cards(candidates, per_document, &mut *rng)
            };
            debug!(%document_id, candidates = found, drawn = drawn.len(), "sampled document");
            cards.extend(drawn);
        }

        build.deck = Deck::new(cards);
        build
    }
}
