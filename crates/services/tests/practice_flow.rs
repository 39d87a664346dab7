use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use drill_core::model::{DocumentId, DocumentNode, PracticeSettings, PracticeSettingsDraft};
use services::{DeckBuilder, EmptyDeckReason, PracticeDriver, PracticeState, PracticeView};
use storage::{DocumentRepository, InMemoryRepository, StorageError};
use tokio::sync::watch;
use tokio::time::sleep;

fn document(id: &str, cards: usize) -> DocumentNode {
    let children = (0..cards)
        .map(|n| {
            DocumentNode::new(format!("{id}-{n}"), "").with_children(vec![
                DocumentNode::leaf(format!("{id}-{n}-q"), format!("{id} question {n}")),
                DocumentNode::leaf(format!("{id}-{n}-a"), format!("{id} answer {n}")),
            ])
        })
        .collect();
    DocumentNode::new(id, id).with_children(children)
}

fn repository(docs: Vec<DocumentNode>) -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    for doc in docs {
        repo.insert_document(doc).unwrap();
    }
    repo
}

fn settings(ids: &str, per_doc: u32, secs: u32) -> PracticeSettings {
    PracticeSettingsDraft {
        document_ids: ids.into(),
        cards_per_document: per_doc,
        time_limit_secs: secs,
    }
    .validate()
    .unwrap()
}

async fn wait_until(
    views: &mut watch::Receiver<PracticeView>,
    pred: impl FnMut(&PracticeView) -> bool,
) -> PracticeView {
    views.wait_for(pred).await.unwrap().clone()
}

fn current(view: &PracticeView) -> Option<usize> {
    view.progress.map(|p| p.current)
}

/// Resolves ids starting with `slow` only after a delay.
struct SlowRepository {
    inner: InMemoryRepository,
}

#[async_trait]
impl DocumentRepository for SlowRepository {
    async fn resolve_document(&self, id: &DocumentId) -> Result<Arc<DocumentNode>, StorageError> {
        if id.as_str().starts_with("slow") {
            sleep(Duration::from_secs(5)).await;
        }
        self.inner.resolve_document(id).await
    }
}

#[tokio::test(start_paused = true)]
async fn countdown_advances_and_freezes_on_last_card() {
    let repo = repository(vec![document("A", 3), document("B", 1)]);
    let builder = DeckBuilder::new(Arc::new(repo)).with_seed(8);
    let handle = PracticeDriver::spawn(builder, settings("A, B", 2, 3));
    let mut views = handle.subscribe();

    let view = wait_until(&mut views, |v| v.state == PracticeState::Active).await;
    assert_eq!(view.progress.map(|p| p.total), Some(3));
    assert_eq!(view.remaining_secs, 3);
    assert!(view.card.unwrap().source_id().as_str().starts_with("A-"));

    sleep(Duration::from_millis(3500)).await;
    let view = handle.view();
    assert_eq!(current(&view), Some(2));
    assert_eq!(view.remaining_secs, 3);

    handle.advance().unwrap();
    let view = wait_until(&mut views, |v| current(v) == Some(3)).await;
    assert_eq!(view.remaining_secs, 3);
    assert!(!view.can_advance);
    assert_eq!(view.card.unwrap().source_id().as_str(), "B-0");

    sleep(Duration::from_millis(3500)).await;
    let view = handle.view();
    assert_eq!(view.state, PracticeState::Finished);
    assert_eq!(view.remaining_secs, 0);
    assert_eq!(current(&view), Some(3));

    // Frozen: no further ticks, manual advance ignored.
    handle.advance().unwrap();
    sleep(Duration::from_secs(5)).await;
    let view = handle.view();
    assert_eq!(view.state, PracticeState::Finished);
    assert_eq!(current(&view), Some(3));

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn latest_configuration_wins() {
    let repo = SlowRepository {
        inner: repository(vec![document("slow", 4), document("fast", 2)]),
    };
    let builder = DeckBuilder::new(Arc::new(repo)).with_seed(2);
    let handle = PracticeDriver::spawn(builder, settings("slow", 10, 60));
    handle.configure(settings("fast", 10, 60)).unwrap();
    let mut views = handle.subscribe();

    let view = wait_until(&mut views, |v| v.state == PracticeState::Active).await;
    assert_eq!(view.progress.map(|p| p.total), Some(2));

    sleep(Duration::from_secs(10)).await;
    let view = handle.view();
    assert_eq!(view.progress.map(|p| p.total), Some(2));
    assert!(view.card.unwrap().source_id().as_str().starts_with("fast-"));

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn empty_document_list_reports_no_cards() {
    let builder = DeckBuilder::new(Arc::new(InMemoryRepository::new()));
    let handle = PracticeDriver::spawn(builder, settings(" , ", 5, 60));
    let mut views = handle.subscribe();

    let view = wait_until(&mut views, |v| v.empty_reason.is_some()).await;
    assert_eq!(view.state, PracticeState::Empty);
    assert_eq!(view.empty_reason, Some(EmptyDeckReason::NoDocuments));
    assert!(view.card.is_none());
    assert_eq!(view.status_line(), "No valid flashcards found");

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unknown_documents_are_reported_as_failed() {
    let builder = DeckBuilder::new(Arc::new(repository(vec![document("A", 1)])));
    let handle = PracticeDriver::spawn(builder, settings("nope", 5, 60));
    let mut views = handle.subscribe();

    let view = wait_until(&mut views, |v| v.empty_reason.is_some()).await;
    assert_eq!(view.empty_reason, Some(EmptyDeckReason::AllDocumentsFailed));

    handle.configure(settings("nope, A", 5, 60)).unwrap();
    let view = wait_until(&mut views, |v| v.state == PracticeState::Active).await;
    assert_eq!(view.progress.map(|p| p.total), Some(1));
    assert_eq!(view.empty_reason, None);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shorter_time_limit_applies_to_running_card() {
    let builder = DeckBuilder::new(Arc::new(repository(vec![document("A", 2)]))).with_seed(4);
    let handle = PracticeDriver::spawn(builder, settings("A", 5, 10));
    let mut views = handle.subscribe();
    wait_until(&mut views, |v| v.state == PracticeState::Active).await;

    sleep(Duration::from_millis(2500)).await;
    assert_eq!(handle.view().remaining_secs, 8);

    handle.configure(settings("A", 5, 5)).unwrap();
    let view = wait_until(&mut views, |v| v.remaining_secs == 5).await;
    assert_eq!(current(&view), Some(1));

    // Five more seconds run the clamped countdown out and move on.
    sleep(Duration::from_millis(5500)).await;
    let view = handle.view();
    assert_eq!(current(&view), Some(2));
    assert_eq!(view.remaining_secs, 5);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_releases_the_session() {
    let builder = DeckBuilder::new(Arc::new(repository(vec![document("A", 2)])));
    let handle = PracticeDriver::spawn(builder, settings("A", 1, 30));
    let mut views = handle.subscribe();

    handle.shutdown().await.unwrap();

    while views.changed().await.is_ok() {}
    assert!(views.has_changed().is_err());
}
