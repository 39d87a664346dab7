use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use drill_core::model::PracticeSettings;

use super::session::{PracticeSession, PracticeState, TickOutcome};
use super::view::PracticeView;
use crate::deck_builder::{DeckBuild, DeckBuilder, EmptyDeckReason};
use crate::error::DriverError;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum Command {
    Configure(PracticeSettings),
    Advance,
    Shutdown,
}

/// Client side of a running practice session.
///
/// Dropping the handle (or calling [`shutdown`](Self::shutdown)) stops the
/// session task and its timer together.
pub struct PracticeHandle {
    commands: mpsc::UnboundedSender<Command>,
    views: watch::Receiver<PracticeView>,
    task: JoinHandle<()>,
}

impl PracticeHandle {
    /// Deliver a configuration-changed event.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Closed` if the session task has stopped.
    pub fn configure(&self, settings: PracticeSettings) -> Result<(), DriverError> {
        self.send(Command::Configure(settings))
    }

    /// Ask for the next card. Ignored on the last card.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Closed` if the session task has stopped.
    pub fn advance(&self) -> Result<(), DriverError> {
        self.send(Command::Advance)
    }

    /// Observe view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PracticeView> {
        self.views.clone()
    }

    /// Snapshot of the latest view.
    #[must_use]
    pub fn view(&self) -> PracticeView {
        self.views.borrow().clone()
    }

    /// Tear the session down and wait for its task to finish.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Join` if the session task panicked.
    pub async fn shutdown(self) -> Result<(), DriverError> {
        // The task may already be gone; joining below still reports its outcome.
        let _ = self.commands.send(Command::Shutdown);
        self.task.await?;
        Ok(())
    }

    fn send(&self, command: Command) -> Result<(), DriverError> {
        self.commands.send(command).map_err(|_| DriverError::Closed)
    }
}

/// Owns the countdown timer and rebuild sequencing for one session.
pub struct PracticeDriver {
    builder: DeckBuilder,
    settings: PracticeSettings,
    session: PracticeSession,
    empty_reason: Option<EmptyDeckReason>,
    sequence: u64,
    in_flight: Option<JoinHandle<()>>,
    builds: mpsc::UnboundedSender<(u64, DeckBuild)>,
    views: watch::Sender<PracticeView>,
}

impl PracticeDriver {
    /// Start a session on the current tokio runtime and kick off the first build.
    #[must_use]
    pub fn spawn(builder: DeckBuilder, settings: PracticeSettings) -> PracticeHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (builds_tx, builds_rx) = mpsc::unbounded_channel();
        let session = PracticeSession::new(settings.time_limit());
        let (views_tx, views_rx) = watch::channel(session.view());

        let driver = Self {
            builder,
            settings,
            session,
            empty_reason: None,
            sequence: 0,
            in_flight: None,
            builds: builds_tx,
            views: views_tx,
        };
        let task = tokio::spawn(driver.run(commands_rx, builds_rx));

        PracticeHandle {
            commands: commands_tx,
            views: views_rx,
            task,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut builds: mpsc::UnboundedReceiver<(u64, DeckBuild)>,
    ) {
        let mut ticker = new_ticker();
        self.request_rebuild();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Configure(settings)) => self.configure(settings, &mut ticker),
                    Some(Command::Advance) => {
                        if self.session.advance_manually() {
                            ticker.reset();
                            self.publish();
                        }
                    }
                    Some(Command::Shutdown) | None => break,
                },
                Some((sequence, build)) = builds.recv() => {
                    if self.apply_build(sequence, build) {
                        ticker.reset();
                    }
                }
                _ = ticker.tick(), if self.session.state() == PracticeState::Active => {
                    match self.session.tick() {
                        TickOutcome::Advanced => debug!(position = self.session.position(), "time up, next card"),
                        TickOutcome::Finished => info!("last card timed out, session finished"),
                        TickOutcome::CountedDown | TickOutcome::Idle => {}
                    }
                    self.publish();
                }
            }
        }

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        info!("practice session closed");
    }

    fn configure(&mut self, settings: PracticeSettings, ticker: &mut Interval) {
        let change = self.settings.diff(&settings);
        self.settings = settings;
        if change.is_empty() {
            return;
        }

        if change.time_limit_changed {
            self.session.set_time_limit(self.settings.time_limit());
            ticker.reset();
            debug!(secs = self.settings.time_limit().get(), "time limit changed");
        }
        if change.deck_changed {
            self.request_rebuild();
        }
        self.publish();
    }

    /// Start a build for the current settings, superseding any build in flight.
    fn request_rebuild(&mut self) {
        self.sequence += 1;
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }

        let sequence = self.sequence;
        let builder = self.builder.clone();
        let document_ids = self.settings.document_ids().to_vec();
        let per_document = self.settings.cards_per_document();
        let builds = self.builds.clone();
        debug!(sequence, documents = document_ids.len(), "deck build requested");

        self.in_flight = Some(tokio::spawn(async move {
            let build = builder.build(&document_ids, per_document).await;
            // The driver may have shut down meanwhile.
            let _ = builds.send((sequence, build));
        }));
    }

    /// Apply a finished build unless a newer one was requested. Returns whether
    /// the deck was replaced.
    fn apply_build(&mut self, sequence: u64, build: DeckBuild) -> bool {
        if sequence != self.sequence {
            debug!(sequence, latest = self.sequence, "discarding stale deck build");
            return false;
        }
        self.in_flight = None;

        info!(
            sequence,
            cards = build.deck.len(),
            issues = build.issues.len(),
            "deck rebuilt"
        );
        self.empty_reason = build.empty_reason();
        self.session.rebuild(build.deck);
        self.publish();
        true
    }

    fn publish(&self) {
        let view = self.session.view().with_empty_reason(self.empty_reason);
        self.views.send_replace(view);
    }
}

fn new_ticker() -> Interval {
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
