#![forbid(unsafe_code)]

pub mod deck_builder;
pub mod error;
pub mod practice;

pub use deck_builder::{DeckBuild, DeckBuilder, EmptyDeckReason, draw_cards};
pub use error::{DocumentIssue, DriverError};
pub use practice::{
    PracticeDriver, PracticeHandle, PracticeSession, PracticeState, PracticeView, Progress,
    TickOutcome,
};
