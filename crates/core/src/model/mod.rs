mod deck;
mod document;
mod flashcard;
mod ids;
mod settings;

pub use ids::{DocumentId, NodeId, ParseIdError};

pub use deck::Deck;
pub use document::{DocumentNode, collect_candidates};
pub use flashcard::{Flashcard, FlashcardError};
pub use settings::{PracticeSettings, PracticeSettingsDraft, SettingsChange, SettingsError};
