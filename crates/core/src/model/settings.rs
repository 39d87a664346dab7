use std::num::NonZeroU32;

use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::DocumentId;

const DEFAULT_CARDS_PER_DOCUMENT: u32 = 5;
const DEFAULT_TIME_LIMIT_SECS: u32 = 60;

/// Validated practice configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeSettings {
    document_ids: Vec<DocumentId>,
    cards_per_document: usize,
    time_limit: NonZeroU32,
}

/// Raw settings as entered by the user or read from a config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PracticeSettingsDraft {
    /// Comma-separated document identifiers.
    pub document_ids: String,
    pub cards_per_document: u32,
    pub time_limit_secs: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("time limit per card must be > 0")]
    ZeroTimeLimit,
}

/// What a configuration change touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsChange {
    /// Document list or per-document quota changed; the deck must be rebuilt.
    pub deck_changed: bool,
    pub time_limit_changed: bool,
}

impl SettingsChange {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.deck_changed && !self.time_limit_changed
    }
}

impl Default for PracticeSettingsDraft {
    fn default() -> Self {
        Self {
            document_ids: String::new(),
            cards_per_document: DEFAULT_CARDS_PER_DOCUMENT,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}

impl PracticeSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::ZeroTimeLimit` if the time limit is zero.
    pub fn validate(self) -> Result<PracticeSettings, SettingsError> {
        let time_limit = NonZeroU32::new(self.time_limit_secs).ok_or(SettingsError::ZeroTimeLimit)?;

        Ok(PracticeSettings {
            document_ids: DocumentId::parse_list(&self.document_ids),
            cards_per_document: usize::try_from(self.cards_per_document).unwrap_or(usize::MAX),
            time_limit,
        })
    }
}

impl PracticeSettings {
    #[must_use]
    pub fn new(
        document_ids: Vec<DocumentId>,
        cards_per_document: usize,
        time_limit: NonZeroU32,
    ) -> Self {
        Self {
            document_ids,
            cards_per_document,
            time_limit,
        }
    }

    #[must_use]
    pub fn document_ids(&self) -> &[DocumentId] {
        &self.document_ids
    }

    #[must_use]
    pub fn cards_per_document(&self) -> usize {
        self.cards_per_document
    }

    #[must_use]
    pub fn time_limit(&self) -> NonZeroU32 {
        self.time_limit
    }

    /// Classify the change from `self` to `next`.
    #[must_use]
    pub fn diff(&self, next: &PracticeSettings) -> SettingsChange {
        SettingsChange {
            deck_changed: self.document_ids != next.document_ids
                || self.cards_per_document != next.cards_per_document,
            time_limit_changed: self.time_limit != next.time_limit,
        }
    }
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            document_ids: Vec::new(),
            cards_per_document: DEFAULT_CARDS_PER_DOCUMENT as usize,
            time_limit: NonZeroU32::new(DEFAULT_TIME_LIMIT_SECS).unwrap_or(NonZeroU32::MIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(ids: &str, per_doc: u32, secs: u32) -> PracticeSettingsDraft {
        PracticeSettingsDraft {
            document_ids: ids.into(),
            cards_per_document: per_doc,
            time_limit_secs: secs,
        }
    }

    #[test]
    fn defaults_match_registered_settings() {
        let settings = PracticeSettingsDraft::new().validate().unwrap();
        assert!(settings.document_ids().is_empty());
        assert_eq!(settings.cards_per_document(), 5);
        assert_eq!(settings.time_limit().get(), 60);
        assert_eq!(settings, PracticeSettings::default());
    }

    #[test]
    fn validate_splits_and_trims_ids() {
        let settings = draft(" a1 , ,b2,", 3, 10).validate().unwrap();
        let ids: Vec<&str> = settings.document_ids().iter().map(DocumentId::as_str).collect();
        assert_eq!(ids, vec!["a1", "b2"]);
        assert_eq!(settings.cards_per_document(), 3);
    }

    #[test]
    fn zero_time_limit_is_rejected() {
        assert_eq!(draft("a", 1, 0).validate().unwrap_err(), SettingsError::ZeroTimeLimit);
    }

    #[test]
    fn zero_quota_is_allowed() {
        let settings = draft("a", 0, 5).validate().unwrap();
        assert_eq!(settings.cards_per_document(), 0);
    }

    #[test]
    fn diff_classifies_changes() {
        let base = draft("a,b", 2, 30).validate().unwrap();

        assert!(base.diff(&base.clone()).is_empty());

        let reordered = draft("b,a", 2, 30).validate().unwrap();
        assert!(base.diff(&reordered).deck_changed);

        let quota = draft("a,b", 3, 30).validate().unwrap();
        let change = base.diff(&quota);
        assert!(change.deck_changed);
        assert!(!change.time_limit_changed);

        let timer = draft("a, b", 2, 45).validate().unwrap();
        let change = base.diff(&timer);
        assert!(!change.deck_changed);
        assert!(change.time_limit_changed);
    }

    #[test]
    fn draft_reads_partial_toml() {
        let draft: PracticeSettingsDraft = toml::from_str(r#"document_ids = "x, y""#).unwrap();
        let settings = draft.validate().unwrap();
        assert_eq!(settings.document_ids().len(), 2);
        assert_eq!(settings.time_limit().get(), 60);
    }
}
