//! Runtime configuration shared by every front end.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::import::DEFAULT_BATCH_SIZE;
use crate::application::suggestions::SuggestionSettings;
use crate::domain::AgeRange;
use crate::error::{FormsError, Result};
use crate::flows::{Flow, FlowKind};
use crate::infrastructure::pocketbase::{PocketBaseConfig, DEFAULT_BASE_URL};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    pub api_url: String,
    /// Where drafts are kept; `None` keeps them in memory only.
    pub draft_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    pub import_batch_size: usize,
    pub suggestions: SuggestionConfig,
    pub age_ranges: AgeRanges,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            draft_dir: None,
            timeout_secs: 30,
            import_batch_size: DEFAULT_BATCH_SIZE,
            suggestions: SuggestionConfig::default(),
            age_ranges: AgeRanges::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub min_chars: usize,
    pub limit: usize,
    pub debounce_ms: u64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        let settings = SuggestionSettings::default();
        Self {
            min_chars: settings.min_chars,
            limit: settings.limit,
            debounce_ms: settings.debounce.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeRanges {
    pub attendee: AgeRange,
    pub tournament: AgeRange,
    pub exhibition: AgeRange,
}

impl Default for AgeRanges {
    fn default() -> Self {
        Self {
            attendee: FlowKind::Attendee.default_age_range(),
            tournament: FlowKind::Tournament.default_age_range(),
            exhibition: FlowKind::Exhibition.default_age_range(),
        }
    }
}

impl AgeRanges {
    pub fn get(&self, kind: FlowKind) -> AgeRange {
        match kind {
            FlowKind::Attendee => self.attendee,
            FlowKind::Tournament => self.tournament,
            FlowKind::Exhibition => self.exhibition,
        }
    }
}

impl FormsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(FormsError::Config("api_url must not be empty".into()));
        }
        if self.import_batch_size == 0 {
            return Err(FormsError::Config("import_batch_size must be at least 1".into()));
        }
        for kind in FlowKind::ALL {
            let range = self.age_ranges.get(kind);
            if range.min > range.max {
                return Err(FormsError::Config(format!(
                    "age range for {} is empty ({} > {})",
                    kind, range.min, range.max
                )));
            }
        }
        Ok(())
    }

    pub fn pocketbase(&self) -> PocketBaseConfig {
        PocketBaseConfig {
            base_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn suggestion_settings(&self) -> SuggestionSettings {
        SuggestionSettings {
            min_chars: self.suggestions.min_chars,
            limit: self.suggestions.limit,
            debounce: Duration::from_millis(self.suggestions.debounce_ms),
        }
    }

    /// Flow with the configured age range applied.
    pub fn flow(&self, kind: FlowKind) -> Flow {
        Flow::with_age_range(kind, self.age_ranges.get(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FormsConfig::default();
        assert_eq!(config.api_url, "https://api.worldofconnecta.com");
        assert_eq!(config.import_batch_size, 500);
        assert_eq!(config.age_ranges.attendee, AgeRange::new(16, 100));
        assert_eq!(config.age_ranges.tournament, AgeRange::new(7, 80));
        assert_eq!(config.suggestion_settings(), SuggestionSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: FormsConfig = serde_json::from_str(
            r#"{ "api_url": "http://localhost:8090", "age_ranges": { "tournament": { "min": 10, "max": 30 } } }"#,
        )
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:8090");
        assert_eq!(config.age_ranges.tournament, AgeRange::new(10, 30));
        assert_eq!(config.age_ranges.attendee, AgeRange::new(16, 100));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_validate_rejects_empty_range() {
        let mut config = FormsConfig::default();
        config.age_ranges.attendee = AgeRange::new(50, 20);
        assert!(matches!(config.validate(), Err(FormsError::Config(_))));
    }
}
