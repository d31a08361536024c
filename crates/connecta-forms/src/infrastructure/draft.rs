//! File-backed draft storage: one JSON document per draft key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DraftError;
use crate::ports::{Draft, DraftStore};

pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys are flow-defined identifiers; anything outside `[A-Za-z0-9_-]`
    /// is replaced so a key can never escape the directory.
    fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self, key: &str) -> Result<Option<Draft>, DraftError> {
        let path = self.path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, key: &str, draft: &Draft) -> Result<(), DraftError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(draft)?)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), "Draft saved");
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), DraftError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldValue, FormState};
    use chrono::Utc;

    fn draft() -> Draft {
        Draft {
            data: FormState::from_pairs([
                ("firstName", FieldValue::text("Mona")),
                ("favoriteGame", FieldValue::many(["fc26"])),
                ("termsAccepted", FieldValue::Flag(true)),
            ]),
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path().join("drafts"));

        assert_eq!(store.load("connecta2025_attendee_draft").unwrap(), None);
        let saved = draft();
        store.save("connecta2025_attendee_draft", &saved).unwrap();
        assert_eq!(store.load("connecta2025_attendee_draft").unwrap(), Some(saved));

        store.clear("connecta2025_attendee_draft").unwrap();
        assert_eq!(store.load("connecta2025_attendee_draft").unwrap(), None);
        store.clear("connecta2025_attendee_draft").unwrap();
    }

    #[test]
    fn test_corrupt_draft_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let store = FileDraftStore::new(dir.path());
        assert!(matches!(store.load("broken"), Err(DraftError::Corrupt(_))));
    }

    #[test]
    fn test_key_cannot_escape_dir() {
        let store = FileDraftStore::new("/tmp/drafts");
        assert_eq!(store.path("../etc/passwd"), PathBuf::from("/tmp/drafts/___etc_passwd.json"));
    }
}
