//! Settings store
//!
//! JSON settings documents keyed by `(level, key)`, stored as
//! `<root>/<level>.<key>.json`. Every successful save is announced through the
//! [`ChangeNotifier`].

use log::{error, info};
use serde::de::IgnoredAny;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::notify::ChangeNotifier;
use crate::storage::filesystem::{WriteMode, read_text, write_atomic};
use crate::storage::validation::is_valid_key;

/// Level used when a caller does not name one
pub const DEFAULT_LEVEL: &str = "user";

const SETTINGS_EXTENSION: &str = "json";

pub struct SettingsStore {
    root: PathBuf,
    notifier: ChangeNotifier,
}

impl SettingsStore {
    pub fn new(root: impl Into<PathBuf>, notifier: ChangeNotifier) -> Self {
        Self {
            root: root.into(),
            notifier,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn settings_path(&self, key: &str, level: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        if !is_valid_key(level) {
            return Err(StoreError::InvalidKey(level.to_string()));
        }
        Ok(self
            .root
            .join(format!("{}.{}.{}", level, key, SETTINGS_EXTENSION)))
    }

    /// Persist `content` for `(level, key)` and notify observers.
    ///
    /// The content must parse as JSON; it is stored byte for byte. A failed
    /// notification does not fail the save.
    pub async fn save(
        &self,
        key: &str,
        level: &str,
        content: &str,
        client_id: &str,
    ) -> Result<(), StoreError> {
        let path = self.settings_path(key, level)?;

        if client_id.is_empty() {
            return Err(StoreError::MissingClientId);
        }

        serde_json::from_str::<IgnoredAny>(content)
            .map_err(|e| StoreError::InvalidJson(e.to_string()))?;

        write_atomic(&path, content.as_bytes(), WriteMode::Replace)
            .await
            .map_err(|e| {
                error!("Failed to save settings {}: {}", path.display(), e);
                StoreError::Storage(e)
            })?;

        info!(
            "Saved settings {} (level: {}, client: {})",
            key, level, client_id
        );

        self.notifier.notify(client_id, key, level);
        Ok(())
    }

    /// Read the raw JSON text for `(level, key)`
    pub async fn load(&self, key: &str, level: &str) -> Result<String, StoreError> {
        let path = self.settings_path(key, level)?;

        match read_text(&path).await? {
            Some(content) => Ok(content),
            None => Err(StoreError::NotFound(format!("{}.{}", level, key))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::notify::testing::{FailingSink, PanickingSink, RecordingSink};
    use crate::storage::results::epoch_millis;
    use std::sync::Arc;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn recording_store() -> (TempDir, SettingsStore, Arc<RecordingSink>) {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::default());
        let store = SettingsStore::new(dir.path(), ChangeNotifier::new(sink.clone()));
        (dir, store, sink)
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (dir, store, _sink) = recording_store();
        let body = "{\n  \"mode\": \"dark\",\n  \"size\": 14\n}";

        store.save("theme", "user", body, "abc").await.unwrap();

        assert_eq!(store.load("theme", "user").await.unwrap(), body);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("user.theme.json")).unwrap(),
            body
        );
    }

    #[tokio::test]
    async fn test_save_overwrites_unconditionally() {
        let (_dir, store, sink) = recording_store();

        store.save("theme", "user", "{\"v\":1}", "abc").await.unwrap();
        store.save("theme", "user", "{\"v\":2}", "def").await.unwrap();

        assert_eq!(store.load("theme", "user").await.unwrap(), "{\"v\":2}");
        assert_eq!(sink.events().len(), 2);
    }

    #[tokio::test]
    async fn test_levels_are_independent() {
        let (_dir, store, _sink) = recording_store();

        store.save("theme", "user", "1", "abc").await.unwrap();
        store.save("theme", "workspace", "2", "abc").await.unwrap();

        assert_eq!(store.load("theme", "user").await.unwrap(), "1");
        assert_eq!(store.load("theme", "workspace").await.unwrap(), "2");
    }

    #[tokio::test]
    async fn test_any_json_value_is_accepted() {
        let (_dir, store, _sink) = recording_store();
        for body in ["null", "42", "\"text\"", "[1, 2]", "{}"] {
            store.save("k", "user", body, "abc").await.unwrap();
            assert_eq!(store.load("k", "user").await.unwrap(), body);
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected_without_write() {
        let (dir, store, sink) = recording_store();

        let err = store
            .save("theme", "user", "{not json", "abc")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
        assert_eq!(err.signal(), "INVALID_JSON");
        assert!(!dir.path().join("user.theme.json").exists());

        // An existing file is left alone too
        store.save("theme", "user", "{\"ok\":true}", "abc").await.unwrap();
        let err = store.save("theme", "user", "", "abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
        let err = store
            .save("theme", "user", "{\"a\":1} trailing", "abc")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
        assert_eq!(store.load("theme", "user").await.unwrap(), "{\"ok\":true}");
        assert_eq!(sink.events().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_client_id_writes_and_notifies_nothing() {
        let (dir, store, sink) = recording_store();

        let err = store.save("theme", "user", "{}", "").await.unwrap_err();
        assert_eq!(err.signal(), "MISSING_CLIENT_ID");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(!dir.path().join("user.theme.json").exists());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_key_or_level() {
        let (dir, store, sink) = recording_store();

        for (key, level) in [
            ("../escape", "user"),
            ("theme", "../user"),
            (".theme", "user"),
            ("theme", "user."),
            ("a b", "user"),
            ("", "user"),
            ("theme", ""),
        ] {
            let err = store.save(key, level, "{}", "abc").await.unwrap_err();
            assert_eq!(err.signal(), "INVALID_KEY", "save {:?}/{:?}", key, level);
            let err = store.load(key, level).await.unwrap_err();
            assert_eq!(err.signal(), "INVALID_KEY", "load {:?}/{:?}", key, level);
        }

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_key_wins_over_missing_client_id() {
        let (_dir, store, _sink) = recording_store();
        let err = store.save("bad key", "user", "{}", "").await.unwrap_err();
        assert_eq!(err.signal(), "INVALID_KEY");
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let (_dir, store, _sink) = recording_store();
        let err = store.load("theme", "user").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_successful_save_notifies_exactly_once() {
        let (_dir, store, sink) = recording_store();

        let before = epoch_millis(SystemTime::now());
        store.save("theme", "user", "{}", "abc").await.unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        let (topic, notification) = &events[0];
        assert_eq!(topic, "settings-update");
        assert_eq!(notification.originating_client_id, "abc");
        assert_eq!(notification.key, "theme");
        assert_eq!(notification.level, "user");
        assert!(notification.timestamp_millis >= before);
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_fail_save() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(FailingSink::default());
        let store = SettingsStore::new(dir.path(), ChangeNotifier::new(sink.clone()));

        store.save("theme", "user", "{}", "abc").await.unwrap();
        assert_eq!(sink.attempts(), 1);
        assert_eq!(store.load("theme", "user").await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_panicking_sink_does_not_fail_save() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path(), ChangeNotifier::new(Arc::new(PanickingSink)));

        store.save("theme", "user", "{}", "abc").await.unwrap();
        assert_eq!(store.load("theme", "user").await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_storage_failure_sends_no_notification() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::default());
        let store = SettingsStore::new(
            dir.path().join("missing"),
            ChangeNotifier::new(sink.clone()),
        );

        let err = store.save("theme", "user", "{}", "abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(sink.events().is_empty());
    }
}
