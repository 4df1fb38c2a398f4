//! Shared application context
//!
//! Built once at start-up and handed to every connection.

use log::info;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::notify::{BroadcastSink, ChangeNotifier};
use crate::storage::filesystem::create_directory;
use crate::storage::{DictionaryStore, DocumentStore, SettingsStore};

pub struct AppContext {
    pub documents: DocumentStore,
    pub settings: SettingsStore,
    pub dictionaries: DictionaryStore,
    pub events: BroadcastSink,
}

impl AppContext {
    /// Wire the stores to the configured roots. Touches no files.
    pub fn new(config: &ServerConfig) -> Self {
        let events = BroadcastSink::new(config.event_buffer);
        let notifier = ChangeNotifier::new(Arc::new(events.clone()));

        Self {
            documents: DocumentStore::new(config.documents_root_path()),
            settings: SettingsStore::new(config.settings_root_path(), notifier),
            dictionaries: DictionaryStore::new(config.dictionaries_root_path()),
            events,
        }
    }

    /// Create any missing root directories, then build the context
    pub async fn bootstrap(config: &ServerConfig) -> Result<Self, ServerError> {
        let context = Self::new(config);

        for (label, root) in [
            ("Documents", context.documents.root()),
            ("Settings", context.settings.root()),
            ("Dictionaries", context.dictionaries.root()),
        ] {
            create_directory(root).await?;
            info!("{} directory: {}", label, root.display());
        }

        Ok(context)
    }
}
