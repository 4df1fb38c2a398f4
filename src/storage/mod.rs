//! File system storage management
//!
//! Name validation, path confinement and the three stores built on them.

pub mod dictionaries;
pub mod documents;
pub mod filesystem;
pub mod results;
pub mod settings;
pub mod validation;

pub use dictionaries::DictionaryStore;
pub use documents::DocumentStore;
pub use results::DocumentEntry;
pub use settings::{DEFAULT_LEVEL, SettingsStore};
pub use validation::{is_valid_document_name, is_valid_key, resolve_dictionary_path};
