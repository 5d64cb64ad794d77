#![forbid(unsafe_code)]

pub mod config;
pub mod http;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use transcript_service::TranscriptService;
use transcript_storage::TranscriptDocStore;

pub use config::{AdapterConfig, StoreMode};
pub use http::router;

pub type DocTranscriptService = TranscriptService<TranscriptDocStore>;

/// Shared handle to the one transcript service instance behind the gateway.
#[derive(Debug, Clone)]
pub struct AdapterRuntime {
    service: Arc<Mutex<DocTranscriptService>>,
}

impl Default for AdapterRuntime {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl AdapterRuntime {
    pub fn new(service: DocTranscriptService) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(TranscriptService::new(TranscriptDocStore::new_in_memory()))
    }

    pub fn with_journal(journal_path: impl Into<PathBuf>) -> Result<Self, String> {
        let journal_path = journal_path.into();
        let store = TranscriptDocStore::open_journaled(&journal_path).map_err(|err| {
            format!(
                "failed to open transcript store '{}': {err}",
                journal_path.display()
            )
        })?;
        Ok(Self::new(TranscriptService::new(store)))
    }

    pub fn from_config(config: &AdapterConfig) -> Result<Self, String> {
        match &config.store {
            StoreMode::InMemory => Ok(Self::in_memory()),
            StoreMode::Journal(path) => Self::with_journal(path.clone()),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, DocTranscriptService>, String> {
        self.service
            .lock()
            .map_err(|_| "transcript service lock poisoned".to_string())
    }
}
