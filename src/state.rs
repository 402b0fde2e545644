//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::StorageEngine;
use crate::services::{AccountService, AttachmentStore, NoteService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<dyn StorageEngine>,
    pub notes: Arc<NoteService>,
    pub accounts: Arc<AccountService>,
}

impl AppState {
    pub fn new(config: AppConfig, engine: Arc<dyn StorageEngine>) -> Self {
        let attachments = AttachmentStore::new(&config.storage.upload_dir);
        let notes = NoteService::new(engine.clone(), attachments, config.api.max_page_size);
        let accounts = AccountService::new(engine.clone());

        Self {
            config: Arc::new(config),
            engine,
            notes: Arc::new(notes),
            accounts: Arc::new(accounts),
        }
    }
}
