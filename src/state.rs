use std::sync::Arc;

use crate::auth::Authenticator;
use crate::completion::Completion;
use crate::config::AppConfig;
use crate::database::Storage;
use crate::models::{Prompt, Resource};
use crate::processing::NoteProcessor;
use crate::repository::OwnedRepository;

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub authenticator: Arc<dyn Authenticator>,
    pub storage: Arc<dyn Storage>,
    pub completion: Arc<dyn Completion>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        authenticator: Arc<dyn Authenticator>,
        storage: Arc<dyn Storage>,
        completion: Arc<dyn Completion>,
    ) -> Self {
        Self { config: Arc::new(config), authenticator, storage, completion }
    }

    pub fn repository<R: Resource>(&self) -> OwnedRepository<R> {
        OwnedRepository::new(self.storage.clone())
    }

    pub fn note_processor(&self) -> NoteProcessor {
        NoteProcessor::new(self.repository::<Prompt>(), self.completion.clone())
    }
}
