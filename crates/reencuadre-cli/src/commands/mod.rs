/// CLI command modules, one per subcommand
pub mod catalog;
pub mod generate;
pub mod history;
pub mod render;

use anyhow::{Context, Result};
use log::debug;
use reencuadre_core::history::HistoryStore;
use reencuadre_storage::{
    resolve_owner, MemoryHistoryStore, SledHistoryStore, SledIdentityProvider,
};
use std::sync::Arc;

use crate::settings::Settings;

/// Trait for CLI command handlers
#[allow(async_fn_in_trait)]
pub trait CommandHandler {
    async fn execute(&self, context: &CliContext) -> Result<()>;
}

pub struct CliContext {
    pub settings: Settings,
    pub color: bool,
}

/// The history store for this run and the owner whose records it holds.
pub struct HistoryAccess {
    pub store: Arc<dyn HistoryStore>,
    pub owner_id: String,
}

impl CliContext {
    pub fn new(settings: Settings, color: bool) -> Self {
        Self { settings, color }
    }

    pub async fn open_history(&self) -> Result<HistoryAccess> {
        let settings = &self.settings;
        let token = settings.auth_token.as_deref();

        let (store, owner_id): (Arc<dyn HistoryStore>, String) = match &settings.store_path {
            Some(path) => {
                let store = SledHistoryStore::open(path, &settings.app_id).with_context(|| {
                    format!("Could not open history at '{}'", path.display())
                })?;
                let owner_id = match &settings.owner_id {
                    Some(owner_id) => owner_id.clone(),
                    None => {
                        let provider = SledIdentityProvider::new(&store.db())?;
                        resolve_owner(Some(&provider), token).await.owner_id
                    }
                };
                (Arc::new(store), owner_id)
            }
            None => {
                let owner_id = match &settings.owner_id {
                    Some(owner_id) => owner_id.clone(),
                    None => resolve_owner(None, token).await.owner_id,
                };
                (Arc::new(MemoryHistoryStore::new(&settings.app_id)), owner_id)
            }
        };

        debug!("History owner: {}", owner_id);
        Ok(HistoryAccess { store, owner_id })
    }
}
