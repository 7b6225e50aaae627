use crate::accounts::AccountRegistry;
use crate::auth::AuthState;
use crate::config::AppConfig;
use crate::store::JsonDocumentStore;

use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) auth: AuthState,
    pub(crate) accounts: AccountRegistry,
    pub(crate) store: JsonDocumentStore,
    /// One export in flight at a time; taken while assembling pages.
    pub(crate) export_gate: Arc<Mutex<()>>,
}
