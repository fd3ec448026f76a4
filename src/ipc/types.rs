use std::path::PathBuf;

use serde::Deserialize;

use crate::catalog::Catalog;
use crate::store::UserStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    /// Compiled-in catalog, available before any workspace is selected.
    pub catalog: Catalog,
    pub workspace: Option<PathBuf>,
    /// User-state store; present once a workspace has been selected.
    pub store: Option<UserStore>,
}
