use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::model::Role;
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Server-side record behind a session token. Mutating operations take the
/// acting identity from here, never from request params.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Store>,
    pub sessions: HashMap<String, Session>,
}
