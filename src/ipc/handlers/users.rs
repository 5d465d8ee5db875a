use serde_json::json;

use crate::error::OpError;
use crate::ipc::error::{ok, op_err};
use crate::ipc::helpers::{require_session, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::{Role, User};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "users.list" => Some(handle_list(state, req)),
        _ => None,
    }
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_session(state, req) {
        return e;
    }
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let users: Vec<User> = match store.load("users") {
        Ok(v) => v,
        Err(e) => return op_err(&req.id, &OpError::Store(e)),
    };

    // Students only, and never the stored credentials.
    let students: Vec<serde_json::Value> = users
        .into_iter()
        .filter(|u| u.role == Role::Student)
        .map(|u| json!({ "id": u.id, "username": u.username, "role": u.role }))
        .collect();

    ok(&req.id, json!({ "users": students }))
}
