use serde_json::json;

use crate::chat;
use crate::ipc::error::{ok, op_err};
use crate::ipc::helpers::{require_role, required_id, required_str, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::Role;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "chat.post" => Some(handle_post(state, req)),
        _ => None,
    }
}

fn handle_post(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_role(state, req, Role::Student) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let club_id = match required_id(req, "clubId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let message = match required_str(req, "message") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };

    match chat::post_message(store, club_id, &session.user_id, &message) {
        Ok(()) => ok(&req.id, json!({})),
        Err(e) => op_err(&req.id, &e),
    }
}
