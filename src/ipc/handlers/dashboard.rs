use serde_json::json;

use crate::dashboard;
use crate::ipc::error::{ok, op_err};
use crate::ipc::helpers::{require_session, required_str, store_ref};
use crate::ipc::types::{AppState, Request};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.get" => Some(handle_get(state, req)),
        _ => None,
    }
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_session(state, req) {
        return e;
    }
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };

    match dashboard::student_dashboard(store, &student_id) {
        Ok(view) => ok(&req.id, json!(view)),
        Err(e) => op_err(&req.id, &e),
    }
}
