use std::collections::BTreeMap;

use serde_json::json;

use crate::error::OpError;
use crate::ipc::error::{err, ok, op_err};
use crate::ipc::helpers::{require_role, require_session, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::{Questionnaire, Role};
use crate::questionnaire;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "questionnaires.submit" => Some(handle_submit(state, req)),
        "questionnaires.list" => Some(handle_list(state, req)),
        _ => None,
    }
}

fn handle_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_role(state, req, Role::Student) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let Some(raw) = req.params.get("answers").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing answers", None);
    };
    if raw.is_empty() {
        return err(&req.id, "bad_params", "answers must not be empty", None);
    }
    let mut answers: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in raw {
        let Some(s) = value.as_str() else {
            return err(&req.id, "bad_params", "answers values must be strings", None);
        };
        answers.insert(key.clone(), s.to_string());
    }
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };

    match questionnaire::submit(store, &session.user_id, answers) {
        Ok(record) => ok(&req.id, json!({ "preferredClub": record.preferred_club })),
        Err(e) => op_err(&req.id, &e),
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
    let questionnaires: Vec<Questionnaire> = match store.load("questionnaires") {
        Ok(v) => v,
        Err(e) => return op_err(&req.id, &OpError::Store(e)),
    };
    ok(&req.id, json!({ "questionnaires": questionnaires }))
}
