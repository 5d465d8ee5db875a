use chrono::{DateTime, Utc};
use serde_json::json;

use crate::error::OpError;
use crate::ipc::error::{err, ok, op_err};
use crate::ipc::helpers::{
    opt_str, require_role, require_session, required_id, required_str, store_ref,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Assignment, Role};
use crate::scoring;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assignments.create" => Some(handle_create(state, req)),
        "assignments.list" => Some(handle_list(state, req)),
        "assignments.submit" => Some(handle_submit(state, req)),
        _ => None,
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_role(state, req, Role::Teacher) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let description = match opt_str(req, "description") {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => return e,
    };
    let due_raw = match required_str(req, "dueDate") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(due_date) = scoring::parse_due_date(&due_raw) else {
        return err(
            &req.id,
            "bad_params",
            "dueDate must be formatted YYYY-MM-DD",
            None,
        );
    };
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };

    match scoring::create_assignment(store, &session.user_id, &name, &description, due_date) {
        Ok(assignment) => {
            tracing::info!(assignment = %assignment.name, id = assignment.id, "assignment created");
            ok(&req.id, json!({ "assignment": assignment }))
        }
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
    let assignments: Vec<Assignment> = match store.load("assignments") {
        Ok(v) => v,
        Err(e) => return op_err(&req.id, &OpError::Store(e)),
    };
    ok(&req.id, json!({ "assignments": assignments }))
}

fn handle_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_role(state, req, Role::Student) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let assignment_id = match required_id(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let submitted_raw = match required_str(req, "submissionTime") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let submitted: DateTime<Utc> = match DateTime::parse_from_rfc3339(&submitted_raw) {
        Ok(t) => t.with_timezone(&Utc),
        Err(_) => {
            return err(
                &req.id,
                "bad_params",
                "submissionTime must be an RFC 3339 timestamp",
                None,
            )
        }
    };
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };

    match scoring::submit(
        store,
        &session.user_id,
        assignment_id,
        submitted,
        &submitted_raw,
    ) {
        Ok(score) => ok(&req.id, json!({ "score": score })),
        Err(e) => op_err(&req.id, &e),
    }
}
