use serde_json::json;

use crate::error::OpError;
use crate::ipc::error::{ok, op_err};
use crate::ipc::helpers::{
    require_role, require_session, required_id, required_str, required_student_ids, store_ref,
};
use crate::ipc::types::{AppState, Request};
use crate::membership;
use crate::model::{Club, Role};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "clubs.create" => Some(handle_create(state, req)),
        "clubs.list" => Some(handle_list(state, req)),
        "clubs.assign" => Some(handle_assign(state, req)),
        _ => None,
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_role(state, req, Role::Teacher) {
        return e;
    }
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };

    match membership::create_club(store, &name) {
        Ok(club) => {
            tracing::info!(club = %club.name, id = club.id, "club created");
            ok(&req.id, json!({ "club": club }))
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
    let clubs: Vec<Club> = match store.load("clubs") {
        Ok(v) => v,
        Err(e) => return op_err(&req.id, &OpError::Store(e)),
    };
    ok(&req.id, json!({ "clubs": clubs }))
}

fn handle_assign(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_role(state, req, Role::Teacher) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let student_ids = match required_student_ids(req, "studentIds") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let club_id = match required_id(req, "clubId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };

    match membership::assign_to_club(store, &session.user_id, &student_ids, club_id) {
        Ok(assigned) => ok(&req.id, json!({ "assigned": assigned })),
        Err(e) => op_err(&req.id, &e),
    }
}
