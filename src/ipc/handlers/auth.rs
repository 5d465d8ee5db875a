use serde_json::json;
use uuid::Uuid;

use crate::auth;
use crate::error::OpError;
use crate::ipc::error::{err, ok, op_err};
use crate::ipc::helpers::{required_str, store_ref};
use crate::ipc::types::{AppState, Request, Session};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let username = match required_str(req, "username") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let password = match required_str(req, "password") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let user = {
        let store = match store_ref(state, req) {
            Ok(s) => s,
            Err(e) => return e,
        };
        match auth::check_credentials(store, &username, &password) {
            Ok(user) => user,
            Err(e @ OpError::InvalidCredentials) => {
                return err(&req.id, e.code(), "Invalid credentials", None)
            }
            Err(e) => return op_err(&req.id, &e),
        }
    };

    let token = Uuid::new_v4().to_string();
    state.sessions.insert(
        token.clone(),
        Session {
            user_id: user.id.clone(),
            role: user.role,
        },
    );
    tracing::debug!(user = %user.username, "session issued");

    ok(
        &req.id,
        json!({ "role": user.role, "id": user.id, "token": token }),
    )
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let token = match required_str(req, "token") {
        Ok(v) => v,
        Err(e) => return e,
    };
    state.sessions.remove(&token);
    ok(&req.id, json!({}))
}
