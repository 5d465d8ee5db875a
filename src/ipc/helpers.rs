use serde_json::Value as JsonValue;

use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request, Session};
use crate::model::Role;
use crate::store::Store;

pub fn store_ref<'a>(state: &'a AppState, req: &Request) -> Result<&'a Store, serde_json::Value> {
    state
        .store
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn opt_str(req: &Request, key: &str) -> Result<Option<String>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => match v.as_str() {
            Some(s) => Ok(Some(s.trim().to_string())),
            None => Err(err(
                &req.id,
                "bad_params",
                format!("{} must be a string", key),
                None,
            )),
        },
    }
}

/// Numeric ids may arrive as integers or as numeric strings (the original
/// client posted `<select>` values verbatim); accept both.
pub fn required_id(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    let Some(v) = req.params.get(key) else {
        return Err(err(&req.id, "bad_params", format!("missing {}", key), None));
    };
    if let Some(n) = v.as_i64() {
        return Ok(n);
    }
    if let Some(s) = v.as_str() {
        if let Ok(n) = s.trim().parse::<i64>() {
            return Ok(n);
        }
    }
    Err(err(
        &req.id,
        "bad_params",
        format!("{} must be an integer id", key),
        None,
    ))
}

/// Student id batches: an array of strings, or the legacy comma-separated
/// string form. Must name at least one student.
pub fn required_student_ids(req: &Request, key: &str) -> Result<Vec<String>, serde_json::Value> {
    let invalid = || {
        err(
            &req.id,
            "bad_params",
            format!("{} must be an array of student ids", key),
            None,
        )
    };
    let ids: Vec<String> = match req.params.get(key) {
        None => return Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
        Some(JsonValue::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let Some(s) = item.as_str() else {
                    return Err(invalid());
                };
                let s = s.trim();
                if !s.is_empty() {
                    out.push(s.to_string());
                }
            }
            out
        }
        Some(JsonValue::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(_) => return Err(invalid()),
    };
    if ids.is_empty() {
        return Err(err(
            &req.id,
            "bad_params",
            format!("{} must name at least one student", key),
            None,
        ));
    }
    Ok(ids)
}

pub fn require_session(state: &AppState, req: &Request) -> Result<Session, serde_json::Value> {
    let token = required_str(req, "token")?;
    state
        .sessions
        .get(&token)
        .cloned()
        .ok_or_else(|| err(&req.id, "invalid_token", "unknown session token", None))
}

pub fn require_role(
    state: &AppState,
    req: &Request,
    role: Role,
) -> Result<Session, serde_json::Value> {
    let session = require_session(state, req)?;
    if session.role != role {
        let needed = match role {
            Role::Teacher => "teacher role required",
            Role::Student => "student role required",
        };
        return Err(err(&req.id, "forbidden", needed, None));
    }
    Ok(session)
}
