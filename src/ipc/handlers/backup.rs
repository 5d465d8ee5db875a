use std::path::Path;

use serde_json::json;

use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{require_role, required_str, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::Role;
use crate::store::{self, StoreError};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportDataBundle" => Some(handle_export(state, req)),
        "backup.importDataBundle" => Some(handle_import(state, req)),
        _ => None,
    }
}

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_role(state, req, Role::Teacher) {
        return e;
    }
    let out_path = match required_str(req, "outPath") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };

    match backup::export_data_bundle(store.data_dir(), Path::new(&out_path)) {
        Ok(summary) => {
            tracing::info!(out = %out_path, entries = summary.entry_count, "data bundle exported");
            ok(
                &req.id,
                json!({
                    "bundleFormat": summary.bundle_format,
                    "entryCount": summary.entry_count,
                }),
            )
        }
        Err(e) => err(&req.id, "backup_failed", format!("{e:#}"), None),
    }
}

fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_role(state, req, Role::Teacher) {
        return e;
    }
    let in_path = match required_str(req, "inPath") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let data_dir = match store_ref(state, req) {
        Ok(s) => s.data_dir().to_path_buf(),
        Err(e) => return e,
    };
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let summary = match backup::import_data_bundle(Path::new(&in_path), &data_dir) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "backup_failed", format!("{e:#}"), None),
    };

    // The bundle's checksums prove integrity, not validity; reopen the
    // store so malformed imported collections fail here, loudly.
    match store::open_store(&workspace) {
        Ok(reopened) => {
            state.store = Some(reopened);
            // Imported users may not match the sessions issued before.
            state.sessions.clear();
            tracing::info!(input = %in_path, files = summary.file_count, "data bundle imported");
            ok(
                &req.id,
                json!({
                    "bundleFormatDetected": summary.bundle_format_detected,
                    "fileCount": summary.file_count,
                }),
            )
        }
        Err(e @ StoreError::Corrupt { .. }) => err(&req.id, "corrupt_collection", e.to_string(), None),
        Err(e) => err(&req.id, "store_open_failed", e.to_string(), None),
    }
}
