use crate::ipc::reply::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::storage;
use crate::store::UserStore;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "departmentCount": state.catalog.departments.len(),
            "experimentCount": state.catalog.experiments.len()
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match storage::open_db(&path) {
        Ok(conn) => {
            // Re-selecting replaces the previous session's store; its pending
            // notebook draft is stale and goes with it.
            state.workspace = Some(path.clone());
            state.store = Some(UserStore::load(conn));
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

fn handle_portal_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(
        &req.id,
        json!({ "hasEnteredPortal": store.has_entered_portal() }),
    )
}

fn handle_portal_enter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if let Err(e) = store.enter_portal() {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "hasEnteredPortal": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "portal.status" => Some(handle_portal_status(state, req)),
        "portal.enter" => Some(handle_portal_enter(state, req)),
        _ => None,
    }
}
