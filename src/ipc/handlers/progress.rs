use crate::ipc::reply::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::Tab;
use serde_json::json;

fn handle_progress_mark_tab(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    let tab_name = match req.params.get("tab").and_then(|v| v.as_str()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing tab", None),
    };
    // Tab names are a closed set; anything else is a caller bug, not state.
    let Some(tab) = Tab::parse(tab_name) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown tab: {}", tab_name),
            Some(json!({ "tab": tab_name })),
        );
    };

    match store.mark_tab_completed(experiment_id, tab) {
        Ok(progress) => ok(
            &req.id,
            json!({ "experimentId": experiment_id, "progress": progress }),
        ),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_progress_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    let Some(percent) = req.params.get("percent").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing percent", None);
    };

    // Direct overwrite discards tab-level detail. Quiz-driven bumps use
    // this; tab tracking uses progress.markTab.
    if let Err(e) = store.set_progress(experiment_id, percent) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }
    ok(
        &req.id,
        json!({
            "experimentId": experiment_id,
            "progress": store.experiment_progress(experiment_id)
        }),
    )
}

fn handle_progress_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    ok(
        &req.id,
        json!({
            "experimentId": experiment_id,
            "progress": store.experiment_progress(experiment_id)
        }),
    )
}

fn handle_progress_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(&req.id, json!({ "progress": store.progress_map() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "progress.markTab" => Some(handle_progress_mark_tab(state, req)),
        "progress.set" => Some(handle_progress_set(state, req)),
        "progress.open" => Some(handle_progress_open(state, req)),
        "progress.list" => Some(handle_progress_list(state, req)),
        _ => None,
    }
}
