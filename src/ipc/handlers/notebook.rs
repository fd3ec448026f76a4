use crate::ipc::reply::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::time::Instant;

// Rich-text notebook. Drafts are debounced through the store's autosave;
// only notebook.save writes through immediately.

fn handle_notebook_draft(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    let Some(content) = req.params.get("content").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing content", None);
    };

    store.schedule_notebook_draft(experiment_id, content, Instant::now());
    ok(&req.id, json!({ "scheduled": true }))
}

fn handle_notebook_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    let Some(content) = req.params.get("content").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing content", None);
    };

    if let Err(e) = store.save_notebook_now(experiment_id, content) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "saved": true }))
}

fn handle_notebook_open(state: &mut AppState, req: &Request) -> serde_json::Value {
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
            "content": store.additional_notes(experiment_id)
        }),
    )
}

fn handle_notebook_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let discarded = store.notebook_draft_pending();
    store.close_notebook();
    ok(&req.id, json!({ "discardedDraft": discarded }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "notebook.draft" => Some(handle_notebook_draft(state, req)),
        "notebook.save" => Some(handle_notebook_save(state, req)),
        "notebook.open" => Some(handle_notebook_open(state, req)),
        "notebook.close" => Some(handle_notebook_close(state, req)),
        _ => None,
    }
}
