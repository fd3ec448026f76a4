use crate::ipc::reply::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_bookmarks_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };

    match store.toggle_bookmark(experiment_id) {
        Ok(bookmarked) => ok(
            &req.id,
            json!({ "experimentId": experiment_id, "bookmarked": bookmarked }),
        ),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_bookmarks_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(&req.id, json!({ "bookmarks": store.bookmarks() }))
}

fn handle_notes_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    let Some(text) = req.params.get("text").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing text", None);
    };

    if let Err(e) = store.save_note(experiment_id, text) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "experimentId": experiment_id }))
}

fn handle_notes_open(state: &mut AppState, req: &Request) -> serde_json::Value {
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
            "text": store.note(experiment_id)
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "bookmarks.toggle" => Some(handle_bookmarks_toggle(state, req)),
        "bookmarks.list" => Some(handle_bookmarks_list(state, req)),
        "notes.save" => Some(handle_notes_save(state, req)),
        "notes.open" => Some(handle_notes_open(state, req)),
        _ => None,
    }
}
