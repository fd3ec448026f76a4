use crate::ipc::reply::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_sticky_notes_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    let Some(text) = req.params.get("text").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing text", None);
    };
    // Color is a semantic tag chosen by the shell, not validated against a
    // palette here.
    let color = req
        .params
        .get("color")
        .and_then(|v| v.as_str())
        .unwrap_or("yellow");

    match store.add_sticky_note(experiment_id, text, color) {
        Ok(note) => ok(&req.id, json!({ "note": note })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_sticky_notes_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    let Some(note_id) = req.params.get("noteId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing noteId", None);
    };
    let Some(text) = req.params.get("text").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing text", None);
    };

    // Unknown experiment or note ids are a quiet no-op; the reply says
    // whether anything matched.
    match store.update_sticky_note(experiment_id, note_id, text) {
        Ok(updated) => ok(&req.id, json!({ "updated": updated })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_sticky_notes_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    let Some(note_id) = req.params.get("noteId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing noteId", None);
    };

    match store.delete_sticky_note(experiment_id, note_id) {
        Ok(deleted) => ok(&req.id, json!({ "deleted": deleted })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_sticky_notes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    ok(
        &req.id,
        json!({ "notes": store.sticky_notes(experiment_id) }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "stickyNotes.add" => Some(handle_sticky_notes_add(state, req)),
        "stickyNotes.update" => Some(handle_sticky_notes_update(state, req)),
        "stickyNotes.delete" => Some(handle_sticky_notes_delete(state, req)),
        "stickyNotes.list" => Some(handle_sticky_notes_list(state, req)),
        _ => None,
    }
}
