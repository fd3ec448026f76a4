use std::time::Instant;

use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::reply::err;

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    // A debounced notebook draft may have come due since the last request.
    // Best-effort: a failed flush must not poison the unrelated request.
    if let Some(store) = state.store.as_mut() {
        if let Err(e) = store.flush_due_notebook(Instant::now()) {
            eprintln!("vlabsd: notebook autosave failed: {e:?}");
        }
    }

    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::catalog::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::progress::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::bookmarks::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::collections::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::sticky_notes::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::notebook::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::backup_exchange::try_handle(state, &req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
