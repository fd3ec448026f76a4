use crate::ipc::reply::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

// Mutations that target a missing collection reply ok with nothing changed.
// The shell fires deletes and removals optimistically and may race ahead of
// its own state.

fn handle_collections_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(title) = req.params.get("title").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing title", None);
    };
    let description = req
        .params
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    match store.create_collection(title, description) {
        Ok(collection_id) => ok(&req.id, json!({ "collectionId": collection_id })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_collections_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(&req.id, json!({ "collections": store.collections() }))
}

fn handle_collections_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(collection_id) = req.params.get("collectionId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing collectionId", None);
    };
    ok(
        &req.id,
        json!({ "collection": store.collection_by_id(collection_id) }),
    )
}

fn handle_collections_add_experiment(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(experiment_id) = req
        .params
        .get("experimentId")
        .and_then(|v| v.as_str())
        .map(str::to_string)
    else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    let Some(collection_id) = req.params.get("collectionId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing collectionId", None);
    };
    // A dangling experiment id is tolerated; it just cannot contribute a
    // thumbnail.
    let thumbnail = state
        .catalog
        .experiment_by_id(&experiment_id)
        .map(|exp| exp.thumbnail.clone())
        .unwrap_or_default();
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    match store.add_experiment_to_collection(collection_id, &experiment_id, &thumbnail) {
        Ok(Some(added)) => ok(&req.id, json!({ "found": true, "added": added })),
        Ok(None) => ok(&req.id, json!({ "found": false, "added": false })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_collections_remove_experiment(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(collection_id) = req.params.get("collectionId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing collectionId", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };

    match store.remove_experiment_from_collection(collection_id, experiment_id) {
        Ok(Some(removed)) => ok(&req.id, json!({ "found": true, "removed": removed })),
        Ok(None) => ok(&req.id, json!({ "found": false, "removed": false })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_collections_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(collection_id) = req.params.get("collectionId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing collectionId", None);
    };

    match store.delete_collection(collection_id) {
        Ok(deleted) => ok(&req.id, json!({ "deleted": deleted })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_collections_list_by_experiment(
    state: &mut AppState,
    req: &Request,
) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    ok(
        &req.id,
        json!({ "collections": store.collections_by_experiment(experiment_id) }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "collections.create" => Some(handle_collections_create(state, req)),
        "collections.list" => Some(handle_collections_list(state, req)),
        "collections.open" => Some(handle_collections_open(state, req)),
        "collections.addExperiment" => Some(handle_collections_add_experiment(state, req)),
        "collections.removeExperiment" => Some(handle_collections_remove_experiment(state, req)),
        "collections.delete" => Some(handle_collections_delete(state, req)),
        "collections.listByExperiment" => Some(handle_collections_list_by_experiment(state, req)),
        _ => None,
    }
}
