use crate::ipc::reply::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

// Catalog navigation. All read-only; the catalog is compiled in, so no
// workspace is required for any of these.

fn handle_departments_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({ "departments": state.catalog.departments }),
    )
}

fn handle_departments_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(department_id) = req.params.get("departmentId").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing departmentId", None);
    };
    match state.catalog.department_by_id(department_id) {
        Some(department) => ok(&req.id, json!({ "department": department })),
        None => err(
            &req.id,
            "not_found",
            "department not found",
            Some(json!({ "departmentId": department_id })),
        ),
    }
}

fn handle_labs_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(lab_id) = req.params.get("labId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing labId", None);
    };
    match state.catalog.lab_by_id(lab_id) {
        Some(lab) => ok(&req.id, json!({ "lab": lab })),
        None => err(
            &req.id,
            "not_found",
            "lab not found",
            Some(json!({ "labId": lab_id })),
        ),
    }
}

fn handle_labs_list_by_department(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(department_id) = req.params.get("departmentId").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing departmentId", None);
    };
    // Unknown department yields an empty list, not an error.
    ok(
        &req.id,
        json!({ "labs": state.catalog.labs_by_department(department_id) }),
    )
}

fn handle_experiments_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(experiment_id) = req.params.get("experimentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing experimentId", None);
    };
    match state.catalog.experiment_by_id(experiment_id) {
        Some(experiment) => ok(&req.id, json!({ "experiment": experiment })),
        None => err(
            &req.id,
            "not_found",
            "experiment not found",
            Some(json!({ "experimentId": experiment_id })),
        ),
    }
}

fn handle_experiments_list_by_lab(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(lab_id) = req.params.get("labId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing labId", None);
    };
    ok(
        &req.id,
        json!({ "experiments": state.catalog.experiments_by_lab(lab_id) }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "departments.list" => Some(handle_departments_list(state, req)),
        "departments.open" => Some(handle_departments_open(state, req)),
        "labs.open" => Some(handle_labs_open(state, req)),
        "labs.listByDepartment" => Some(handle_labs_list_by_department(state, req)),
        "experiments.open" => Some(handle_experiments_open(state, req)),
        "experiments.listByLab" => Some(handle_experiments_list_by_lab(state, req)),
        _ => None,
    }
}
