
use serde_json::json;
use test_support::{request_ok, spawn_sidecar, temp_dir};

// Catalog experiments with known thumbnails.
const EXP_STACKS: &str = "67d033429f7984e0c0fa5101";
const EXP_BST: &str = "67d033429f7984e0c0fa5102";

#[test]
fn create_add_remove_delete_flow() {
    let workspace = temp_dir("vlabs-collections-flow");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "collections.create",
        json!({ "title": "Physics", "description": "semester 1" }),
    );
    let collection_id = created
        .get("collectionId")
        .and_then(|v| v.as_str())
        .expect("collectionId")
        .to_string();

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "collections.addExperiment",
        json!({ "collectionId": collection_id, "experimentId": EXP_STACKS }),
    );
    assert_eq!(added.get("added").and_then(|v| v.as_bool()), Some(true));

    let by_exp = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "collections.listByExperiment",
        json!({ "experimentId": EXP_STACKS }),
    );
    let rows = by_exp
        .get("collections")
        .and_then(|v| v.as_array())
        .cloned()
        .expect("collections");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("title").and_then(|v| v.as_str()),
        Some("Physics")
    );

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "collections.removeExperiment",
        json!({ "collectionId": collection_id, "experimentId": EXP_STACKS }),
    );
    assert_eq!(removed.get("removed").and_then(|v| v.as_bool()), Some(true));

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "collections.delete",
        json!({ "collectionId": collection_id }),
    );
    assert_eq!(deleted.get("deleted").and_then(|v| v.as_bool()), Some(true));

    // Queries against the deleted id resolve to null, not an error.
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "collections.open",
        json!({ "collectionId": collection_id }),
    );
    assert!(opened.get("collection").map(|v| v.is_null()).unwrap_or(false));
}

#[test]
fn membership_has_set_semantics() {
    let workspace = temp_dir("vlabs-collections-dedupe");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "collections.create",
        json!({ "title": "Data Structures" }),
    );
    let collection_id = created
        .get("collectionId")
        .and_then(|v| v.as_str())
        .expect("collectionId")
        .to_string();

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "collections.addExperiment",
        json!({ "collectionId": collection_id, "experimentId": EXP_STACKS }),
    );
    assert_eq!(first.get("added").and_then(|v| v.as_bool()), Some(true));

    let second = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "collections.addExperiment",
        json!({ "collectionId": collection_id, "experimentId": EXP_STACKS }),
    );
    assert_eq!(second.get("added").and_then(|v| v.as_bool()), Some(false));

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "collections.open",
        json!({ "collectionId": collection_id }),
    );
    let ids = opened
        .get("collection")
        .and_then(|c| c.get("experimentIds"))
        .and_then(|v| v.as_array())
        .cloned()
        .expect("experimentIds");
    assert_eq!(ids, vec![json!(EXP_STACKS)]);
}

#[test]
fn thumbnail_is_set_once_from_first_added_experiment() {
    let workspace = temp_dir("vlabs-collections-thumbnail");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "collections.create",
        json!({ "title": "Favourites" }),
    );
    let collection_id = created
        .get("collectionId")
        .and_then(|v| v.as_str())
        .expect("collectionId")
        .to_string();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "collections.addExperiment",
        json!({ "collectionId": collection_id, "experimentId": EXP_STACKS }),
    );
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "collections.open",
        json!({ "collectionId": collection_id }),
    );
    let thumbnail = opened
        .get("collection")
        .and_then(|c| c.get("thumbnail"))
        .and_then(|v| v.as_str())
        .expect("thumbnail")
        .to_string();
    assert_eq!(thumbnail, "/assets/img/stack-queue.jpg");

    // Adding a second experiment keeps the original thumbnail.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "collections.addExperiment",
        json!({ "collectionId": collection_id, "experimentId": EXP_BST }),
    );
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "collections.open",
        json!({ "collectionId": collection_id }),
    );
    assert_eq!(
        opened
            .get("collection")
            .and_then(|c| c.get("thumbnail"))
            .and_then(|v| v.as_str()),
        Some(thumbnail.as_str())
    );
}

#[test]
fn last_modified_never_decreases() {
    let workspace = temp_dir("vlabs-collections-lastmodified");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "collections.create",
        json!({ "title": "Timeline" }),
    );
    let collection_id = created
        .get("collectionId")
        .and_then(|v| v.as_str())
        .expect("collectionId")
        .to_string();

    let mut last = 0i64;
    for (i, exp) in [EXP_STACKS, EXP_BST].iter().enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("add-{i}"),
            "collections.addExperiment",
            json!({ "collectionId": collection_id, "experimentId": exp }),
        );
        let opened = request_ok(
            &mut stdin,
            &mut reader,
            &format!("open-{i}"),
            "collections.open",
            json!({ "collectionId": collection_id }),
        );
        let stamp = opened
            .get("collection")
            .and_then(|c| c.get("lastModified"))
            .and_then(|v| v.as_i64())
            .expect("lastModified");
        assert!(stamp >= last, "lastModified went backwards");
        last = stamp;
    }
}

#[test]
fn rapid_creation_yields_distinct_ids() {
    let workspace = temp_dir("vlabs-collections-ids");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let mut ids = std::collections::HashSet::new();
    for i in 0..20 {
        let created = request_ok(
            &mut stdin,
            &mut reader,
            &format!("create-{i}"),
            "collections.create",
            json!({ "title": format!("Batch {i}") }),
        );
        let id = created
            .get("collectionId")
            .and_then(|v| v.as_str())
            .expect("collectionId")
            .to_string();
        assert!(ids.insert(id), "duplicate collection id");
    }
}

#[test]
fn mutations_on_a_missing_collection_are_quiet_no_ops() {
    let workspace = temp_dir("vlabs-collections-missing");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "collections.addExperiment",
        json!({ "collectionId": "nope", "experimentId": EXP_STACKS }),
    );
    assert_eq!(added.get("found").and_then(|v| v.as_bool()), Some(false));

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "collections.removeExperiment",
        json!({ "collectionId": "nope", "experimentId": EXP_STACKS }),
    );
    assert_eq!(removed.get("found").and_then(|v| v.as_bool()), Some(false));

    // Double-delete: the second call finds nothing and stays ok.
    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "collections.delete",
        json!({ "collectionId": "nope" }),
    );
    assert_eq!(deleted.get("deleted").and_then(|v| v.as_bool()), Some(false));
}
