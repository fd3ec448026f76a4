#[path = "../src/backup.rs"]
mod backup;
#[path = "../src/storage.rs"]
mod storage;


use serde_json::json;
use std::fs::File;
use std::io::Read;
use test_support::{error_code, request, request_ok, spawn_sidecar, temp_dir};

const EXPERIMENT: &str = "67d033429f7984e0c0fa5101";

#[test]
fn bundle_export_and_import_roundtrip() {
    let workspace = temp_dir("vlabs-backup-src");
    let workspace2 = temp_dir("vlabs-backup-dst");
    let out_dir = temp_dir("vlabs-backup-out");
    let bundle_path = out_dir.join("userdata.vlbackup.zip");

    // Seed a store through the daemon, then export it.
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "bookmarks.toggle",
        json!({ "experimentId": EXPERIMENT }),
    );
    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "backup.exportUserData",
        json!({ "outPath": bundle_path.to_string_lossy() }),
    );
    assert_eq!(
        exported.get("bundleFormat").and_then(|v| v.as_str()),
        Some(backup::BUNDLE_FORMAT_V1)
    );
    let exported_sha = exported
        .get("dbSha256")
        .and_then(|v| v.as_str())
        .expect("dbSha256")
        .to_string();
    assert_eq!(exported_sha.len(), 64);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(backup::BUNDLE_FORMAT_V1));
    assert!(manifest.contains(&exported_sha));
    archive.by_name("db/vlabs.sqlite3").expect("store entry in bundle");

    // Import into a second workspace and confirm the state came across.
    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "backup.importUserData",
        json!({
            "workspacePath": workspace2.to_string_lossy(),
            "inPath": bundle_path.to_string_lossy()
        }),
    );
    assert_eq!(
        imported.get("bundleFormatDetected").and_then(|v| v.as_str()),
        Some(backup::BUNDLE_FORMAT_V1)
    );
    assert_eq!(
        imported.get("dbSha256").and_then(|v| v.as_str()),
        Some(exported_sha.as_str())
    );

    let bookmarks = request_ok(&mut stdin, &mut reader, "5", "bookmarks.list", json!({}));
    assert_eq!(
        bookmarks.get("bookmarks").and_then(|v| v.as_array()).cloned(),
        Some(vec![json!(EXPERIMENT)])
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(workspace2);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn import_rejects_a_tampered_payload() {
    let workspace = temp_dir("vlabs-backup-tamper-src");
    let workspace2 = temp_dir("vlabs-backup-tamper-dst");
    let out_dir = temp_dir("vlabs-backup-tamper-out");

    let db_path = workspace.join(storage::DB_FILE_NAME);
    std::fs::write(&db_path, b"sqlite-snapshot-payload").expect("write source store");
    let bundle_path = out_dir.join("userdata.vlbackup.zip");
    let export = backup::export_user_data(&workspace, &bundle_path).expect("export bundle");

    // Rebuild the bundle with the same manifest but a different payload.
    let tampered_path = out_dir.join("tampered.vlbackup.zip");
    {
        let f = File::open(&bundle_path).expect("open bundle");
        let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
        let mut manifest = String::new();
        archive
            .by_name("manifest.json")
            .expect("manifest entry")
            .read_to_string(&mut manifest)
            .expect("read manifest");

        let out = File::create(&tampered_path).expect("create tampered bundle");
        let mut writer = zip::ZipWriter::new(out);
        let opts = zip::write::FileOptions::default();
        use std::io::Write;
        writer.start_file("manifest.json", opts).expect("start manifest");
        writer.write_all(manifest.as_bytes()).expect("write manifest");
        writer
            .start_file("db/vlabs.sqlite3", opts)
            .expect("start payload");
        writer.write_all(b"different-bytes").expect("write payload");
        writer.finish().expect("finish tampered bundle");
    }

    let err = backup::import_user_data(&tampered_path, &workspace2)
        .expect_err("tampered bundle must be rejected");
    assert!(err.to_string().contains("digest mismatch"), "{err}");
    assert!(!workspace2.join(storage::DB_FILE_NAME).exists());

    // The untampered bundle still imports, and its digest matches.
    let import = backup::import_user_data(&bundle_path, &workspace2).expect("import bundle");
    assert_eq!(import.db_sha256, export.db_sha256);
    let restored = std::fs::read(workspace2.join(storage::DB_FILE_NAME)).expect("read restored");
    assert_eq!(restored, b"sqlite-snapshot-payload");

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(workspace2);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn import_rejects_wrong_format_and_non_zip_input() {
    let workspace = temp_dir("vlabs-backup-format-src");
    let workspace2 = temp_dir("vlabs-backup-format-dst");
    let out_dir = temp_dir("vlabs-backup-format-out");

    // Not a zip at all.
    let plain = out_dir.join("plain.txt");
    std::fs::write(&plain, b"hello").expect("write plain file");
    let err = backup::import_user_data(&plain, &workspace2).expect_err("plain file rejected");
    assert!(err.to_string().contains("not a user-data bundle"), "{err}");

    // A zip whose manifest declares a foreign format.
    let foreign = out_dir.join("foreign.zip");
    {
        let out = File::create(&foreign).expect("create foreign bundle");
        let mut writer = zip::ZipWriter::new(out);
        let opts = zip::write::FileOptions::default();
        use std::io::Write;
        writer.start_file("manifest.json", opts).expect("start manifest");
        writer
            .write_all(br#"{"format":"someone-elses-bundle","version":9}"#)
            .expect("write manifest");
        writer.finish().expect("finish foreign bundle");
    }
    let err = backup::import_user_data(&foreign, &workspace2).expect_err("foreign format rejected");
    assert!(err.to_string().contains("unsupported bundle format"), "{err}");

    // Over IPC the same failure maps to a bundle_invalid error code.
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "backup.importUserData",
        json!({ "inPath": foreign.to_string_lossy() }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(error_code(&resp), "bundle_invalid");

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(workspace2);
    let _ = std::fs::remove_dir_all(out_dir);
}
