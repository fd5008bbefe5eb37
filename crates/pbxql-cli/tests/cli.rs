//! Runs the `pbxql` binary end to end.

use std::process::Command;

fn schema(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("fields.json");
    std::fs::write(
        &path,
        r#"{"fields": [
            {"id": "name", "type": "varchar", "searchable": true},
            {"id": "active", "type": "boolean"}
        ]}"#,
    )
    .unwrap();
    path
}

fn pbxql(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pbxql"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn prints_sql() {
    let dir = tempfile::tempdir().unwrap();
    let path = schema(&dir);
    let out = pbxql(&[
        "--schema",
        path.to_str().unwrap(),
        "compile",
        r#"active = true and * like "%a%""#,
    ]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap().trim_end(),
        r#""active" = TRUE AND (lower("name") like lower('%a%'))"#
    );
}

#[test]
fn fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = schema(&dir);
    let out = pbxql(&["--schema", path.to_str().unwrap(), "compile", "active like x"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("operator 'LIKE' is not valid"), "{stderr}");
}

#[test]
fn missing_schema_file() {
    let out = pbxql(&["--schema", "/no/such/file.yaml", "compile", "a = 1"]);
    assert!(!out.status.success());
    assert!(String::from_utf8(out.stderr)
        .unwrap()
        .contains("cannot load schema"));
}
