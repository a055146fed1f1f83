//! End-to-end extraction over an on-disk mail tree.

use std::path::{Path, PathBuf};

use mailextract::config::ExtractConfig;
use mailextract::error::ExtractError;
use mailextract::extract::extract_archive;
use mailextract::index::reader::{read_index, IndexRow};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn extract_fixture(out: &Path) -> Vec<IndexRow> {
    let summary =
        extract_archive(&fixture("mailtree"), out, None, &ExtractConfig::default(), None).unwrap();
    assert_eq!(summary.index_path, out.join("mailtree.csv"));
    read_index(&summary.index_path).unwrap()
}

fn artifact(out: &Path, row: &IndexRow) -> String {
    std::fs::read_to_string(out.join(&row.email_id).join("body.html")).unwrap()
}

/// Sorted listing of everything under `dir`, with file sizes.
fn snapshot(dir: &Path) -> Vec<(PathBuf, u64)> {
    fn walk(dir: &Path, acc: &mut Vec<(PathBuf, u64)>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            let meta = entry.metadata().unwrap();
            if meta.is_dir() {
                walk(&path, acc);
            }
            acc.push((path, meta.len()));
        }
    }
    let mut acc = Vec::new();
    walk(dir, &mut acc);
    acc.sort();
    acc
}

// ─── Test 1: every message of the tree, newest first ────────────────

#[test]
fn test_mail_tree_rows_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let rows = extract_fixture(&out);

    let subjects: Vec<&str> = rows.iter().map(|r| r.subject.as_str()).collect();
    assert_eq!(
        subjects,
        vec![
            "February digest",
            "Welcome, team",
            "\"Q3\" plan",
            "Year end",
            "Quick note",
        ]
    );
    let dates: Vec<&str> = rows.iter().map(|r| r.date_received.as_str()).collect();
    assert_eq!(
        dates,
        vec![
            "2024-02-01T12:00:00+00:00",
            // Received header wins over Date
            "2024-01-01T10:00:00+00:00",
            "2023-06-15T06:30:00+00:00",
            "2022-12-31T23:00:00+00:00",
            "[Unreadable Date]",
        ]
    );
}

// ─── Test 2: sender and body rules ──────────────────────────────────

#[test]
fn test_mail_tree_fields_and_bodies() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let rows = extract_fixture(&out);
    let by_subject = |s: &str| rows.iter().find(|r| r.subject == s).unwrap();

    let welcome = by_subject("Welcome, team");
    assert_eq!(welcome.sender, "Ann Example");
    let html = artifact(&out, welcome);
    assert!(html.contains("<h1>Welcome</h1>"));
    assert!(!html.starts_with("<pre>"));

    let note = by_subject("Quick note");
    assert_eq!(note.sender, "bob@example.com");
    assert_eq!(note.body, "hello");
    let body = artifact(&out, note);
    assert!(body.starts_with("<pre>hello"));
    assert!(body.ends_with("</pre>"));

    let plan = by_subject("\"Q3\" plan");
    assert_eq!(plan.sender, "Carol Planner");
    assert!(plan.body.starts_with("Step one, step two."));
    assert!(!plan.body.contains('\n'));
}

// ─── Test 3: output layout ──────────────────────────────────────────

#[test]
fn test_mail_tree_output_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let rows = extract_fixture(&out);

    let mut entries: Vec<String> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();

    let mut expected: Vec<String> = rows.iter().map(|r| r.email_id.clone()).collect();
    expected.push("mailtree.csv".to_string());
    expected.sort();
    assert_eq!(entries, expected);

    let index = std::fs::read_to_string(out.join("mailtree.csv")).unwrap();
    assert!(index.starts_with("email_id,date_received,subject,sender,body\n"));
    assert!(index.contains(",\"\"\"Q3\"\" plan\","));
}

// ─── Test 4: a second run changes nothing ───────────────────────────

#[test]
fn test_second_run_fails_without_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    extract_fixture(&out);
    let before = snapshot(&out);
    let index_before = std::fs::read(out.join("mailtree.csv")).unwrap();

    let err = extract_archive(
        &fixture("mailtree"),
        &out,
        None,
        &ExtractConfig::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::OutputExists(_))
    ));
    assert_eq!(snapshot(&out), before);
    assert_eq!(std::fs::read(out.join("mailtree.csv")).unwrap(), index_before);
}

// ─── Test 5: pre-existing explicit index is refused ─────────────────

#[test]
fn test_existing_index_file_is_refused() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let index = tmp.path().join("index.csv");
    std::fs::write(&index, "keep me").unwrap();

    let err = extract_archive(
        &fixture("mailtree"),
        &out,
        Some(&index),
        &ExtractConfig::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::IndexExists(_))
    ));
    assert!(!out.exists());
    assert_eq!(std::fs::read_to_string(&index).unwrap(), "keep me");
}

// ─── Test 5b: index directory must exist ────────────────────────────

#[test]
fn test_index_in_missing_directory_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let index = tmp.path().join("nodir").join("index.csv");

    let err = extract_archive(
        &fixture("mailtree"),
        &out,
        Some(&index),
        &ExtractConfig::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::IndexDirMissing(_))
    ));
    assert!(!out.exists());
    assert!(!tmp.path().join("nodir").exists());
}

// ─── Test 6: missing input ──────────────────────────────────────────

#[test]
fn test_missing_input_creates_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let err = extract_archive(
        &tmp.path().join("missing.pst"),
        &out,
        None,
        &ExtractConfig::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::InputNotFound(_))
    ));
    assert_eq!(
        err.to_string(),
        format!(
            "The file '{}' does not exist.",
            tmp.path().join("missing.pst").display()
        )
    );
    assert!(!out.exists());
}

// ─── Test 7: a single mbox file as input ────────────────────────────

#[test]
fn test_single_mbox_input() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let summary = extract_archive(
        &fixture("mailtree/lists.mbox"),
        &out,
        None,
        &ExtractConfig::default(),
        None,
    )
    .unwrap();
    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.index_path, out.join("lists.csv"));

    let rows = read_index(&summary.index_path).unwrap();
    assert_eq!(rows[0].subject, "February digest");
    assert_eq!(rows[0].sender, "Dave List");
    assert_eq!(rows[1].subject, "Year end");
}

// ─── Test 8: custom sentinels and artifact name from config ─────────

#[test]
fn test_configured_sentinels() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let config = ExtractConfig {
        date_sentinel: "n/a".to_string(),
        body_file_name: "message.html".to_string(),
        snippet_max_chars: 4,
        ..ExtractConfig::default()
    };
    let summary = extract_archive(&fixture("mailtree"), &out, None, &config, None).unwrap();
    let rows = read_index(&summary.index_path).unwrap();

    let note = rows.iter().find(|r| r.subject == "Quick note").unwrap();
    assert_eq!(note.date_received, "n/a");
    assert_eq!(note.body, "hell");
    assert!(out.join(&note.email_id).join("message.html").is_file());
}
