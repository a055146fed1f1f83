//! Tests that drive the `mailextract` binary.

use std::path::Path;
use std::process::{Command, Output};

use assert_fs::prelude::*;
use predicates::prelude::*;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Run the binary with a config that keeps the log file inside `tmp`.
fn run(tmp: &assert_fs::TempDir, args: &[&str]) -> Output {
    let config = tmp.child("config.toml");
    if !config.path().exists() {
        let cache = tmp.child("cache");
        config
            .write_str(&format!(
                "[general]\ncache_dir = {:?}\n",
                cache.path().to_string_lossy()
            ))
            .unwrap();
    }
    Command::new(env!("CARGO_BIN_EXE_mailextract"))
        .arg("--config")
        .arg(config.path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_extract_reports_and_writes_index() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let out = tmp.child("out");
    let input = fixture("mailtree");

    let output = run(
        &tmp,
        &[
            "extract",
            &*input.to_string_lossy(),
            "-o",
            &*out.path().to_string_lossy(),
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let text = stdout(&output);
    assert!(predicate::str::contains("Exported 5 messages.").eval(&text));
    assert!(predicate::str::contains("CSV saved to:").eval(&text));
    assert!(predicate::str::contains("Email folders created in:").eval(&text));

    out.child("mailtree.csv").assert(predicate::path::is_file());
    out.child("mailtree.csv")
        .assert(predicate::str::starts_with("email_id,date_received,subject,sender,body\n"));
    tmp.child("cache/mailextract.log").assert(predicate::path::exists());
}

#[test]
fn test_second_extract_exits_nonzero() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let out = tmp.child("out");
    let input = fixture("mailtree");
    let args = [
        "extract",
        &*input.to_string_lossy(),
        "-o",
        &*out.path().to_string_lossy(),
    ]
    .map(str::to_string);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    assert!(run(&tmp, &args).status.success());
    let index_before = std::fs::read(out.child("mailtree.csv").path()).unwrap();

    let second = run(&tmp, &args);
    assert!(!second.status.success());
    assert!(predicate::str::contains("already exists").eval(&stderr(&second)));
    assert_eq!(
        std::fs::read(out.child("mailtree.csv").path()).unwrap(),
        index_before
    );
}

#[test]
fn test_missing_input_exits_nonzero() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let out = tmp.child("out");
    let missing = tmp.child("backup.pst");

    let output = run(
        &tmp,
        &[
            "extract",
            &*missing.path().to_string_lossy(),
            "-o",
            &*out.path().to_string_lossy(),
        ],
    );
    assert!(!output.status.success());
    assert!(predicate::str::contains("does not exist").eval(&stderr(&output)));
    out.assert(predicate::path::missing());
}

#[test]
fn test_stats_json() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let out = tmp.child("out");
    let input = fixture("mailtree");
    run(
        &tmp,
        &[
            "extract",
            &*input.to_string_lossy(),
            "-o",
            &*out.path().to_string_lossy(),
        ],
    );

    let index = out.child("mailtree.csv");
    let output = run(&tmp, &["stats", &*index.path().to_string_lossy(), "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let stats: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(stats["message_count"], 5);
    assert_eq!(stats["without_date"], 1);
    assert_eq!(stats["date_range"]["oldest"], "2022-12-31T23:00:00+00:00");
    assert_eq!(stats["date_range"]["newest"], "2024-02-01T12:00:00+00:00");
}
