//! End-to-end tests for the `pd` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SAMPLE: &str = "31415926535897932384";

/// Pack SAMPLE through the binary and write a config pointing at it
fn setup(temp: &TempDir) -> PathBuf {
    let text = temp.path().join("pi.txt");
    fs::write(&text, format!("3.{}\n", &SAMPLE[1..])).unwrap();
    let packed = temp.path().join("pi.bin");

    let config = temp.path().join("pidigits.yml");
    fs::write(&config, format!("file-path: {}\nchunk-size: 4\n", packed.display())).unwrap();

    pd(&config)
        .args(["pack", text.to_str().unwrap(), packed.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Packed 20 digits into 10 bytes"));

    config
}

fn pd(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pd").unwrap();
    cmd.arg("--config").arg(config).env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_digit_and_range() {
    let temp = TempDir::new().unwrap();
    let config = setup(&temp);

    pd(&config).args(["digit", "6"]).assert().success().stdout("2\n");
    pd(&config).args(["range", "0", "5"]).assert().success().stdout("31415\n");
    pd(&config)
        .args(["range", "18", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_search_text_output() {
    let temp = TempDir::new().unwrap();
    let config = setup(&temp);

    pd(&config)
        .args(["search", "265358"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 265358 at: 6"))
        .stdout(predicate::str::contains("31415926535897932384"));

    pd(&config)
        .args(["search", "999999999999999999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"));

    pd(&config)
        .args(["search", "12x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only digits"));
}

#[test]
fn test_search_json_output() {
    let temp = TempDir::new().unwrap();
    let config = setup(&temp);

    let output = pd(&config)
        .args(["search", "5", "--max-matches", "5", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["found"], true);
    assert_eq!(value["positions"], serde_json::json!([4, 8, 10]));
    assert_eq!(value["context"]["start"], 0);
    assert_eq!(value["context"]["pattern_index"], 4);
}

#[test]
fn test_info_json() {
    let temp = TempDir::new().unwrap();
    let config = setup(&temp);

    let output = pd(&config).args(["info", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total_digit_count"], 20);
    assert_eq!(value["byte_length"], 10);
    assert_eq!(value["valid"], true);
    assert_eq!(value["ready"], true);
}

#[test]
fn test_extract_to_file() {
    let temp = TempDir::new().unwrap();
    let config = setup(&temp);
    let out = temp.path().join("digits.txt");

    pd(&config)
        .args(["extract", "--start", "10", "--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 10 digits"));
    assert_eq!(fs::read_to_string(&out).unwrap(), &SAMPLE[10..]);

    pd(&config)
        .args(["extract", "-s", "2", "-n", "3"])
        .assert()
        .success()
        .stdout("415\n");
}

#[test]
fn test_odd_digit_count() {
    let temp = TempDir::new().unwrap();
    let text = temp.path().join("pi.txt");
    fs::write(&text, "31415").unwrap();
    let packed = temp.path().join("pi.bin");
    let config = temp.path().join("pidigits.yml");
    fs::write(&config, format!("file-path: {}\n", packed.display())).unwrap();

    pd(&config)
        .args(["pack", text.to_str().unwrap(), packed.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("--digit-count 5"));

    pd(&config)
        .args(["info", "--digit-count", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Digits: 5"))
        .stdout(predicate::str::contains("Valid: yes"));

    pd(&config)
        .args(["info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid: no"));
}

#[test]
fn test_pack_rejects_garbage() {
    let temp = TempDir::new().unwrap();
    let text = temp.path().join("pi.txt");
    fs::write(&text, "3.14abc").unwrap();
    let packed = temp.path().join("pi.bin");
    let config = temp.path().join("pidigits.yml");
    fs::write(&config, "chunk-size: 16\n").unwrap();

    pd(&config)
        .args(["pack", text.to_str().unwrap(), packed.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unexpected character"));
    assert!(!packed.exists());
}

#[test]
fn test_missing_store_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("pidigits.yml");
    fs::write(&config, format!("file-path: {}\n", temp.path().join("nope.bin").display())).unwrap();

    pd(&config)
        .args(["digit", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open digit store"));
}
