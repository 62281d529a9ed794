//! Integration tests for merging files into stdout and into an output file.

use predicates::prelude::*;

use crate::{logmerge, write_log};

const A: &str = "2023-01-01 00:00:01,000 hello\n  continuation\n";
const B: &str = "2023-01-01 00:00:00,500 world\n";

#[test]
fn merges_by_timestamp_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_log(dir.path(), "a.log", A);
    let b = write_log(dir.path(), "b.log", B);
    logmerge()
        .args(["-o", "-", "--color", "never"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(
            "log2 2023-01-01 00:00:00,500 world\n\
             log1 2023-01-01 00:00:01,000 hello\n\
             log1   continuation\n",
        );
}

#[test]
fn explicit_prefixes() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_log(dir.path(), "a.log", A);
    let b = write_log(dir.path(), "b.log", B);
    logmerge()
        .args(["-o", "-", "-p", "web,db"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("db 2023-01-01 00:00:00,500 world\n"))
        .stdout(predicate::str::contains("web   continuation\n"));
}

#[test]
fn no_prefix_outputs_raw_lines() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_log(dir.path(), "a.log", A);
    let b = write_log(dir.path(), "b.log", B);
    logmerge()
        .args(["-o", "-", "--no-prefix"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(
            "2023-01-01 00:00:00,500 world\n\
             2023-01-01 00:00:01,000 hello\n  \
             continuation\n",
        );
}

#[test]
fn tie_goes_to_first_listed_file() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_log(dir.path(), "a.log", "2023-01-01 00:00:00,000 from a\n");
    let b = write_log(dir.path(), "b.log", "2023-01-01 00:00:00,000 from b\n");

    logmerge()
        .args(["-o", "-", "--no-prefix"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout("2023-01-01 00:00:00,000 from a\n2023-01-01 00:00:00,000 from b\n");

    logmerge()
        .args(["-o", "-", "--no-prefix"])
        .arg(&b)
        .arg(&a)
        .assert()
        .success()
        .stdout("2023-01-01 00:00:00,000 from b\n2023-01-01 00:00:00,000 from a\n");
}

#[test]
fn three_files_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_log(dir.path(), "a.log", "1672531201 a1\n1672531204 a2\n");
    let b = write_log(dir.path(), "b.log", "2023/01/01 00:00:02.000000 b1\n");
    let c = write_log(dir.path(), "c.log", " 2023-01-01T00:00:03,000 c1\n");
    let output = logmerge()
        .args(["-o", "-", "--no-prefix"])
        .arg(&a)
        .arg(&b)
        .arg(&c)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let tags: Vec<&str> = stdout
        .lines()
        .map(|l| l.rsplit(' ').next().unwrap())
        .collect();
    assert_eq!(tags, ["a1", "b1", "c1", "a2"]);
}

#[test]
fn writes_merged_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_log(dir.path(), "a.log", A);
    let b = write_log(dir.path(), "b.log", B);
    logmerge()
        .current_dir(dir.path())
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged logs saved to merged.log"));

    let merged = std::fs::read_to_string(dir.path().join("merged.log")).unwrap();
    assert_eq!(
        merged,
        "log2 2023-01-01 00:00:00,500 world\n\
         log1 2023-01-01 00:00:01,000 hello\n\
         log1   continuation\n"
    );
}

#[test]
fn existing_output_is_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_log(dir.path(), "a.log", A);
    let b = write_log(dir.path(), "b.log", B);
    write_log(dir.path(), "timeline.log", "keep me\n");

    logmerge()
        .current_dir(dir.path())
        .args(["-o", "timeline"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("timeline1.log"));

    assert_eq!(
        std::fs::read_to_string(dir.path().join("timeline.log")).unwrap(),
        "keep me\n"
    );
    assert!(dir.path().join("timeline1.log").exists());
}

#[test]
fn leading_untimestamped_lines_come_first() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_log(dir.path(), "a.log", "2023-01-01 00:00:00,000 early\n");
    let b = write_log(
        dir.path(),
        "b.log",
        "=== log start ===\n2023-01-01 00:00:01,000 late\n",
    );
    logmerge()
        .args(["-o", "-", "--no-prefix"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(
            "=== log start ===\n\
             2023-01-01 00:00:00,000 early\n\
             2023-01-01 00:00:01,000 late\n",
        );
}

#[test]
fn verbose_logs_to_stderr_only() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_log(dir.path(), "a.log", A);
    let b = write_log(dir.path(), "b.log", B);
    logmerge()
        .args(["-o", "-", "--no-prefix", "-v"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("segmented source").not())
        .stderr(predicate::str::contains("merged sources"));
}
