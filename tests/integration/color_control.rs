//! Integration tests for color control: --color flag, `NO_COLOR`, output destination.

use crate::{logmerge, write_log};

fn sources(dir: &std::path::Path) -> [std::path::PathBuf; 2] {
    [
        write_log(dir, "a.log", "2023-01-01 00:00:01,000 hello\n  continuation\n"),
        write_log(dir, "b.log", "2023-01-01 00:00:00,500 world\n"),
    ]
}

#[test]
fn color_never_disables_ansi() {
    let dir = tempfile::tempdir().unwrap();
    let output = logmerge()
        .args(["-o", "-", "--color=never"])
        .args(sources(dir.path()))
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        !stdout.contains("\x1b["),
        "Should not contain ANSI escapes with --color=never"
    );
}

#[test]
fn color_always_colors_every_line() {
    let dir = tempfile::tempdir().unwrap();
    let output = logmerge()
        .args(["-o", "-", "--color=always"])
        .args(sources(dir.path()))
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 3);
    assert!(
        stdout.lines().all(|l| l.starts_with("\x1b[")),
        "every line should be colored: {stdout:?}"
    );
}

#[test]
fn color_without_prefixes_drops_prefixes() {
    let dir = tempfile::tempdir().unwrap();
    let output = logmerge()
        .args(["-o", "-", "--color=always"])
        .args(sources(dir.path()))
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("log1"), "{stdout:?}");
    assert!(!stdout.contains("log2"), "{stdout:?}");
}

#[test]
fn color_with_prefixes_keeps_them() {
    let dir = tempfile::tempdir().unwrap();
    let output = logmerge()
        .args(["-o", "-", "--color=always", "-p", "web,db"])
        .args(sources(dir.path()))
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("db 2023-01-01 00:00:00,500 world"));
    assert!(stdout.contains("web   continuation"));
}

#[test]
fn piped_stdout_disables_colors_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let output = logmerge()
        .args(["-o", "-"])
        .args(sources(dir.path()))
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        !stdout.contains("\x1b["),
        "Piped output should not have ANSI escapes in auto mode"
    );
    assert!(stdout.contains("log1 "));
}

#[test]
fn no_color_env_disables_colors() {
    let dir = tempfile::tempdir().unwrap();
    let output = logmerge()
        .env("NO_COLOR", "1")
        .args(["-o", "-"])
        .args(sources(dir.path()))
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("\x1b["));
}

#[test]
fn file_output_is_plain_in_auto_mode() {
    let dir = tempfile::tempdir().unwrap();
    logmerge()
        .current_dir(dir.path())
        .args(sources(dir.path()))
        .assert()
        .success();
    let merged = std::fs::read_to_string(dir.path().join("merged.log")).unwrap();
    assert!(!merged.contains("\x1b["));
}
