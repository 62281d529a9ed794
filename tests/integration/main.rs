//! CLI integration tests for `logmerge`.

mod basic_merge;
mod color_control;

use std::path::{Path, PathBuf};

use assert_cmd::Command;

#[allow(deprecated)]
pub fn logmerge() -> Command {
    let mut cmd = Command::cargo_bin("logmerge").unwrap();
    cmd.env("XDG_CONFIG_HOME", "/tmp/logmerge-test-no-config");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Write `content` to `dir/name` and return the path.
pub fn write_log(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
