//! Shared helpers for manifest-fixer integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

/// Wraps `body` in a `<manifest>` declaring the Android namespace.
#[allow(unused)]
pub fn manifest(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<manifest xmlns:android=\"{}\"\n    package=\"com.example.app\">\n{}</manifest>\n",
        ANDROID_NS, body
    )
}

/// Writes `content` to `AndroidManifest.xml` in a fresh temp directory.
pub fn write_manifest(content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("AndroidManifest.xml");
    fs::write(&path, content).unwrap();
    (temp, path)
}

#[allow(unused)]
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Runs manifest-fixer with `args` followed by `input` and `output`.
pub fn run_fixer(
    input: &Path,
    output: Option<&Path>,
    args: &[&str],
) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("manifest-fixer");
    cmd.args(args).arg(input);
    if let Some(output) = output {
        cmd.arg(output);
    }
    cmd.env_remove("RUST_LOG");

    cmd.assert()
}
