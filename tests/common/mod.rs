//! Shared helpers for CLI integration tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;

/// A depot command rooted at the given home directory
pub fn depot(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("depot").expect("binary builds");
    cmd.arg("--home").arg(home);
    cmd.env_remove("DEPOT_HOME");
    cmd
}

/// Write a publishable package source directory
pub fn write_source(dir: &Path, name: &str, version: &str) {
    fs::create_dir_all(dir).expect("source dir");
    fs::write(
        dir.join("depot.yaml"),
        format!("name: {name}\nversion: {version}\n"),
    )
    .expect("manifest");
    fs::write(dir.join("objects.def"), format!("{name} object definitions"))
        .expect("content file");
}
