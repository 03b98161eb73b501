//! End-to-end install lifecycle against a directory registry

mod common;

use common::{depot, write_source};
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_publish_install_list_uninstall_cycle() {
    let home = TempDir::new().expect("home");
    let source = home.path().join("src/base-lib");
    write_source(&source, "base-lib", "1.0.0");

    depot(home.path())
        .args(["publish", "--yes"])
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Published"));

    depot(home.path())
        .args(["install", "base-lib@^1.0.0", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed base-lib 1.0.0"));

    depot(home.path())
        .args(["list", "--integrity"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base-lib"))
        .stdout(predicate::str::contains("blake3:"));

    // Same release again short-circuits
    depot(home.path())
        .args(["install", "base-lib", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed"));

    depot(home.path())
        .args(["uninstall", "base-lib", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed base-lib"));

    depot(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No packages installed."));
}

#[test]
fn test_install_unknown_package_fails() {
    let home = TempDir::new().expect("home");
    depot(home.path())
        .args(["install", "ghost", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_install_with_wrong_expected_integrity_fails() {
    let home = TempDir::new().expect("home");
    let source = home.path().join("src/base-lib");
    write_source(&source, "base-lib", "1.0.0");

    depot(home.path())
        .args(["publish", "--yes"])
        .arg(&source)
        .assert()
        .success();

    depot(home.path())
        .args([
            "install",
            "base-lib",
            "--integrity",
            "blake3:definitely-wrong",
            "--yes",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Integrity mismatch"));

    // Nothing was installed
    depot(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No packages installed."));
}

#[test]
fn test_deps_reports_classification() {
    let home = TempDir::new().expect("home");

    let util = home.path().join("src/util-lib");
    write_source(&util, "util-lib", "2.1.0");
    depot(home.path())
        .args(["publish", "--yes"])
        .arg(&util)
        .assert()
        .success();

    depot(home.path())
        .args(["install", "util-lib", "--yes"])
        .assert()
        .success();

    // A package whose source references an object owned by util-lib picks
    // up a pinned dependency at publish time
    let app = home.path().join("src/app");
    write_source(&app, "app", "1.0.0");
    std::fs::write(
        app.join("references.yaml"),
        "- object: zcl_util\n  package: util-lib\n",
    )
    .expect("references");

    depot(home.path())
        .args(["publish", "--yes"])
        .arg(&app)
        .assert()
        .success();

    depot(home.path())
        .args(["deps", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("util-lib"))
        .stdout(predicate::str::contains("1 satisfied, 0 missing"));
}

#[test]
#[serial]
fn test_home_from_environment() {
    let home = TempDir::new().expect("home");
    let mut cmd = assert_cmd::Command::cargo_bin("depot").expect("binary builds");
    cmd.env("DEPOT_HOME", home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No packages installed."));
}
