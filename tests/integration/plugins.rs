use predicates::prelude::*;
use std::fs;

use crate::common::{TestProject, declared, dependency};

fn project_with_plugins(structs_host: &str) -> TestProject {
    let project = TestProject::new().unwrap();
    let repo = project.repository();
    repo.library("org.example", "util", "1.0", &[]).unwrap();
    repo.plugin_for_host("org.example", "structs", "1.2", Some(structs_host), &[]).unwrap();
    repo.plugin_for_host("org.example", "credentials", "2.3", Some("2.361"), &[
        declared("structs", "1.2"),
    ])
    .unwrap();

    let deps = [dependency("util", "1.0"), dependency("credentials", "2.3")].concat();
    project.write_project("1.0", &deps).unwrap();
    project
}

#[test]
fn test_assemble_dependencies() {
    let project = project_with_plugins("2.300");
    let out = project.root().join("assembled");

    project
        .hpkg()
        .arg("assemble-dependencies")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Assembled 2 plugin(s)"));

    assert!(out.join("credentials.hpi").is_file());
    assert!(out.join("structs.hpi").is_file());
    assert!(!out.join("util.hpi").exists());
    assert_eq!(fs::read_to_string(out.join("bundled-plugins.txt")).unwrap(), "credentials\nstructs\n");
}

#[test]
fn test_assemble_dependencies_rejects_unknown_scope() {
    let project = project_with_plugins("2.300");
    project
        .hpkg()
        .args(["assemble-dependencies", "--scopes", "compile,bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bogus"));
}

#[test]
fn test_list_plugin_dependencies() {
    let project = project_with_plugins("2.300");
    let out = project.root().join("plugins.txt");

    project
        .hpkg()
        .arg("list-plugin-dependencies")
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example:credentials:2.3"))
        .stdout(predicate::str::contains("structs").not())
        .stdout(predicate::str::contains("util").not());
    assert_eq!(fs::read_to_string(out).unwrap(), "org.example:credentials:2.3\n");
}

#[test]
fn test_validate_passes() {
    let project = project_with_plugins("2.300");
    project
        .hpkg()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 plugin dependencies run on host 2.401"))
        .stdout(predicate::str::contains("2.361"));
}

#[test]
fn test_validate_fails_on_newer_transitive_requirement() {
    let project = project_with_plugins("2.440.1");
    project
        .hpkg()
        .arg("validate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("org.example:structs:jar:1.2"))
        .stderr(predicate::str::contains("2.440.1"));
}
