use predicates::prelude::*;
use std::fs;

use crate::common::{TestProject, dependency};

#[test]
fn test_missing_project_file() {
    let project = TestProject::new().unwrap();
    project
        .hpkg()
        .arg("package")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("hpkg.toml not found"))
        .stderr(predicate::str::contains("--manifest-path"));
}

#[test]
fn test_invalid_project_file() {
    let project = TestProject::new().unwrap();
    fs::write(project.project_path().join("hpkg.toml"), "[project\nname = ").unwrap();
    project
        .hpkg()
        .arg("validate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("hpkg.toml"));
}

#[test]
fn test_unresolvable_dependency() {
    let project = TestProject::new().unwrap();
    project.write_project("1.0", &dependency("missing", "9.9")).unwrap();
    project
        .hpkg()
        .arg("package")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("org.example:missing:jar:9.9"));
}

#[test]
fn test_provided_plugin_dependency_is_rejected() {
    let project = TestProject::new().unwrap();
    project.repository().plugin("org.example", "credentials", "2.3", &[]).unwrap();
    let provided = format!("{}scope = \"provided\"\n", dependency("credentials", "2.3"));
    project.write_project("1.0", &provided).unwrap();
    project.write_sources().unwrap();

    project
        .hpkg()
        .arg("package")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not use the provided scope"));
}
