use hpkg_cli::archive::Manifest;
use hpkg_cli::workspace_map::{FileWorkspaceMap, WorkspaceMap};
use predicates::prelude::*;
use std::fs;

use crate::common::{TestProject, dependency};

#[test]
fn test_hpl_uses_configured_host_home() {
    let project = TestProject::new().unwrap();
    project.repository().library("org.example", "util", "1.0", &[]).unwrap();
    project.write_project("1.0-SNAPSHOT", &dependency("util", "1.0")).unwrap();
    project.write_sources().unwrap();

    project
        .hpkg()
        .arg("hpl")
        .assert()
        .success()
        .stdout(predicate::str::contains("hello-1.0-SNAPSHOT.hpl"));

    let hpl = project.root().join("host-home/plugins/hello-1.0-SNAPSHOT.hpl");
    let manifest = Manifest::parse(&fs::read_to_string(hpl).unwrap()).unwrap();
    let libraries = manifest.get("Libraries").unwrap();
    assert!(libraries.contains("classes"));
    assert!(libraries.ends_with("util-1.0.jar"));
    assert!(manifest.get("Resource-Path").unwrap().ends_with("webapp"));
    assert!(manifest.get("Plugin-Version").unwrap().starts_with("1.0-SNAPSHOT ("));
}

#[test]
fn test_hpl_host_home_flag_wins() {
    let project = TestProject::new().unwrap();
    project.write_project("1.0", "").unwrap();
    let home = project.root().join("other-home");

    project.hpkg().arg("hpl").arg("--host-home").arg(&home).assert().success();
    assert!(home.join("plugins/hello-1.0.hpl").is_file());
    assert!(!project.root().join("host-home/plugins/hello-1.0.hpl").exists());
}

#[test]
fn test_record_core_location() {
    let project = TestProject::new().unwrap();
    project.write_project("2.0-SNAPSHOT", "").unwrap();

    project
        .hpkg()
        .arg("record-core-location")
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example:hello:hpi:2.0-SNAPSHOT"));

    let map = FileWorkspaceMap::new(project.root().join("hpl-map"));
    let recorded = map.read("org.example:hello:hpi:2.0-SNAPSHOT", None).unwrap().unwrap();
    assert_eq!(recorded.canonicalize().unwrap(), project.project_path().canonicalize().unwrap());
}

#[test]
fn test_record_core_location_skips_releases() {
    let project = TestProject::new().unwrap();
    project.write_project("2.0", "").unwrap();

    project
        .hpkg()
        .arg("record-core-location")
        .assert()
        .success()
        .stdout(predicate::str::contains("not a snapshot"));
    assert!(!project.root().join("hpl-map").exists());
}
