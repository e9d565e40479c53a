use predicates::prelude::*;

use crate::common::{TestProject, declared, dependency};

fn project() -> TestProject {
    let project = TestProject::new().unwrap();
    let repo = project.repository();
    repo.library("org.example", "util", "1.0", &[declared("helper", "2.0")]).unwrap();
    repo.library("org.example", "helper", "2.0", &[]).unwrap();
    repo.plugin("org.example", "credentials", "2.3", &[]).unwrap();
    let deps = [dependency("util", "1.0"), dependency("credentials", "2.3")].concat();
    project.write_project("1.0", &deps).unwrap();
    project
}

#[test]
fn test_tree_shows_decisions() {
    let project = project();
    project
        .hpkg()
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example:hello:hpi:1.0"))
        .stdout(predicate::str::contains("org.example:util:jar:1.0 (compile) [bundled]"))
        .stdout(predicate::str::contains("└── org.example:helper:jar:2.0 (compile) [bundled]"))
        .stdout(predicate::str::contains("org.example:credentials:jar:2.3 (compile) [plugin dependency]"));
}

#[test]
fn test_tree_json() {
    let project = project();
    let output = project.hpkg().args(["tree", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["id"], "org.example:hello:hpi:1.0");
    let children = json["children"].as_array().unwrap();
    assert_eq!(children.len(), 3);
    let util = children.iter().find(|c| c["id"] == "org.example:util:jar:1.0").unwrap();
    assert_eq!(util["decision"], "bundled");
    assert_eq!(util["scope"], "compile");
    assert_eq!(util["children"][0]["id"], "org.example:helper:jar:2.0");
}

#[test]
fn test_tree_marks_repeated_dependencies() {
    let project = TestProject::new().unwrap();
    let repo = project.repository();
    repo.library("org.example", "util", "1.0", &[declared("helper", "2.0")]).unwrap();
    repo.library("org.example", "extra", "1.0", &[declared("helper", "2.0")]).unwrap();
    repo.library("org.example", "helper", "2.0", &[]).unwrap();
    let deps = [dependency("util", "1.0"), dependency("extra", "1.0")].concat();
    project.write_project("1.0", &deps).unwrap();

    project
        .hpkg()
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("│   └── org.example:helper:jar:2.0 (compile) [bundled]\n"))
        .stdout(predicate::str::contains("    └── org.example:helper:jar:2.0 (compile) [bundled] (*)"));

    let output = project.hpkg().args(["tree", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let children = json["children"].as_array().unwrap();
    let util = children.iter().find(|c| c["id"] == "org.example:util:jar:1.0").unwrap();
    let extra = children.iter().find(|c| c["id"] == "org.example:extra:jar:1.0").unwrap();
    assert!(util["children"][0].get("duplicate").is_none());
    assert_eq!(extra["children"][0]["duplicate"], true);
    assert_eq!(extra["children"][0]["children"].as_array().unwrap().len(), 0);
}
