use hpkg_cli::archive::read_manifest;
use predicates::prelude::*;

use crate::common::{TestProject, declared, dependency};

fn plugin_project() -> TestProject {
    let project = TestProject::new().unwrap();
    let repo = project.repository();
    repo.library("org.example", "util", "1.0", &[declared("helper", "2.0")]).unwrap();
    repo.library("org.example", "helper", "2.0", &[]).unwrap();
    repo.library("org.example", "plugin-lib", "3.0", &[]).unwrap();
    repo.plugin("org.example", "credentials", "2.3", &[declared("plugin-lib", "3.0")]).unwrap();

    let deps = [dependency("util", "1.0"), dependency("credentials", "2.3")].concat();
    project.write_project("1.0", &deps).unwrap();
    project.write_sources().unwrap();
    project
}

#[test]
fn test_package_builds_archive() {
    let project = plugin_project();

    project
        .hpkg()
        .arg("package")
        .arg("--list-bundled")
        .assert()
        .success()
        .stdout(predicate::str::contains("Packaged"))
        .stdout(predicate::str::contains("hello-1.0.hpi"))
        .stdout(predicate::str::contains("util-1.0.jar"))
        .stdout(predicate::str::contains("helper-2.0.jar"))
        .stdout(predicate::str::contains("plugin-lib").not());

    let target = project.project_path().join("target");
    let lib = target.join("hello-1.0/WEB-INF/lib");
    assert!(lib.join("util-1.0.jar").is_file());
    assert!(lib.join("helper-2.0.jar").is_file());
    assert!(lib.join("hello.jar").is_file());
    assert!(!lib.join("plugin-lib-3.0.jar").exists());
    assert!(target.join("hello-1.0/help.html").is_file());
    assert!(target.join("hello-1.0.hpi.mf").is_file());

    let manifest = read_manifest(&target.join("hello-1.0.hpi")).unwrap().unwrap();
    assert_eq!(manifest.get("Short-Name"), Some("hello"));
    assert_eq!(manifest.get("Long-Name"), Some("Hello Plugin"));
    assert_eq!(manifest.get("Jenkins-Version"), Some("2.401"));
    assert_eq!(manifest.get("Plugin-Dependencies"), Some("credentials:2.3"));
    assert_eq!(manifest.get("Support-Dynamic-Loading"), Some("true"));
}

#[test]
fn test_package_twice_copies_nothing_new() {
    let project = plugin_project();
    project.hpkg().arg("package").assert().success();

    project
        .hpkg()
        .arg("package")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 libraries bundled (0 copied, 2 up to date)"));
}

#[test]
fn test_package_from_manifest_path() {
    let project = plugin_project();
    project
        .hpkg()
        .current_dir(project.root())
        .arg("--manifest-path")
        .arg(project.project_path())
        .arg("package")
        .assert()
        .success();
    assert!(project.project_path().join("target/hello-1.0.hpi").is_file());
}

#[test]
fn test_snapshot_override_policy() {
    let project = plugin_project();
    let deps = [dependency("util", "1.0"), dependency("credentials", "2.3")].concat();
    project
        .write_project(
            "2.5-SNAPSHOT",
            &format!("{deps}\n[plugin]\nsnapshot-version-override = \"2.6-SNAPSHOT\"\n"),
        )
        .unwrap();

    project
        .hpkg()
        .arg("package")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("2.6-SNAPSHOT"));
}
