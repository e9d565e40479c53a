use assert_cmd::Command;
use predicates::prelude::*;

fn hpkg() -> Command {
    let mut cmd = Command::cargo_bin("hpkg").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_isolation_check_text() {
    hpkg()
        .args([
            "isolation",
            "check",
            "--chain",
            "servlet",
            "javax.servlet.Filter",
            "org.apache.maven.Maven",
            "com.example.Widget",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("servlet-only -> masking"))
        .stdout(predicate::str::contains("javax.servlet.Filter  exposed by servlet-only"))
        .stdout(predicate::str::contains("org.apache.maven.Maven  denied by masking"))
        .stdout(predicate::str::contains("com.example.Widget  delegated to parent"));
}

#[test]
fn test_isolation_check_resources_json() {
    let output = hpkg()
        .args([
            "isolation",
            "check",
            "--chain",
            "infrastructure",
            "--resource",
            "--json",
            "jndi.properties",
            "logging.properties",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["name"], "jndi.properties");
    assert_eq!(json[0]["kind"], "resource");
    assert_eq!(json[0]["outcome"], "exposed");
    assert_eq!(json[1]["outcome"], "denied");
    assert_eq!(json[1]["layer"], "infrastructure-and-servlet");
}

#[test]
fn test_isolation_check_needs_no_project() {
    let temp = tempfile::TempDir::new().unwrap();
    hpkg()
        .current_dir(temp.path())
        .args(["isolation", "check", "--resource", "META-INF/services/org.sonatype.Foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("denied by masking"));
}
