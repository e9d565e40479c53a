//! The `package` goal: builds the plugin archive.
//!
//! Layout of the result:
//!
//! ```text
//! {output}/{finalName}/                exploded webapp
//! {output}/{finalName}/META-INF/MANIFEST.MF
//! {output}/{finalName}/WEB-INF/lib/    bundled libraries + {artifactId}.jar
//! {output}/{finalName}/WEB-INF/tld/
//! {output}/{finalName}.jar             the project's own classes
//! {output}/{finalName}.hpi.mf          copy of the header
//! {output}/{finalName}.{hpi|jpi}       the archive
//! ```

use super::BuildContext;
use crate::archive::{ArchiveWriter, Manifest};
use crate::assembler::{AssemblyLayout, AssemblyReport, ClasspathAssembler};
use crate::constants::{LIB_DIR, MANIFEST_ENTRY, attr};
use crate::core::HpkgError;
use crate::resolver::BundleDecision;
use crate::utils::fs::{atomic_write, copy_dir, copy_if_modified, ensure_dir};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// What `package` produced.
#[derive(Debug, Clone)]
pub struct PackageReport {
    pub archive: PathBuf,
    pub exploded_dir: PathBuf,
    pub manifest: Manifest,
    /// File names placed in `WEB-INF/lib`, excluding the project's own jar.
    pub bundled: Vec<String>,
    /// Decisions for every artifact met, by coordinate id.
    pub decisions: BTreeMap<String, BundleDecision>,
    pub assembly: AssemblyReport,
}

/// Runs the `package` goal.
///
/// # Errors
///
/// Any resolution, classification, version policy or assembly failure.
pub fn package(
    context: &BuildContext,
    writer: &dyn ArchiveWriter,
) -> Result<PackageReport, HpkgError> {
    let project = &context.project;
    let (manifest, plan, _) = context.plan()?;

    let exploded = project.exploded_dir();
    ensure_dir(&exploded)?;
    let sources = copy_dir(&project.webapp_dir(), &exploded)?;
    info!("Copied {sources} webapp source file(s) into {}", exploded.display());

    atomic_write(&exploded.join(MANIFEST_ENTRY), &manifest.to_bytes())?;

    let classes_jar = project.classes_jar();
    writer.write_archive(&manifest, &project.classes_dir(), &classes_jar)?;
    let lib_dir = exploded.join(LIB_DIR);
    ensure_dir(&lib_dir)?;
    copy_if_modified(&classes_jar, &lib_dir.join(format!("{}.jar", project.artifact_id())))?;

    let assembler = ClasspathAssembler::new(AssemblyLayout {
        webapp_dir: exploded.clone(),
        unpack_dir: project.unpack_dir(),
    })
    .with_overlay_filter(project.overlay_filter()?);
    let assembly = assembler.assemble(&plan)?;

    let header_copy = project.output_dir().join(format!("{}.hpi.mf", project.final_name()));
    atomic_write(&header_copy, &manifest.to_bytes())?;

    let archive = project.archive_path();
    writer.write_archive(&manifest, &exploded, &archive)?;
    info!(
        "Built {} {} as {}",
        manifest.get(attr::SHORT_NAME).unwrap_or(project.artifact_id()),
        manifest.get(attr::PLUGIN_VERSION).unwrap_or(project.version()),
        archive.display()
    );

    Ok(PackageReport {
        archive,
        exploded_dir: exploded,
        bundled: plan.libraries().map(|e| e.file_name.clone()).collect(),
        decisions: plan.decisions.clone(),
        manifest,
        assembly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ZipArchiveWriter, read_manifest};
    use crate::project::Project;
    use crate::resolver::DeclaredDependency;
    use crate::test_utils::RepositoryBuilder;
    use std::fs;
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> BuildContext {
        let repo = RepositoryBuilder::new(temp.path().join("repo"));
        repo.library("org.jenkins-ci.main", "jenkins-core", "2.401", &[
            DeclaredDependency::new("org.example", "core-lib", "1.0"),
        ])
        .unwrap();
        repo.library("org.example", "core-lib", "1.0", &[]).unwrap();
        repo.library("org.example", "util", "1.0", &[
            DeclaredDependency::new("org.example", "helper", "2.0"),
        ])
        .unwrap();
        repo.library("org.example", "helper", "2.0", &[]).unwrap();
        repo.library("org.example", "plugin-lib", "3.0", &[]).unwrap();
        repo.plugin("org.example", "credentials", "2.3", &[
            DeclaredDependency::new("org.example", "plugin-lib", "3.0"),
        ])
        .unwrap();

        let project_dir = temp.path().join("hello");
        let classes = project_dir.join("target/classes/org/example");
        fs::create_dir_all(&classes).unwrap();
        fs::write(classes.join("Hello.class"), b"\xca\xfe").unwrap();
        let webapp = project_dir.join("src/main/webapp");
        fs::create_dir_all(&webapp).unwrap();
        fs::write(webapp.join("index.jelly"), "<j:jelly/>").unwrap();

        let text = r#"
[project]
group-id = "org.example"
artifact-id = "hello"
version = "1.0"

[[dependencies]]
group-id = "org.jenkins-ci.main"
artifact-id = "jenkins-core"
version = "2.401"
scope = "provided"

[[dependencies]]
group-id = "org.example"
artifact-id = "util"
version = "1.0"

[[dependencies]]
group-id = "org.example"
artifact-id = "credentials"
version = "2.3"
"#;
        let project = Project::parse(text, "hpkg.toml", &project_dir).unwrap();
        BuildContext::new(project, repo.repository().clone())
    }

    #[test]
    fn test_package_layout() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        let report = package(&ctx, &ZipArchiveWriter).unwrap();

        assert_eq!(report.bundled, vec!["helper-2.0.jar", "util-1.0.jar"]);
        let lib = report.exploded_dir.join(LIB_DIR);
        assert!(lib.join("util-1.0.jar").is_file());
        assert!(lib.join("helper-2.0.jar").is_file());
        assert!(lib.join("hello.jar").is_file());
        assert!(!lib.join("plugin-lib-3.0.jar").exists());
        assert!(!lib.join("core-lib-1.0.jar").exists());
        assert!(report.exploded_dir.join("index.jelly").is_file());
        assert!(temp.path().join("hello/target/hello-1.0.hpi.mf").is_file());

        let manifest = read_manifest(&report.archive).unwrap().unwrap();
        assert_eq!(manifest.get("Plugin-Dependencies"), Some("credentials:2.3"));
        assert_eq!(manifest.get("Jenkins-Version"), Some("2.401"));
        assert_eq!(manifest.get("Short-Name"), Some("hello"));
        assert_eq!(
            report.decisions.get("org.example:credentials:jar:2.3"),
            Some(&BundleDecision::ExcludeAsPlugin)
        );
    }

    #[test]
    fn test_repackaging_is_incremental() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        let first = package(&ctx, &ZipArchiveWriter).unwrap();
        assert_eq!(first.assembly.copied, 2);

        let second = package(&ctx, &ZipArchiveWriter).unwrap();
        assert_eq!(second.assembly.copied, 0);
        assert_eq!(second.assembly.up_to_date, 2);
        assert_eq!(second.bundled, first.bundled);
    }
}
