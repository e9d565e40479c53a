//! The plugin manifest header.
//!
//! Attributes are written in a fixed order so two builds of the same input
//! produce byte-identical manifests. Absent values are left out rather than
//! written empty.

use super::dynamic_loading::support_dynamic_loading;
use super::scm::GitProbe;
use super::version_policy::{BuildStamp, VersionPolicy};
use crate::archive::Manifest;
use crate::artifact::{ArtifactSet, PluginClassifier, Scope};
use crate::constants::{PLUGIN_SERVICE_FILE, attr};
use crate::core::HpkgError;
use crate::project::{Packaging, Project};
use crate::version::VersionComparator;
use tracing::{debug, warn};

const CREATED_BY: &str = concat!("hpkg ", env!("CARGO_PKG_VERSION"));

/// Everything the header depends on besides the project itself.
pub struct HeaderContext<'a> {
    pub project: &'a Project,
    /// The project's direct dependencies, resolved.
    pub direct: &'a ArtifactSet,
    pub classifier: &'a dyn PluginClassifier,
    pub git: &'a GitProbe,
    pub stamp: &'a BuildStamp,
}

/// Host version the plugin is built against.
///
/// Taken from the direct dependency on the host core. A configured override
/// wins only if it is newer than the detected version.
///
/// # Errors
///
/// [`HpkgError::HostVersionNotFound`] if there is no host core dependency
/// and no override.
pub fn host_version(project: &Project, direct: &ArtifactSet) -> Result<String, HpkgError> {
    let override_version = project
        .plugin
        .host_version_override
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let core_ids = project.host_core_ids();

    let detected = core_ids.iter().find_map(|(group_id, artifact_id)| {
        direct
            .clone()
            .group_id_is(&[group_id.as_str()])
            .artifact_id_is(&[artifact_id.as_str()])
            .into_iter()
            .next()
    });
    match (detected, override_version) {
        (Some(core), Some(wanted)) => {
            if VersionComparator::is_newer(wanted, core.version()) {
                return Ok(wanted.to_string());
            }
            warn!(
                "Ignoring host version override {wanted} as the detected version {} is newer. \
                 Please remove the redundant override.",
                core.version()
            );
            Ok(core.version().to_string())
        }
        (Some(core), None) => Ok(core.version().to_string()),
        (None, Some(wanted)) => Ok(wanted.to_string()),
        (None, None) => Err(HpkgError::HostVersionNotFound),
    }
}

/// `Plugin-Dependencies` value: `shortName:version[;resolution:=optional]`
/// for each direct plugin dependency in `compile` or `runtime` scope.
///
/// # Errors
///
/// [`HpkgError::ProvidedPluginDependency`] for a direct plugin dependency in
/// `provided` scope, or any classification failure.
pub fn plugin_dependencies(
    project: &Project,
    direct: &ArtifactSet,
    classifier: &dyn PluginClassifier,
) -> Result<String, HpkgError> {
    let mut entries = Vec::new();
    let bundled = direct
        .clone()
        .scope_is(&[Scope::Compile, Scope::Runtime])
        .remove(|a| a.has_same_ga(project.group_id(), project.artifact_id()));
    for artifact in &bundled {
        if !classifier.is_plugin(artifact)? {
            continue;
        }
        let mut entry =
            format!("{}:{}", artifact.actual_artifact_id()?, artifact.actual_version()?);
        if artifact.is_optional() {
            entry.push_str(";resolution:=optional");
        }
        entries.push(entry);
    }

    for artifact in &direct.clone().scope_is(&[Scope::Provided]) {
        if classifier.is_plugin(artifact)? {
            return Err(HpkgError::ProvidedPluginDependency {
                artifact: artifact.id(),
            });
        }
    }
    Ok(entries.join(","))
}

fn developers(project: &Project) -> Option<String> {
    if project.project.developers.is_empty() {
        return None;
    }
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    Some(
        project
            .project
            .developers
            .iter()
            .map(|d| format!("{}:{}:{}", field(&d.name), field(&d.id), field(&d.email)))
            .collect::<Vec<_>>()
            .join(","),
    )
}

fn plugin_class(project: &Project) -> Result<Option<String>, HpkgError> {
    let service = project.classes_dir().join(PLUGIN_SERVICE_FILE);
    match std::fs::read_to_string(&service) {
        Ok(content) => Ok(content.lines().next().map(|l| l.trim().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Builds the main section of the plugin manifest.
///
/// # Errors
///
/// Version policy, host version, plugin dependency and I/O failures.
pub fn build_header(context: &HeaderContext<'_>) -> Result<Manifest, HpkgError> {
    let project = context.project;
    let plugin = &project.plugin;
    let mut manifest = Manifest::new();

    manifest.insert(attr::MANIFEST_VERSION, "1.0");
    manifest.insert(attr::CREATED_BY, CREATED_BY);
    manifest.insert_opt(attr::PLUGIN_CLASS, plugin_class(project)?);
    manifest.insert(attr::GROUP_ID, project.group_id());
    manifest.insert(attr::ARTIFACT_ID, project.artifact_id());
    manifest.insert(attr::SHORT_NAME, project.artifact_id());
    manifest.insert(attr::LONG_NAME, project.display_name());
    manifest.insert_opt(attr::URL, project.project.url.as_deref());
    manifest.insert_opt(attr::COMPATIBLE_SINCE_VERSION, plugin.compatible_since_version.as_deref());
    manifest.insert_opt(attr::SANDBOX_STATUS, plugin.sandbox_status.as_deref());

    let policy = VersionPolicy {
        snapshot_override: plugin.snapshot_version_override.clone(),
        fail_on_different_release: plugin.fail_on_version_override_to_different_release,
        description: plugin.version_description.clone(),
    };
    let version = policy.plugin_version(project.version(), context.stamp)?;
    if project.packaging() != Packaging::JenkinsModule {
        manifest.insert(attr::PLUGIN_VERSION, version);
    }

    let host = host_version(project, context.direct)?;
    manifest.insert(attr::HUDSON_VERSION, host.as_str());
    manifest.insert(attr::JENKINS_VERSION, host);

    manifest.insert_opt(attr::MASK_CLASSES, plugin.mask_classes.as_deref());
    manifest.insert_opt(attr::GLOBAL_MASK_CLASSES, plugin.global_mask_classes.as_deref());
    if plugin.plugin_first_class_loader {
        manifest.insert(attr::PLUGIN_FIRST_CLASS_LOADER, "true");
    }

    let dependencies = plugin_dependencies(project, context.direct, context.classifier)?;
    if !dependencies.is_empty() {
        manifest.insert(attr::PLUGIN_DEPENDENCIES, dependencies);
    }
    manifest.insert_opt(attr::PLUGIN_DEVELOPERS, developers(project));
    manifest.insert_opt(
        attr::SUPPORT_DYNAMIC_LOADING,
        support_dynamic_loading(&project.classes_dir())?.map(|b| b.to_string()),
    );

    for (index, license) in project.project.licenses.iter().enumerate() {
        let suffix = if index == 0 { String::new() } else { format!("-{}", index + 1) };
        manifest.insert_opt(
            &format!("{}{suffix}", attr::PLUGIN_LICENSE_NAME),
            license.name.as_deref(),
        );
        manifest.insert_opt(
            &format!("{}{suffix}", attr::PLUGIN_LICENSE_URL),
            license.url.as_deref(),
        );
    }
    manifest.insert_opt(attr::PLUGIN_CHANGELOG_URL, project.property("hpi.pluginChangelogUrl"));
    manifest.insert_opt(attr::PLUGIN_LOGO_URL, project.property("hpi.pluginLogoUrl"));

    if let Some(scm) = &project.project.scm {
        manifest.insert_opt(attr::PLUGIN_SCM_CONNECTION, scm.connection.as_deref());
        manifest.insert_opt(attr::PLUGIN_SCM_TAG, scm.tag.as_deref());
        manifest.insert_opt(attr::PLUGIN_SCM_URL, scm.url.as_deref());
    }
    manifest.insert_opt(attr::PLUGIN_GIT_HASH, context.git.head_revision());
    manifest.insert_opt(attr::PLUGIN_MODULE_PATH, context.git.module_path());

    debug!(attributes = manifest.len(), "Built manifest header");
    Ok(manifest)
}
