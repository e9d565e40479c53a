//! Goals that look at the project's plugin dependencies rather than its
//! libraries.
//!
//! - [`assemble_dependencies`] copies every transitive plugin dependency's
//!   archive into one directory, e.g. to seed a test instance.
//! - [`list_plugin_dependencies`] prints the direct plugin dependencies.
//! - [`validate`] checks that no plugin dependency needs a newer host than
//!   the one the project builds against.

use super::BuildContext;
use super::header::host_version;
use crate::artifact::{ArchiveClassifier, ArtifactFacade, ArtifactSet, Scope};
use crate::constants::{BUNDLED_PLUGINS_FILE, attr};
use crate::core::HpkgError;
use crate::resolver::{ResolutionService, TraversalPolicy, traverse};
use crate::utils::fs::{copy_if_modified, ensure_dir, safe_write};
use crate::version::ArtifactVersion;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options of [`assemble_dependencies`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Target directory; `{output}/plugins` when unset.
    pub output: Option<PathBuf>,
    /// Scopes to follow from the project.
    pub scopes: Vec<Scope>,
    /// Also follow optional dependencies.
    pub include_optional: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            output: None,
            scopes: vec![Scope::Compile, Scope::Runtime],
            include_optional: false,
        }
    }
}

/// What [`assemble_dependencies`] did.
#[derive(Debug, Clone, Default)]
pub struct AssembleReport {
    pub output_dir: PathBuf,
    /// Archives written in this run; up-to-date copies are not listed.
    pub copied: Vec<PathBuf>,
    /// Plugin artifactIds, sorted.
    pub plugins: Vec<String>,
}

/// Copies the archive of every plugin reachable from the project into one
/// directory as `{artifactId}.hpi`, newest version winning per artifactId,
/// and writes the sorted id list to `bundled-plugins.txt` next to them.
///
/// # Errors
///
/// Resolution or classification failures, a plugin without an `hpi`
/// archive, or copy failures.
pub fn assemble_dependencies(
    context: &BuildContext,
    options: &AssembleOptions,
) -> Result<AssembleReport, HpkgError> {
    let project = &context.project;
    let collected = context.collect()?;
    let policy = TraversalPolicy::collect_plugins(options.scopes.clone(), options.include_optional);
    let outcome = traverse(
        &collected.tree,
        &policy,
        &ArchiveClassifier::strict(),
        &project.host_core_matcher(),
    )?;

    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| project.output_dir().join("plugins"));
    ensure_dir(&output_dir)?;

    let mut report = AssembleReport {
        output_dir: output_dir.clone(),
        ..AssembleReport::default()
    };
    for plugin in outcome.plugins.values() {
        let archive = plugin_archive(context, plugin)?;
        let extension = archive.extension().and_then(|e| e.to_str()).unwrap_or("hpi");
        let target = output_dir.join(format!("{}.{extension}", plugin.artifact_id()));
        if copy_if_modified(&archive, &target)? {
            debug!("Copied {} to {}", plugin.id(), target.display());
            report.copied.push(target);
        }
        report.plugins.push(plugin.artifact_id().to_string());
    }
    report.plugins.sort();

    let mut listing = report.plugins.join("\n");
    if !listing.is_empty() {
        listing.push('\n');
    }
    safe_write(&output_dir.join(BUNDLED_PLUGINS_FILE), &listing)?;
    info!(
        "Assembled {} plugin(s) into {} ({} copied)",
        report.plugins.len(),
        output_dir.display(),
        report.copied.len()
    );
    Ok(report)
}

/// The `hpi` archive for a plugin dependency, which usually sits next to
/// the jar the project depends on.
fn plugin_archive(context: &BuildContext, plugin: &ArtifactFacade) -> Result<PathBuf, HpkgError> {
    if matches!(plugin.artifact_type(), "hpi" | "jpi")
        && let Some(file) = plugin.file()
    {
        return Ok(file.to_path_buf());
    }
    let coordinate = plugin.coordinate().clone().with_type("hpi");
    context.repository.resolve_file(&coordinate)
}

/// Direct plugin dependencies as `groupId:artifactId:version`, optionally
/// written one per line to `output`.
///
/// # Errors
///
/// Resolution failures, or a failure writing `output`.
pub fn list_plugin_dependencies(
    context: &BuildContext,
    output: Option<&Path>,
) -> Result<Vec<String>, HpkgError> {
    let collected = context.collect()?;
    let lines: Vec<String> = collected
        .tree
        .direct_dependencies()
        .retain(ArtifactFacade::is_plugin_best_effort)
        .iter()
        .map(|a| format!("{}:{}:{}", a.group_id(), a.artifact_id(), a.version()))
        .collect();

    for line in &lines {
        debug!("Plugin dependency {line}");
    }
    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let content: String = lines.iter().map(|l| format!("{l}\n")).collect();
        safe_write(path, &content)?;
        info!("Wrote plugin dependencies to {}", path.display());
    }
    Ok(lines)
}

/// Outcome of a successful [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Host version the project builds against.
    pub host_version: String,
    /// The dependency with the highest host requirement and that version.
    pub max_required: Option<(String, String)>,
    /// Number of plugin dependencies inspected.
    pub checked: usize,
}

/// Checks that every plugin dependency runs on the project's host version.
///
/// Inspected are the direct dependencies in any scope plus everything on
/// the runtime classpath (`compile` and `runtime` scope).
///
/// A dependency that is not a regular file (a workspace build directory)
/// is assumed to need the project's own host version.
///
/// # Errors
///
/// [`HpkgError::HostVersionNotFound`] when the host version cannot be
/// determined, [`HpkgError::ArchiveError`] for a plugin without a host
/// version attribute, and [`HpkgError::IncompatibleHostVersion`] when a
/// dependency needs a newer host.
pub fn validate(context: &BuildContext) -> Result<ValidationReport, HpkgError> {
    let collected = context.collect()?;
    let direct = collected.tree.direct_dependencies();
    let host = host_version(&context.project, &direct)?;

    let runtime = collected
        .tree
        .all_dependencies()
        .scope_is(&[Scope::Compile, Scope::Runtime]);
    let mut candidates: BTreeMap<String, ArtifactFacade> = BTreeMap::new();
    for artifact in runtime.iter().chain(direct.iter()) {
        candidates.entry(artifact.id()).or_insert_with(|| artifact.clone());
    }
    let plugins = candidates
        .into_values()
        .collect::<ArtifactSet>()
        .retain(ArtifactFacade::is_plugin_best_effort);

    let mut max_required: Option<(String, String)> = None;
    for plugin in plugins.iter() {
        let required = required_host_version(plugin, &host)?;
        debug!("{} requires host {required}", plugin.id());
        let is_max = max_required
            .as_ref()
            .is_none_or(|(_, max)| ArtifactVersion::parse(&required) > ArtifactVersion::parse(max));
        if is_max {
            max_required = Some((plugin.id(), required));
        }
    }

    if let Some((artifact, required)) = &max_required
        && ArtifactVersion::parse(&host) < ArtifactVersion::parse(required)
    {
        return Err(HpkgError::IncompatibleHostVersion {
            artifact: artifact.clone(),
            required: required.clone(),
            actual: host,
        });
    }

    info!("All {} plugin dependencies run on host {host}", plugins.len());
    Ok(ValidationReport {
        host_version: host,
        max_required,
        checked: plugins.len(),
    })
}

fn required_host_version(plugin: &ArtifactFacade, host: &str) -> Result<String, HpkgError> {
    let Some(file) = plugin.file().filter(|f| f.is_file()) else {
        warn!(
            "Skipping host version validation for {} as it is not a regular file, \
             assuming it requires {host}",
            plugin.id()
        );
        return Ok(host.to_string());
    };
    let manifest = plugin.read_manifest()?;
    manifest
        .as_ref()
        .and_then(|m| m.get(attr::JENKINS_VERSION).or_else(|| m.get(attr::HUDSON_VERSION)))
        .map(str::to_string)
        .ok_or_else(|| HpkgError::ArchiveError {
            path: file.to_path_buf(),
            reason: format!("Could not find Jenkins Version in manifest for {}", plugin.id()),
        })
}
