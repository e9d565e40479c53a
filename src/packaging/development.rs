//! Local development goals: the `.hpl` descriptor and the workspace map.
//!
//! An `.hpl` file is a manifest that points at the workspace instead of
//! being packed into an archive. The host loads classes from the listed
//! directories and jars, so a rebuild is picked up without repackaging.

use super::BuildContext;
use crate::constants::attr;
use crate::core::HpkgError;
use crate::project::Packaging;
use crate::utils::fs::{atomic_write, ensure_dir};
use crate::workspace_map::WorkspaceMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `{host_home}/plugins/{finalName}.hpl`.
///
/// Returns `None` when the project is not an `hpi` plugin.
///
/// # Errors
///
/// [`HpkgError::ConfigError`] without a host home, otherwise any failure of
/// the shared package planning or of the write.
pub fn write_hpl(
    context: &BuildContext,
    host_home: Option<&Path>,
) -> Result<Option<PathBuf>, HpkgError> {
    let project = &context.project;
    if project.packaging() != Packaging::Hpi {
        info!("Skipping {} because its packaging is not hpi", project.display_name());
        return Ok(None);
    }
    let host_home = host_home.ok_or_else(|| HpkgError::ConfigError {
        message: "host-home must be set to write a local descriptor".to_string(),
    })?;

    let (mut manifest, plan, _) = context.plan()?;

    let mut paths: Vec<String> = project
        .resource_dirs()
        .into_iter()
        .filter(|dir| dir.exists())
        .map(|dir| dir.display().to_string())
        .collect();
    paths.push(project.classes_dir().display().to_string());
    paths.extend(
        plan.libraries()
            .filter_map(|entry| entry.artifact.file())
            .map(|file| file.display().to_string()),
    );
    manifest.insert(attr::LIBRARIES, paths.join(","));
    manifest.insert(attr::RESOURCE_PATH, project.webapp_dir().display().to_string());

    let plugins_dir = host_home.join("plugins");
    ensure_dir(&plugins_dir)?;
    let hpl = plugins_dir.join(format!("{}.hpl", project.final_name()));
    info!("Generating {}", hpl.display());
    atomic_write(&hpl, &manifest.to_bytes())?;
    Ok(Some(hpl))
}

/// Records the project's base directory in the workspace map when the
/// project is a snapshot. Returns the recorded component id.
///
/// # Errors
///
/// Failures of the workspace map.
pub fn record_core_location(
    context: &BuildContext,
    map: &dyn WorkspaceMap,
) -> Result<Option<String>, HpkgError> {
    let project = &context.project;
    if !project.is_snapshot() {
        info!("{} is not a snapshot, nothing to record", project.coordinate().id());
        return Ok(None);
    }
    let id = project.coordinate().id();
    let base_dir = project.base_dir();
    map.write(&id, &base_dir)?;
    info!("Recorded {} at {}", id, base_dir.display());
    Ok(Some(id))
}
