//! Turns a traversal outcome into files in the exploded webapp.
//!
//! Assembly is split in two steps so the decisions can be inspected (and
//! tested) without touching the disk:
//!
//! 1. [`ClasspathAssembler::plan`] is pure. It sorts the selected libraries
//!    by artifactId, detects default file names that collide, renames every
//!    collision after the first to `{groupId}-{artifactId}-{version}.{ext}`
//!    and picks a [`Placement`] from the artifact type. A renamed file that
//!    would land on a name already in use becomes
//!    `{groupId}-{n}-{artifactId}-{version}.{ext}` with the first free `n`
//!    from 2.
//! 2. [`ClasspathAssembler::assemble`] executes a plan: libraries go to
//!    `WEB-INF/lib`, tag libraries to `WEB-INF/tld`, and `war` artifacts are
//!    unpacked (cached) and overlaid.
//!
//! Copies are incremental: a destination is only overwritten when its
//! source was modified strictly later.

pub mod overlay;

pub use overlay::{OverlayFilter, UnpackCache, apply_overlay};

use crate::archive::{ArchiveWriter, Manifest, ZipArchiveWriter};
use crate::artifact::ArtifactFacade;
use crate::constants::{LIB_DIR, TLD_DIR, attr};
use crate::core::HpkgError;
use crate::resolver::{BundleDecision, TraversalOutcome};
use crate::utils::fs::{copy_if_modified, ensure_dir, is_stale};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where an artifact of a given type ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// `WEB-INF/lib`
    Library,
    /// `WEB-INF/tld`
    TagLibrary,
    /// Unpacked and merged into the webapp root
    Overlay,
    /// Not placed anywhere
    Unsupported,
}

impl Placement {
    #[must_use]
    pub fn for_type(artifact_type: &str) -> Self {
        match artifact_type {
            "tld" => Self::TagLibrary,
            "jar" | "ejb" | "ejb-client" | "par" => Self::Library,
            "war" => Self::Overlay,
            _ => Self::Unsupported,
        }
    }
}

/// One artifact of a [`BundlePlan`].
#[derive(Debug, Clone)]
pub struct PlannedArtifact {
    pub artifact: ArtifactFacade,
    /// File name inside the target directory
    pub file_name: String,
    pub placement: Placement,
}

/// The full set of assembly decisions for one pass.
#[derive(Debug, Clone, Default)]
pub struct BundlePlan {
    /// Artifacts to place, sorted by artifactId then groupId.
    pub entries: Vec<PlannedArtifact>,
    /// Ids of every artifact involved in a file-name collision, first
    /// occurrence included.
    pub duplicates: BTreeSet<String>,
    /// Decision per coordinate id, for bundled and excluded artifacts alike.
    pub decisions: BTreeMap<String, BundleDecision>,
}

impl BundlePlan {
    /// Entries bound for `WEB-INF/lib`, in plan order.
    pub fn libraries(&self) -> impl Iterator<Item = &PlannedArtifact> {
        self.entries.iter().filter(|e| e.placement == Placement::Library)
    }

    #[must_use]
    pub fn decision(&self, id: &str) -> Option<&BundleDecision> {
        self.decisions.get(id)
    }
}

/// Target directories of an assembly.
#[derive(Debug, Clone)]
pub struct AssemblyLayout {
    /// Root of the exploded webapp
    pub webapp_dir: PathBuf,
    /// Where `war` overlays are unpacked
    pub unpack_dir: PathBuf,
}

/// What [`ClasspathAssembler::assemble`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Files written because they were missing or stale
    pub copied: usize,
    /// Files skipped because the destination was current
    pub up_to_date: usize,
    /// Files merged in from overlays
    pub overlaid: usize,
}

/// Plans and executes the bundling of libraries into a webapp.
#[derive(Debug, Clone)]
pub struct ClasspathAssembler {
    layout: AssemblyLayout,
    overlay_filter: OverlayFilter,
}

fn final_name(artifact: &ArtifactFacade) -> String {
    let name = artifact.default_final_name();
    if artifact.artifact_type() == "par" {
        match name.strip_suffix(".par") {
            Some(stem) => format!("{stem}.jar"),
            None => name,
        }
    } else {
        name
    }
}

/// `{group_id}-{name}`, or `{group_id}-{n}-{name}` for the first `n` from 2
/// when that is taken as well.
fn qualified_name(group_id: &str, name: &str, taken: &HashMap<String, String>) -> String {
    let mut candidate = format!("{group_id}-{name}");
    let mut n = 2;
    while taken.contains_key(&candidate) {
        candidate = format!("{group_id}-{n}-{name}");
        n += 1;
    }
    candidate
}

impl ClasspathAssembler {
    pub fn new(layout: AssemblyLayout) -> Self {
        Self {
            layout,
            overlay_filter: OverlayFilter::default(),
        }
    }

    #[must_use]
    pub fn with_overlay_filter(mut self, filter: OverlayFilter) -> Self {
        self.overlay_filter = filter;
        self
    }

    #[must_use]
    pub const fn layout(&self) -> &AssemblyLayout {
        &self.layout
    }

    /// Computes the bundle plan for a traversal outcome. Pure and
    /// deterministic: the same outcome always yields the same plan.
    #[must_use]
    pub fn plan(outcome: &TraversalOutcome) -> BundlePlan {
        let mut selected: Vec<&ArtifactFacade> = outcome.libraries.values().collect();
        selected.sort_by(|a, b| {
            a.artifact_id()
                .cmp(b.artifact_id())
                .then_with(|| a.group_id().cmp(b.group_id()))
                .then_with(|| a.version().cmp(b.version()))
        });

        let mut plan = BundlePlan::default();
        let mut first_owner: HashMap<String, String> = HashMap::new();

        for artifact in selected {
            let placement = Placement::for_type(artifact.artifact_type());
            let id = artifact.id();
            if placement == Placement::Unsupported {
                debug!(artifact = %id, "Skipping artifact of unsupported type");
                continue;
            }
            let mut file_name = final_name(artifact);
            let mut decision = BundleDecision::BundleAsLibrary;

            if placement != Placement::Overlay {
                if let Some(owner) = first_owner.get(&file_name) {
                    plan.duplicates.insert(owner.clone());
                    plan.duplicates.insert(id.clone());
                    file_name = qualified_name(artifact.group_id(), &file_name, &first_owner);
                    info!("Duplicate file name for {id}, bundling as {file_name}");
                    decision = BundleDecision::ExcludeDuplicate(file_name.clone());
                }
                first_owner.insert(file_name.clone(), id.clone());
            }

            plan.decisions.insert(id, decision);
            plan.entries.push(PlannedArtifact {
                artifact: artifact.clone(),
                file_name,
                placement,
            });
        }

        for (id, decision) in &outcome.exclusions {
            plan.decisions.entry(id.clone()).or_insert_with(|| decision.clone());
        }
        plan
    }

    /// Executes `plan` against the layout.
    ///
    /// # Errors
    ///
    /// The first failing copy or unpack, as [`HpkgError::AssemblyIo`] or
    /// [`HpkgError::ArchiveError`]. A planned artifact without a file is a
    /// [`HpkgError::Resolution`] error.
    pub fn assemble(&self, plan: &BundlePlan) -> Result<AssemblyReport, HpkgError> {
        let webapp = &self.layout.webapp_dir;
        let lib_dir = webapp.join(LIB_DIR);
        let tld_dir = webapp.join(TLD_DIR);
        let cache = UnpackCache::new(&self.layout.unpack_dir);
        let mut report = AssemblyReport::default();

        for entry in &plan.entries {
            let artifact = &entry.artifact;
            let source = artifact.file().ok_or_else(|| HpkgError::Resolution {
                artifact: artifact.id(),
                reason: "artifact has no resolved file".to_string(),
            })?;

            let written = match entry.placement {
                Placement::Library => {
                    ensure_dir(&lib_dir)?;
                    place(source, &lib_dir.join(&entry.file_name))?
                }
                Placement::TagLibrary => {
                    ensure_dir(&tld_dir)?;
                    place(source, &tld_dir.join(&entry.file_name))?
                }
                Placement::Overlay => {
                    let key = format!("{}-{}", artifact.artifact_id(), artifact.version());
                    let (unpacked, _) = cache.unpack(source, &key)?;
                    report.overlaid += apply_overlay(&unpacked, webapp, &self.overlay_filter)?;
                    continue;
                }
                Placement::Unsupported => continue,
            };
            if written {
                report.copied += 1;
            } else {
                report.up_to_date += 1;
            }
        }

        debug!(
            copied = report.copied,
            up_to_date = report.up_to_date,
            overlaid = report.overlaid,
            "Assembly complete"
        );
        Ok(report)
    }
}

/// Copies a file artifact, or packs a directory artifact (an in-progress
/// build output) into a jar.
fn place(source: &Path, destination: &Path) -> Result<bool, HpkgError> {
    if source.is_dir() {
        if !is_stale(source, destination) {
            return Ok(false);
        }
        warn!(
            "{} is a directory, packing it into {}",
            source.display(),
            destination.display()
        );
        let mut manifest = Manifest::new();
        manifest.insert(attr::MANIFEST_VERSION, "1.0");
        ZipArchiveWriter.write_archive(&manifest, source, destination)?;
        return Ok(true);
    }
    copy_if_modified(source, destination)
}
