//! Packaging goals.
//!
//! Each goal runs one pass of the engine over a freshly collected
//! dependency tree, with the traversal policy and classification mode that
//! goal needs:
//!
//! | Goal | Traversal | Classification |
//! |------|-----------|----------------|
//! | [`package`](package::package) | bundle libraries | strict |
//! | [`write_hpl`](development::write_hpl) | bundle libraries | strict |
//! | [`assemble_dependencies`](plugins::assemble_dependencies) | collect plugins | strict |
//! | [`list_plugin_dependencies`](plugins::list_plugin_dependencies) | direct only | best effort |
//! | [`validate`](plugins::validate) | all dependencies | best effort |
//! | [`record_core_location`](development::record_core_location) | none | none |
//!
//! All goals are synchronous; the CLI runs them on a blocking thread.

pub mod development;
pub mod dynamic_loading;
pub mod header;
pub mod package;
pub mod plugins;
pub mod scm;
pub mod version_policy;

pub use development::{record_core_location, write_hpl};
pub use header::{HeaderContext, build_header};
pub use package::{PackageReport, package};
pub use plugins::{
    AssembleOptions, AssembleReport, ValidationReport, assemble_dependencies,
    list_plugin_dependencies, validate,
};
pub use scm::GitProbe;
pub use version_policy::{BuildStamp, VersionPolicy};

use crate::archive::Manifest;
use crate::artifact::{ArchiveClassifier, PluginClassifier};
use crate::assembler::{BundlePlan, ClasspathAssembler};
use crate::core::HpkgError;
use crate::project::Project;
use crate::resolver::{
    CollectResult, DependencyGraphCollector, DependencyTree, LocalRepository, TraversalOutcome,
    TraversalPolicy, traverse,
};

/// A loaded project plus the repository its dependencies resolve from.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub project: Project,
    pub repository: LocalRepository,
}

impl BuildContext {
    pub fn new(project: Project, repository: LocalRepository) -> Self {
        Self {
            project,
            repository,
        }
    }

    /// Collects the project's dependency tree.
    ///
    /// # Errors
    ///
    /// [`HpkgError::Resolution`] or [`HpkgError::CircularDependency`].
    pub fn collect(&self) -> Result<CollectResult, HpkgError> {
        DependencyGraphCollector::new(&self.repository).collect(&self.project.collect_request())
    }

    /// Runs the library-bundling traversal over `tree`.
    ///
    /// # Errors
    ///
    /// Classification failures of `classifier`.
    pub fn bundled_libraries(
        &self,
        tree: &DependencyTree,
        classifier: &dyn PluginClassifier,
    ) -> Result<TraversalOutcome, HpkgError> {
        traverse(
            tree,
            &TraversalPolicy::bundle_libraries(),
            classifier,
            &self.project.host_core_matcher(),
        )
    }

    /// Header plus bundle plan, shared by `package` and `hpl` so both see
    /// the same library set.
    ///
    /// # Errors
    ///
    /// Any collection, classification or header failure.
    pub fn plan(&self) -> Result<(Manifest, BundlePlan, DependencyTree), HpkgError> {
        let CollectResult {
            tree, ..
        } = self.collect()?;
        let classifier = ArchiveClassifier::strict();
        let outcome = self.bundled_libraries(&tree, &classifier)?;
        let plan = ClasspathAssembler::plan(&outcome);

        let direct = tree.direct_dependencies();
        let git = GitProbe::new(
            self.project.base_dir(),
            self.project.project.scm.as_ref().and_then(|s| s.connection.as_deref()),
        );
        let stamp = BuildStamp::now(git.head_revision());
        let manifest = build_header(&HeaderContext {
            project: &self.project,
            direct: &direct,
            classifier: &classifier,
            git: &git,
            stamp: &stamp,
        })?;
        Ok((manifest, plan, tree))
    }
}
