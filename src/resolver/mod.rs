//! Dependency resolution and plugin-aware traversal.
//!
//! Resolution runs in two stages that never share mutable state:
//!
//! 1. **Collection** ([`collector`]): starting from the project's declared
//!    dependencies, a [`DependencyGraphCollector`] asks a
//!    [`ResolutionService`] for each artifact's descriptor and file and
//!    builds a [`DependencyTree`]. Dependency management, scope derivation,
//!    exclusions and cycle detection happen here.
//! 2. **Traversal** ([`traversal`]): a pure function walks the tree under a
//!    [`TraversalPolicy`] and returns the selected libraries and plugins
//!    together with an exclusion decision for every artifact it stopped at.
//!
//! Neither stage knows about the output layout; turning a
//! [`TraversalOutcome`] into files is the job of [`crate::assembler`].
//!
//! # Example
//!
//! ```rust,no_run
//! use hpkg_cli::artifact::{ArchiveClassifier, ArtifactCoordinate, ArtifactFacade};
//! use hpkg_cli::resolver::{
//!     CollectRequest, DependencyGraphCollector, LocalRepository, TraversalPolicy,
//!     TrailSubstringMatcher, traverse,
//! };
//!
//! # fn example() -> Result<(), hpkg_cli::core::HpkgError> {
//! let repository = LocalRepository::new("/home/dev/.m2/repository");
//! let request = CollectRequest {
//!     root: ArtifactFacade::new(ArtifactCoordinate::new("org.example", "demo", "1.0")),
//!     dependencies: Vec::new(),
//!     managed: Vec::new(),
//! };
//! let collected = DependencyGraphCollector::new(&repository).collect(&request)?;
//! let outcome = traverse(
//!     &collected.tree,
//!     &TraversalPolicy::bundle_libraries(),
//!     &ArchiveClassifier::strict(),
//!     &TrailSubstringMatcher::default(),
//! )?;
//! println!("{} libraries", outcome.libraries.len());
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod dependency_graph;
pub mod descriptor;
pub mod host_core;
pub mod repository;
pub mod traversal;
pub mod tree;

pub use collector::{CollectRequest, CollectResult, DependencyGraphCollector};
pub use dependency_graph::DependencyGraph;
pub use descriptor::{ArtifactDescriptor, DeclaredDependency, Exclusion};
pub use host_core::{HostCoreMatcher, NoHostCore, TrailSubstringMatcher};
pub use repository::{LocalRepository, ResolutionService};
pub use traversal::{
    BundleDecision, SelectionMap, TraversalMode, TraversalOutcome, TraversalPolicy, library_key,
    plugin_key, traverse,
};
pub use tree::{DependencyNode, DependencyTree, NodeId};
