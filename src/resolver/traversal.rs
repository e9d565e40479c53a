//! Plugin-aware traversal of a dependency tree.
//!
//! [`traverse`] is a pure function from a tree and a [`TraversalPolicy`] to
//! a [`TraversalOutcome`]. It walks depth-first, parent before children, and
//! for every non-root node decides whether to look further down:
//!
//! 1. an edge whose scope the policy does not admit is skipped together with
//!    its subtree
//! 2. an optional edge is skipped unless the policy includes optionals
//! 3. what happens next depends on the [`TraversalMode`]:
//!    - [`TraversalMode::BundleLibraries`] stops at plugins (a plugin brings
//!      its own libraries at load time) and at anything reached through the
//!      host core, and selects every other artifact as a library
//!    - [`TraversalMode::CollectPlugins`] descends only through plugins and
//!      selects them
//!
//! The root is always visited, whatever it is. A duplicate node (see
//! [`DependencyNode::duplicate_of`]) is judged on its own and, when the walk
//! goes below it, continues into the children of the node it repeats. The
//! trail and the host-core verdict come from the path actually walked, and a
//! subtree already walked in the same host-core situation is not walked
//! again. Selections use a
//! newest-wins merge: an entry is only replaced by a strictly newer version.
//! Libraries are keyed by `groupId:artifactId`; plugins by artifactId only,
//! matching how the host names installed plugins.
//!
//! # Example
//!
//! ```rust,no_run
//! use hpkg_cli::artifact::ArchiveClassifier;
//! use hpkg_cli::resolver::host_core::TrailSubstringMatcher;
//! use hpkg_cli::resolver::traversal::{TraversalPolicy, traverse};
//! # fn example(tree: &hpkg_cli::resolver::DependencyTree) -> Result<(), hpkg_cli::core::HpkgError> {
//! let outcome = traverse(
//!     tree,
//!     &TraversalPolicy::bundle_libraries(),
//!     &ArchiveClassifier::strict(),
//!     &TrailSubstringMatcher::default(),
//! )?;
//! for library in outcome.libraries.values() {
//!     println!("bundling {}", library.id());
//! }
//! # Ok(())
//! # }
//! ```

use super::host_core::HostCoreMatcher;
use super::tree::{DependencyNode, DependencyTree, NodeId};
use crate::artifact::{ArtifactFacade, PluginClassifier, Scope};
use crate::core::HpkgError;
use std::borrow::Cow;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::debug;

/// What one assembly pass decided for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleDecision {
    /// Copied into the private library directory under its default name.
    BundleAsLibrary,
    /// A plugin dependency; loaded by the host, never bundled.
    ExcludeAsPlugin,
    /// Reached through the host core, which already provides it.
    ExcludeCoveredByHost,
    /// Bundled, but renamed because its default name collided.
    ExcludeDuplicate(String),
}

impl fmt::Display for BundleDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BundleAsLibrary => f.write_str("bundled"),
            Self::ExcludeAsPlugin => f.write_str("plugin dependency"),
            Self::ExcludeCoveredByHost => f.write_str("provided by host core"),
            Self::ExcludeDuplicate(renamed) => write!(f, "bundled as {renamed}"),
        }
    }
}

/// Which artifacts a traversal is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    /// Libraries to bundle; stop at plugins.
    BundleLibraries,
    /// Plugins to ship alongside; descend through plugins only.
    CollectPlugins,
}

/// Scope and optionality filter plus the traversal mode of one goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalPolicy {
    pub mode: TraversalMode,
    pub scopes: Vec<Scope>,
    pub include_optional: bool,
}

impl TraversalPolicy {
    /// Runtime classpath (`compile` + `runtime`), no optionals.
    #[must_use]
    pub fn bundle_libraries() -> Self {
        Self {
            mode: TraversalMode::BundleLibraries,
            scopes: vec![Scope::Compile, Scope::Runtime],
            include_optional: false,
        }
    }

    #[must_use]
    pub fn collect_plugins(scopes: Vec<Scope>, include_optional: bool) -> Self {
        Self {
            mode: TraversalMode::CollectPlugins,
            scopes,
            include_optional,
        }
    }

    fn admits(&self, artifact: &ArtifactFacade) -> bool {
        let scope_ok = artifact.scope().is_some_and(|s| self.scopes.contains(&s));
        scope_ok && (self.include_optional || !artifact.is_optional())
    }
}

/// Newest-wins map from a selection key to one artifact.
///
/// Iteration is ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionMap {
    entries: BTreeMap<String, ArtifactFacade>,
}

impl SelectionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `artifact` unless an entry at least as new is present.
    /// Returns true if the map changed.
    pub fn offer(&mut self, key: String, artifact: &ArtifactFacade) -> bool {
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(artifact.clone());
                true
            }
            Entry::Occupied(mut slot) => {
                if artifact.is_newer_than(slot.get()) {
                    debug!(
                        "{} replaces {} (newer version)",
                        artifact.id(),
                        slot.get().id()
                    );
                    slot.insert(artifact.clone());
                    true
                } else {
                    false
                }
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ArtifactFacade> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArtifactFacade)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &ArtifactFacade> {
        self.entries.values()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

/// Key for library selection.
#[must_use]
pub fn library_key(artifact: &ArtifactFacade) -> String {
    format!("{}:{}", artifact.group_id(), artifact.artifact_id())
}

/// Key for plugin selection.
#[must_use]
pub fn plugin_key(artifact: &ArtifactFacade) -> String {
    artifact.artifact_id().to_string()
}

/// Everything a traversal found.
#[derive(Debug, Clone, Default)]
pub struct TraversalOutcome {
    /// Libraries to bundle (empty in [`TraversalMode::CollectPlugins`]).
    pub libraries: SelectionMap,
    /// Plugins met on the way.
    pub plugins: SelectionMap,
    /// Exclusion decisions by coordinate id, first decision wins.
    pub exclusions: BTreeMap<String, BundleDecision>,
    /// Number of subtrees descended into, root included.
    pub visited: usize,
}

struct Walk<'a> {
    tree: &'a DependencyTree,
    policy: &'a TraversalPolicy,
    classifier: &'a dyn PluginClassifier,
    host: &'a dyn HostCoreMatcher,
    outcome: TraversalOutcome,
    /// Coordinate ids from the root to the node being visited.
    trail: Vec<String>,
    /// Expanded nodes already walked below, with their host-core verdict.
    walked: HashSet<(NodeId, bool)>,
}

/// Walks `tree` under `policy`.
///
/// # Errors
///
/// Whatever the classifier reports; with a strict classifier an unreadable
/// jar aborts the traversal.
pub fn traverse(
    tree: &DependencyTree,
    policy: &TraversalPolicy,
    classifier: &dyn PluginClassifier,
    host: &dyn HostCoreMatcher,
) -> Result<TraversalOutcome, HpkgError> {
    let root = tree.root();
    let mut trail = root.artifact().trail().to_vec();
    if trail.is_empty() {
        trail.push(root.artifact().id());
    }
    let covered = host.covers(&trail);

    let mut walk = Walk {
        tree,
        policy,
        classifier,
        host,
        outcome: TraversalOutcome::default(),
        trail,
        walked: HashSet::new(),
    };
    walk.outcome.visited += 1;
    for child in root.children() {
        walk.visit(*child, covered)?;
    }
    debug!(
        visited = walk.outcome.visited,
        libraries = walk.outcome.libraries.len(),
        plugins = walk.outcome.plugins.len(),
        "Traversal complete"
    );
    Ok(walk.outcome)
}

impl Walk<'_> {
    fn visit(&mut self, id: NodeId, covered_above: bool) -> Result<(), HpkgError> {
        let tree = self.tree;
        let Some(node) = tree.node(id) else {
            return Ok(());
        };
        let entry = node.artifact().id();
        let covered = covered_above || self.host.matches(&entry);
        self.trail.push(entry);
        let result = self.descend(id, node, covered);
        self.trail.pop();
        result
    }

    fn descend(
        &mut self,
        id: NodeId,
        node: &DependencyNode,
        covered: bool,
    ) -> Result<(), HpkgError> {
        // Duplicates and everything below them carry the trail of the
        // first occurrence.
        let artifact = if node.artifact().trail() == self.trail.as_slice() {
            Cow::Borrowed(node.artifact())
        } else {
            Cow::Owned(node.artifact().clone().with_trail(self.trail.clone()))
        };
        if !self.should_descend(&artifact, covered)? {
            return Ok(());
        }

        let expanded = node.duplicate_of().unwrap_or(id);
        if !self.walked.insert((expanded, covered)) {
            return Ok(());
        }
        self.outcome.visited += 1;
        let tree = self.tree;
        if let Some(expanded) = tree.node(expanded) {
            for child in expanded.children() {
                self.visit(*child, covered)?;
            }
        }
        Ok(())
    }

    fn exclude(&mut self, artifact: &ArtifactFacade, decision: BundleDecision) {
        self.outcome.exclusions.entry(artifact.id()).or_insert(decision);
    }

    fn should_descend(&mut self, artifact: &ArtifactFacade, covered: bool) -> Result<bool, HpkgError> {
        if !self.policy.admits(artifact) {
            debug!(artifact = %artifact.id(), "Skipped by scope or optional filter");
            return Ok(false);
        }

        match self.policy.mode {
            TraversalMode::BundleLibraries => {
                if covered {
                    self.exclude(artifact, BundleDecision::ExcludeCoveredByHost);
                    return Ok(false);
                }
                if self.classifier.is_plugin(artifact)? {
                    self.outcome.plugins.offer(plugin_key(artifact), artifact);
                    self.exclude(artifact, BundleDecision::ExcludeAsPlugin);
                    return Ok(false);
                }
                self.outcome.libraries.offer(library_key(artifact), artifact);
                Ok(true)
            }
            TraversalMode::CollectPlugins => {
                if !self.classifier.is_plugin(artifact)? {
                    return Ok(false);
                }
                self.outcome.plugins.offer(plugin_key(artifact), artifact);
                Ok(true)
            }
        }
    }
}
