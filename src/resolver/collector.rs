//! Builds the full dependency tree of a project.
//!
//! The collector starts from the project's declared dependencies and asks a
//! [`ResolutionService`] for the descriptor and file of every artifact it
//! reaches. Repository conventions applied along the way:
//!
//! - dependency management overrides transitive versions and scopes, and
//!   fills in versions that direct dependencies leave out
//! - transitive dependencies declared `test` or `provided`, and optional
//!   dependencies of dependencies, are not collected
//! - transitive scopes are derived with [`Scope::derive`]
//! - exclusions prune the subtree below the edge that declares them
//!
//! Each coordinate is expanded once per scope and exclusion set. When it is
//! reached again in the same situation its subtree would be identical, so the
//! new node is recorded as a duplicate of the first one instead (see
//! [`DependencyTree::add_duplicate`]). Diamond-shaped graphs, where many
//! plugins share the same base plugins, therefore stay linear in size.
//!
//! No version mediation happens here: the same artifactId can appear at
//! several versions in different subtrees. Picking a winner is the job of
//! the traversal policy.

use super::dependency_graph::DependencyGraph;
use super::descriptor::{DeclaredDependency, Exclusion};
use super::repository::ResolutionService;
use super::tree::{DependencyTree, NodeId};
use crate::artifact::{ArtifactCoordinate, ArtifactFacade, Scope};
use crate::core::HpkgError;
use std::collections::HashMap;
use tracing::{debug, trace};

/// The root of a collection and what it declares.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    /// The project itself.
    pub root: ArtifactFacade,
    /// Direct dependencies, in declaration order.
    pub dependencies: Vec<DeclaredDependency>,
    /// Dependency management entries.
    pub managed: Vec<DeclaredDependency>,
}

/// Result of a collection: the tree plus the coordinate graph behind it.
#[derive(Debug)]
pub struct CollectResult {
    pub tree: DependencyTree,
    pub graph: DependencyGraph,
}

/// Collects a [`DependencyTree`] through a [`ResolutionService`].
pub struct DependencyGraphCollector<'a, R: ResolutionService + ?Sized> {
    service: &'a R,
    descriptors: HashMap<String, super::descriptor::ArtifactDescriptor>,
}

struct Expansion<'r> {
    request: &'r CollectRequest,
    managed: HashMap<String, &'r DeclaredDependency>,
    tree: DependencyTree,
    graph: DependencyGraph,
    /// First expanded node per [`expansion_key`].
    expanded: HashMap<String, NodeId>,
}

impl<'a, R: ResolutionService + ?Sized> DependencyGraphCollector<'a, R> {
    pub fn new(service: &'a R) -> Self {
        Self {
            service,
            descriptors: HashMap::new(),
        }
    }

    /// Collects the tree below `request.root`.
    ///
    /// # Errors
    ///
    /// [`HpkgError::Resolution`] when an artifact cannot be described or
    /// resolved or has no version, [`HpkgError::CircularDependency`] when
    /// the collected dependencies form a cycle, including one that only
    /// closes through a duplicate node.
    pub fn collect(&mut self, request: &CollectRequest) -> Result<CollectResult, HpkgError> {
        let mut root = request.root.clone();
        if root.trail().is_empty() {
            let trail = vec![root.id()];
            root = root.with_trail(trail);
        }
        let root_id = root.id();

        let mut expansion = Expansion {
            request,
            managed: request.managed.iter().map(|m| (m.management_key(), m)).collect(),
            tree: DependencyTree::new(root),
            graph: DependencyGraph::new(),
            expanded: HashMap::new(),
        };
        expansion.graph.add_node(&root_id);

        let mut path = vec![root_id];
        self.expand(&mut expansion, DependencyTree::ROOT, &[], &mut path)?;
        // A cycle that runs through a duplicate never shows up on the
        // expansion path.
        expansion.graph.detect_cycles()?;

        debug!(
            nodes = expansion.tree.len(),
            artifacts = expansion.graph.node_count(),
            "Collected dependency tree"
        );
        Ok(CollectResult {
            tree: expansion.tree,
            graph: expansion.graph,
        })
    }

    fn declared_dependencies(
        &mut self,
        expansion: &Expansion<'_>,
        node: NodeId,
    ) -> Result<Vec<DeclaredDependency>, HpkgError> {
        if node == DependencyTree::ROOT {
            return Ok(expansion.request.dependencies.clone());
        }
        let Some(current) = expansion.tree.node(node) else {
            return Ok(Vec::new());
        };
        Ok(self.descriptor(current.artifact().coordinate())?.dependencies)
    }

    fn descriptor(
        &mut self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<super::descriptor::ArtifactDescriptor, HpkgError> {
        let id = coordinate.id();
        if let Some(descriptor) = self.descriptors.get(&id) {
            return Ok(descriptor.clone());
        }
        let descriptor = self.service.describe(coordinate)?;
        self.descriptors.insert(id, descriptor.clone());
        Ok(descriptor)
    }

    fn expand(
        &mut self,
        expansion: &mut Expansion<'_>,
        node: NodeId,
        inherited_exclusions: &[Exclusion],
        path: &mut Vec<String>,
    ) -> Result<(), HpkgError> {
        let is_root = node == DependencyTree::ROOT;
        let (parent_scope, parent_trail) = match expansion.tree.node(node) {
            Some(n) => (n.artifact().scope(), n.artifact().trail().to_vec()),
            None => return Ok(()),
        };

        for declared in self.declared_dependencies(expansion, node)? {
            if !is_root
                && (declared.optional
                    || matches!(declared.scope, Some(Scope::Test | Scope::Provided)))
            {
                continue;
            }

            let (coordinate, premanaged) = build_coordinate(expansion, &declared, is_root, parent_scope)?;
            if inherited_exclusions.iter().any(|e| e.matches(&coordinate)) {
                debug!(artifact = %coordinate, "Excluded");
                continue;
            }

            let id = coordinate.id();
            if let Some(parent_id) = path.last() {
                expansion.graph.add_dependency(parent_id, &id);
            }
            if path.contains(&id) {
                let mut chain = path.clone();
                chain.push(id);
                return Err(HpkgError::CircularDependency {
                    chain: chain.join(" -> "),
                });
            }

            let file = self.service.resolve_file(&coordinate)?;
            let packaging = self.descriptor(&coordinate)?.packaging;
            let mut trail = parent_trail.clone();
            trail.push(id.clone());

            let artifact = ArtifactFacade::new(coordinate)
                .with_file(file)
                .with_trail(trail)
                .with_packaging(packaging)
                .with_premanaged_version(premanaged);

            let mut exclusions = inherited_exclusions.to_vec();
            exclusions.extend(declared.exclusions.iter().cloned());
            let key = expansion_key(&id, artifact.scope(), &exclusions);
            if let Some(&original) = expansion.expanded.get(&key) {
                trace!(artifact = %id, original, "Already collected");
                expansion.tree.add_duplicate(node, artifact, declared.exclusions.clone(), original);
                continue;
            }

            let child = expansion.tree.add_child(node, artifact, declared.exclusions.clone());
            expansion.expanded.insert(key, child);

            path.push(id);
            self.expand(expansion, child, &exclusions, path)?;
            path.pop();
        }
        Ok(())
    }
}

/// Everything that shapes the subtree below a node: the coordinate, the
/// scope its children derive theirs from, and the exclusions in force.
fn expansion_key(id: &str, scope: Option<Scope>, exclusions: &[Exclusion]) -> String {
    let mut excluded: Vec<String> = exclusions.iter().map(ToString::to_string).collect();
    excluded.sort_unstable();
    excluded.dedup();
    let scope = scope.map(|s| s.to_string()).unwrap_or_default();
    format!("{id}|{scope}|{}", excluded.join(","))
}

fn build_coordinate(
    expansion: &Expansion<'_>,
    declared: &DeclaredDependency,
    is_root: bool,
    parent_scope: Option<Scope>,
) -> Result<(ArtifactCoordinate, Option<String>), HpkgError> {
    let managed = expansion.managed.get(&declared.management_key()).copied();
    let mut version = declared.version.clone();
    let mut scope = declared.scope;
    let mut premanaged = None;

    if let Some(managed) = managed {
        if is_root {
            version = version.or_else(|| managed.version.clone());
            scope = scope.or(managed.scope);
        } else {
            if let Some(managed_version) = &managed.version
                && version.as_ref() != Some(managed_version)
            {
                premanaged = version.replace(managed_version.clone());
            }
            if managed.scope.is_some() {
                scope = managed.scope;
            }
        }
    }

    let Some(version) = version else {
        return Err(HpkgError::Resolution {
            artifact: declared.ga(),
            reason: "no version declared or managed".to_string(),
        });
    };
    let declared_scope = scope.unwrap_or(Scope::Compile);
    let effective = if is_root {
        declared_scope
    } else {
        Scope::derive(parent_scope, declared_scope)
    };

    let mut coordinate =
        ArtifactCoordinate::new(&declared.group_id, &declared.artifact_id, version)
            .with_type(&declared.artifact_type)
            .with_scope(Some(effective))
            .with_optional(declared.optional);
    if let Some(classifier) = &declared.classifier {
        coordinate = coordinate.with_classifier(classifier);
    }
    Ok((coordinate, premanaged))
}
