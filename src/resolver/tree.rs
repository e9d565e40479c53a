//! The resolved dependency tree.
//!
//! Nodes live in an arena owned by [`DependencyTree`]; a node refers to its
//! parent and children by [`NodeId`]. The parent link is a plain index, so
//! there is no ownership cycle, and children keep the order the resolver
//! produced them in.
//!
//! A coordinate reached again in the same scope and under the same
//! exclusions is stored once. Later occurrences become leaf nodes that point
//! at the first one through [`DependencyNode::duplicate_of`], so a diamond
//! shaped graph stays linear in size. Walkers that need the full picture
//! follow that link.

use super::descriptor::Exclusion;
use crate::artifact::{ArtifactFacade, ArtifactSet};

/// Index of a node inside its [`DependencyTree`].
pub type NodeId = usize;

/// One dependency edge: the artifact it brings in plus the exclusions it
/// declares for its own subtree.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    artifact: ArtifactFacade,
    exclusions: Vec<Exclusion>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
    duplicate_of: Option<NodeId>,
}

impl DependencyNode {
    #[must_use]
    pub const fn artifact(&self) -> &ArtifactFacade {
        &self.artifact
    }

    #[must_use]
    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// 0 for the root, 1 for direct dependencies.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The node whose children this one repeats, if it was not expanded
    /// itself.
    #[must_use]
    pub const fn duplicate_of(&self) -> Option<NodeId> {
        self.duplicate_of
    }
}

/// Arena-backed tree rooted at the project being packaged.
#[derive(Debug, Clone)]
pub struct DependencyTree {
    nodes: Vec<DependencyNode>,
}

impl DependencyTree {
    /// The id of the root node.
    pub const ROOT: NodeId = 0;

    /// Creates a tree holding only the root artifact.
    #[must_use]
    pub fn new(root: ArtifactFacade) -> Self {
        Self {
            nodes: vec![DependencyNode {
                artifact: root,
                exclusions: Vec::new(),
                parent: None,
                children: Vec::new(),
                depth: 0,
                duplicate_of: None,
            }],
        }
    }

    /// Appends a child below `parent` and returns its id.
    ///
    /// # Panics
    ///
    /// If `parent` is not a node of this tree.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        artifact: ArtifactFacade,
        exclusions: Vec<Exclusion>,
    ) -> NodeId {
        self.push(parent, artifact, exclusions, None)
    }

    /// Appends a leaf below `parent` whose subtree is the one already
    /// collected under `original`.
    ///
    /// # Panics
    ///
    /// If `parent` is not a node of this tree.
    pub fn add_duplicate(
        &mut self,
        parent: NodeId,
        artifact: ArtifactFacade,
        exclusions: Vec<Exclusion>,
        original: NodeId,
    ) -> NodeId {
        self.push(parent, artifact, exclusions, Some(original))
    }

    fn push(
        &mut self,
        parent: NodeId,
        artifact: ArtifactFacade,
        exclusions: Vec<Exclusion>,
        duplicate_of: Option<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(DependencyNode {
            artifact,
            exclusions,
            parent: Some(parent),
            children: Vec::new(),
            depth,
            duplicate_of,
        });
        self.nodes[parent].children.push(id);
        id
    }

    #[must_use]
    pub fn root(&self) -> &DependencyNode {
        &self.nodes[Self::ROOT]
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&DependencyNode> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true: a tree always has its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in depth-first pre-order (parent before children).
    #[must_use]
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        order
    }

    /// Artifacts of the root's direct dependencies, in declaration order.
    #[must_use]
    pub fn direct_dependencies(&self) -> ArtifactSet {
        self.root().children.iter().map(|id| self.nodes[*id].artifact.clone()).collect()
    }

    /// Every non-root node's artifact, depth-first. Each reachable coordinate
    /// appears at least once; it appears again for every duplicate node.
    #[must_use]
    pub fn all_dependencies(&self) -> ArtifactSet {
        self.depth_first()
            .into_iter()
            .skip(1)
            .map(|id| self.nodes[id].artifact.clone())
            .collect()
    }

    /// Renders the tree with box-drawing connectors; `annotate` may append
    /// text to each non-root line. Duplicate nodes end with `(*)`.
    pub fn render<F>(&self, mut annotate: F) -> String
    where
        F: FnMut(NodeId, &DependencyNode) -> Option<String>,
    {
        let mut out = format!("{}\n", self.root().artifact.id());
        let children = self.root().children.clone();
        for (i, child) in children.iter().enumerate() {
            self.render_node(*child, "", i + 1 == children.len(), &mut out, &mut annotate);
        }
        out
    }

    fn render_node<F>(&self, id: NodeId, prefix: &str, is_last: bool, out: &mut String, annotate: &mut F)
    where
        F: FnMut(NodeId, &DependencyNode) -> Option<String>,
    {
        let node = &self.nodes[id];
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        let artifact = &node.artifact;
        let mut line = format!("{prefix}{connector}{}", artifact.id());
        if let Some(scope) = artifact.scope() {
            line.push_str(&format!(" ({scope}"));
            if artifact.is_optional() {
                line.push_str(", optional");
            }
            line.push(')');
        }
        if let Some(note) = annotate(id, node) {
            line.push_str(&format!(" {note}"));
        }
        if node.duplicate_of.is_some() {
            line.push_str(" (*)");
        }
        out.push_str(&line);
        out.push('\n');

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        for (i, child) in node.children.iter().enumerate() {
            self.render_node(*child, &child_prefix, i + 1 == node.children.len(), out, annotate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactCoordinate;

    fn facade(id: &str) -> ArtifactFacade {
        ArtifactFacade::new(ArtifactCoordinate::new("g", id, "1"))
    }

    fn sample() -> DependencyTree {
        let mut tree = DependencyTree::new(facade("root"));
        let a = tree.add_child(DependencyTree::ROOT, facade("a"), Vec::new());
        tree.add_child(a, facade("a1"), Vec::new());
        tree.add_child(a, facade("a2"), Vec::new());
        tree.add_child(DependencyTree::ROOT, facade("b"), Vec::new());
        tree
    }

    #[test]
    fn test_structure() {
        let tree = sample();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.root().children().len(), 2);
        let a1 = tree.node(2).unwrap();
        assert_eq!(a1.parent(), Some(1));
        assert_eq!(a1.depth(), 2);
        assert!(tree.node(99).is_none());
    }

    #[test]
    fn test_depth_first_order() {
        let tree = sample();
        let ids: Vec<_> = tree
            .depth_first()
            .into_iter()
            .map(|id| tree.node(id).unwrap().artifact().artifact_id().to_string())
            .collect();
        assert_eq!(ids, vec!["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_dependency_sets() {
        let tree = sample();
        assert_eq!(tree.direct_dependencies().len(), 2);
        assert_eq!(tree.all_dependencies().len(), 4);
    }

    #[test]
    fn test_render() {
        let tree = sample();
        let rendered = tree.render(|_, node| {
            (node.artifact().artifact_id() == "b").then(|| "[marked]".to_string())
        });
        assert!(rendered.starts_with("g:root:jar:1\n"));
        assert!(rendered.contains("├── g:a:jar:1 (compile)"));
        assert!(rendered.contains("│   └── g:a2:jar:1 (compile)"));
        assert!(rendered.contains("└── g:b:jar:1 (compile) [marked]"));
    }

    #[test]
    fn test_duplicate_is_a_leaf() {
        let mut tree = sample();
        let b = 4;
        let again = tree.add_duplicate(b, facade("a"), Vec::new(), 1);

        let node = tree.node(again).unwrap();
        assert_eq!(node.duplicate_of(), Some(1));
        assert!(node.children().is_empty());
        assert_eq!(node.depth(), 2);
        assert_eq!(tree.node(1).unwrap().duplicate_of(), None);

        assert_eq!(tree.all_dependencies().len(), 5);
        let rendered = tree.render(|_, _| None);
        assert!(rendered.contains("    └── g:a:jar:1 (compile) (*)"));
    }
}
