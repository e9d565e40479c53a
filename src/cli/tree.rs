//! Display the collected dependency tree.
//!
//! Each node is annotated with what `package` would do with it:
//!
//! ```text
//! org.example:hello:hpi:1.0
//! ├── org.jenkins-ci.main:jenkins-core:jar:2.401 (provided)
//! ├── org.example:util:jar:1.0 (compile) [bundled]
//! │   └── org.example:helper:jar:2.0 (compile) [bundled]
//! └── org.example:credentials:jar:2.3 (compile) [plugin dependency]
//!     └── org.example:plugin-lib:jar:3.0 (compile)
//! ```
//!
//! Nodes without a decision were never reached by the bundling traversal
//! (below a plugin, or outside the bundled scopes). A node marked `(*)` was
//! already listed with its dependencies further up.
//!
//! `--format json` prints the same tree as nested objects; repeated nodes
//! carry `"duplicate": true` and no children.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

use super::common::{CommandContext, GlobalOptions, run_blocking};
use crate::artifact::{ArchiveClassifier, Scope};
use crate::assembler::ClasspathAssembler;
use crate::core::HpkgError;
use crate::packaging::BuildContext;
use crate::resolver::{BundleDecision, DependencyTree, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TreeFormat {
    Tree,
    Json,
}

/// Show the dependency tree.
#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "tree")]
    format: TreeFormat,
}

/// One node of `--format json`.
#[derive(Debug, Serialize)]
struct TreeEntry {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<Scope>,
    optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    duplicate: bool,
    children: Vec<TreeEntry>,
}

impl TreeCommand {
    pub async fn execute(self, options: &GlobalOptions) -> Result<()> {
        let context = CommandContext::load(options).await?;
        let build = context.build;
        let (tree, decisions) = run_blocking(move || decide(&build)).await?;

        match self.format {
            TreeFormat::Tree => {
                let rendered = tree.render(|_, node| {
                    decisions.get(&node.artifact().id()).map(|d| format!("[{d}]"))
                });
                let mut lines = rendered.lines();
                if let Some(root) = lines.next() {
                    println!("{}", root.cyan().bold());
                }
                for line in lines {
                    println!("{line}");
                }
            }
            TreeFormat::Json => {
                let json = entry(&tree, DependencyTree::ROOT, &decisions);
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Ok(())
    }
}

/// Collects the tree and runs the bundling traversal over it. Unreadable
/// archives are reported as libraries instead of failing the display.
fn decide(
    build: &BuildContext,
) -> Result<(DependencyTree, BTreeMap<String, BundleDecision>), HpkgError> {
    let collected = build.collect()?;
    let outcome = build.bundled_libraries(&collected.tree, &ArchiveClassifier::best_effort())?;
    let plan = ClasspathAssembler::plan(&outcome);
    Ok((collected.tree, plan.decisions))
}

fn entry(
    tree: &DependencyTree,
    id: NodeId,
    decisions: &BTreeMap<String, BundleDecision>,
) -> TreeEntry {
    let Some(node) = tree.node(id) else {
        return TreeEntry {
            id: String::new(),
            scope: None,
            optional: false,
            decision: None,
            duplicate: false,
            children: Vec::new(),
        };
    };
    let artifact = node.artifact();
    TreeEntry {
        id: artifact.id(),
        scope: artifact.scope(),
        optional: artifact.is_optional(),
        decision: (id != DependencyTree::ROOT)
            .then(|| decisions.get(&artifact.id()).map(ToString::to_string))
            .flatten(),
        duplicate: node.duplicate_of().is_some(),
        children: node.children().iter().map(|child| entry(tree, *child, decisions)).collect(),
    }
}
