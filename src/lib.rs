//! hpkg - plugin packaging engine
//!
//! Builds self-contained plugin archives for a host application that loads
//! plugins in isolated class loaders. Given a plugin project and its
//! resolved dependency graph, hpkg decides which libraries to bundle in the
//! archive's private library directory and which dependencies are other
//! plugins the host loads on its own, then writes the archive together with
//! its manifest header.
//!
//! # Architecture Overview
//!
//! A goal runs as a short pipeline over plain data:
//!
//! ```text
//! hpkg.toml ──► project ──► resolver::collector ──► DependencyTree
//!                                                      │
//!                       resolver::traversal (policy) ◄─┘
//!                                  │
//!                       TraversalOutcome (libraries, plugins, decisions)
//!                                  │
//!            assembler (plan, copy, overlays) ──► packaging (header, archive)
//! ```
//!
//! The traversal is a pure function of the tree and a [`TraversalPolicy`]:
//! it never descends into a plugin's subtree, stops at anything reached
//! through the host core, and keeps the newest version of each artifact.
//!
//! # Core Modules
//!
//! ## Engine
//! - [`artifact`] - coordinates, the [`ArtifactFacade`] view and plugin classification
//! - [`resolver`] - dependency collection and the plugin-aware traversal
//! - [`assembler`] - bundle planning, library copying and war overlays
//! - [`packaging`] - the goals: `package`, `hpl`, `assemble-dependencies`,
//!   `list-plugin-dependencies`, `validate`, `record-core-location`
//! - [`isolation`] - class-isolation policies for running plugins inside the tool
//!
//! ## Formats
//! - [`archive`] - jar manifests and zip archives
//! - [`project`] - the `hpkg.toml` project descriptor
//! - [`workspace_map`] - the developer workspace map file
//!
//! ## Supporting Modules
//! - [`cli`] - command-line interface
//! - [`config`] - global configuration (`~/.hpkg/config.toml`)
//! - [`core`] - error types and user-facing error rendering
//! - [`constants`] - file names and manifest attribute names
//! - [`utils`] - filesystem helpers
//! - [`version`] - version ordering and snapshot detection
//!
//! # Project Format (hpkg.toml)
//!
//! ```toml
//! [project]
//! group-id = "org.example"
//! artifact-id = "hello"
//! version = "1.0-SNAPSHOT"
//! name = "Hello Plugin"
//!
//! [plugin]
//! compatible-since-version = "0.9"
//! mask-classes = "org.apache.commons.lang."
//!
//! [[dependencies]]
//! group-id = "org.jenkins-ci.main"
//! artifact-id = "jenkins-core"
//! version = "2.401"
//! scope = "provided"
//!
//! [[dependencies]]
//! group-id = "org.example"
//! artifact-id = "credentials"
//! version = "2.3"
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! hpkg package                    # build target/hello-1.0-SNAPSHOT.hpi
//! hpkg tree                       # show what gets bundled and why
//! hpkg validate                   # check host version requirements
//! hpkg hpl --host-home ~/work     # write ~/work/plugins/hello-1.0-SNAPSHOT.hpl
//! ```
//!
//! [`TraversalPolicy`]: resolver::TraversalPolicy
//! [`ArtifactFacade`]: artifact::ArtifactFacade

// Engine
pub mod artifact;
pub mod assembler;
pub mod isolation;
pub mod packaging;
pub mod resolver;

// Formats
pub mod archive;
pub mod project;
pub mod workspace_map;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod utils;
pub mod version;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
