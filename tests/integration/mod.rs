//! Integration test suite for hpkg
//!
//! End-to-end tests that run the `hpkg` binary against a project and a local
//! artifact repository laid out in a temporary directory.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **common**: `TestProject` harness (project dir, repository, global config)
//! - **package**: archive layout, bundling decisions and incremental rebuilds
//! - **development**: `hpl` descriptors and `record-core-location`
//! - **plugins**: `assemble-dependencies`, `list-plugin-dependencies`, `validate`
//! - **tree**: dependency tree output in text and JSON
//! - **isolation**: `isolation check` verdicts
//! - **errors**: error reporting and exit codes

mod common;

mod development;
mod errors;
mod isolation;
mod package;
mod plugins;
mod tree;
