//! Core types shared across hpkg
//!
//! This module holds the error taxonomy of the packaging engine and the
//! helpers that turn errors into user-facing messages.
//!
//! ## `error` - Error Handling
//!
//! - [`HpkgError`] - Enumerated error types covering all engine failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! # Examples
//!
//! ```rust,no_run
//! use hpkg_cli::core::{HpkgError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(HpkgError::ProjectNotFound.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     user_friendly_error(e).display();
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, HpkgError, user_friendly_error};
