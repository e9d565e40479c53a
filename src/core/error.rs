//! Error handling for hpkg
//!
//! This module provides the error taxonomy of the packaging engine and the
//! user-facing error reporting used by the CLI. The error system follows two
//! principles:
//! 1. **Strongly-typed errors** so callers can match on the failure class
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Resolution**: [`HpkgError::Resolution`], [`HpkgError::CircularDependency`]
//! - **Classification**: [`HpkgError::Classification`]
//! - **Version policy**: [`HpkgError::VersionPolicyViolation`],
//!   [`HpkgError::HostVersionNotFound`], [`HpkgError::IncompatibleHostVersion`],
//!   [`HpkgError::ProvidedPluginDependency`]
//! - **Assembly I/O**: [`HpkgError::AssemblyIo`], [`HpkgError::ArchiveError`]
//! - **Configuration**: [`HpkgError::ProjectNotFound`], [`HpkgError::ProjectParseError`],
//!   [`HpkgError::ProjectValidationError`], [`HpkgError::ConfigError`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use hpkg_cli::core::{HpkgError, user_friendly_error};
//!
//! let error = HpkgError::HostVersionNotFound;
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for hpkg operations.
///
/// Every failure the engine can report maps onto one variant. Variants carry
/// the artifact ids and paths needed to explain the failure without a debugger.
#[derive(Error, Debug)]
pub enum HpkgError {
    /// The resolution service could not describe or fetch an artifact.
    #[error("Failed to resolve {artifact}: {reason}")]
    Resolution {
        /// Coordinate id of the artifact
        artifact: String,
        /// What went wrong
        reason: String,
    },

    /// A dependency cycle was found while collecting the graph
    #[error("Circular dependency detected: {chain}")]
    CircularDependency {
        /// The cycle, rendered as `a -> b -> a`
        chain: String,
    },

    /// The archive behind an artifact could not be opened or read.
    ///
    /// Fatal under strict classification; best-effort callers downgrade it
    /// to a warning.
    #[error("Failed to open artifact {artifact} at {}: {reason}", path.display())]
    Classification {
        /// Coordinate id of the artifact
        artifact: String,
        /// Archive that failed to open
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// A snapshot version override points at a different release line
    #[error(
        "Snapshot version override '{override_version}' does not start with the release part of '{version}'"
    )]
    VersionPolicyViolation {
        /// The project's own version
        version: String,
        /// The configured override
        override_version: String,
    },

    /// No host-core dependency and no explicit host version
    #[error("Failed to determine the host version this plugin depends on")]
    HostVersionNotFound,

    /// A direct plugin dependency uses the `provided` scope
    #[error("Plugin dependency {artifact} must not use the provided scope")]
    ProvidedPluginDependency {
        /// Coordinate id of the dependency
        artifact: String,
    },

    /// A dependency needs a newer host than the project declares
    #[error("Dependency {artifact} requires host version {required} or higher (project uses {actual})")]
    IncompatibleHostVersion {
        /// Coordinate id of the dependency
        artifact: String,
        /// Host version the dependency requires
        required: String,
        /// Host version the project is built against
        actual: String,
    },

    /// A copy, unpack or write step of the assembly failed
    #[error("Failed to {operation} {} to {}", source_path.display(), destination.display())]
    AssemblyIo {
        /// The step that failed (e.g. "copy", "unpack")
        operation: String,
        /// Where the data came from
        source_path: PathBuf,
        /// Where the data was going
        destination: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An archive could not be read or written
    #[error("Archive error in {}: {reason}", path.display())]
    ArchiveError {
        /// Archive path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A `META-INF/MANIFEST.MF` body is malformed
    #[error("Invalid manifest at line {line}: {reason}")]
    ManifestParseError {
        /// 1-based line number
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// Project descriptor (hpkg.toml) not found
    ///
    /// hpkg searches the current directory and its parents, similar to how
    /// git searches for `.git`.
    #[error("Project file hpkg.toml not found in current directory or any parent directory")]
    ProjectNotFound,

    /// Project descriptor has invalid syntax
    #[error("Invalid project file syntax in {file}")]
    ProjectParseError {
        /// Path of the descriptor
        file: String,
        /// Parser message
        reason: String,
    },

    /// Project descriptor parsed but is semantically invalid
    #[error("Project validation failed: {reason}")]
    ProjectValidationError {
        /// Reason why validation failed
        reason: String,
    },

    /// Global configuration problem
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl HpkgError {
    /// Wraps an I/O failure of an assembly step with both endpoints.
    pub fn assembly_io(
        operation: impl Into<String>,
        source_path: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::AssemblyIo {
            operation: operation.into(),
            source_path: source_path.into(),
            destination: destination.into(),
            source,
        }
    }
}

/// Error context wrapper with a suggestion and details for CLI display
///
/// Suggestions are shown in green, details in yellow, the error itself in
/// bold red.
///
/// ```rust,no_run
/// use hpkg_cli::core::{ErrorContext, HpkgError};
///
/// let context = ErrorContext::new(HpkgError::ProjectNotFound)
///     .with_suggestion("Create an hpkg.toml file in your project directory");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: HpkgError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details
    #[must_use]
    pub const fn new(error: HpkgError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`]
///
/// Recognizes [`HpkgError`] variants (with tailored suggestions),
/// [`std::io::Error`] and [`toml::de::Error`]. Anything else is reported with
/// its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    let error = match error.downcast::<HpkgError>() {
        Ok(hpkg_error) => return create_error_context(hpkg_error),
        Err(other) => other,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(HpkgError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check file ownership and permissions of the output directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(HpkgError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(HpkgError::ProjectParseError {
            file: "hpkg.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax. Verify quotes, brackets, and key names");
    }

    let mut message = error.to_string();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(HpkgError::Other {
        message,
    })
}

fn create_error_context(error: HpkgError) -> ErrorContext {
    match &error {
        HpkgError::Resolution {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the artifact exists in the local repository (see `repository` in ~/.hpkg/config.toml)"),
        HpkgError::CircularDependency {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Break the cycle by excluding one of the dependencies in hpkg.toml"),
        HpkgError::Classification {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("The archive may be corrupt. Delete it from the local repository and fetch it again")
            .with_details("Plugin detection needs to read META-INF/MANIFEST.MF from every jar dependency"),
        HpkgError::VersionPolicyViolation {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Set fail-on-version-override-to-different-release = false under [plugin] to downgrade this to a warning"),
        HpkgError::HostVersionNotFound => ErrorContext::new(error)
            .with_suggestion("Add the host core as a dependency or set host-version-override under [plugin]"),
        HpkgError::ProvidedPluginDependency {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use the compile scope for plugin dependencies, or mark them optional"),
        HpkgError::IncompatibleHostVersion {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Raise the host core version of this project or use an older release of the dependency"),
        HpkgError::AssemblyIo {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check free disk space and permissions of the output directory"),
        HpkgError::ProjectNotFound => ErrorContext::new(error)
            .with_suggestion("Run hpkg from a project directory or pass --manifest-path")
            .with_details("hpkg searches for hpkg.toml in the current directory and its parents"),
        HpkgError::ProjectParseError {
            reason,
            ..
        } => {
            let reason = reason.clone();
            ErrorContext::new(error)
                .with_details(reason)
                .with_suggestion("Check the TOML syntax in hpkg.toml")
        }
        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_assembly_io_carries_both_paths() {
        let err = HpkgError::assembly_io(
            "copy",
            "/repo/a.jar",
            "/out/WEB-INF/lib/a.jar",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        let message = err.to_string();
        assert!(message.contains("/repo/a.jar"));
        assert!(message.contains("/out/WEB-INF/lib/a.jar"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_user_friendly_error_keeps_variant() {
        let ctx = user_friendly_error(anyhow::Error::from(HpkgError::HostVersionNotFound));
        assert!(matches!(ctx.error, HpkgError::HostVersionNotFound));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_user_friendly_error_with_context_chain() {
        let err = anyhow::anyhow!("inner").context("outer");
        let ctx = user_friendly_error(err);
        let rendered = ctx.to_string();
        assert!(rendered.contains("outer"));
        assert!(rendered.contains("inner"));
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(HpkgError::ProjectNotFound)
            .with_suggestion("create one")
            .with_details("searched upwards");
        let rendered = format!("{ctx}");
        assert!(rendered.contains("Suggestion: create one"));
        assert!(rendered.contains("Details: searched upwards"));
    }
}
