//! Argument parsing tests for the CLI.

#[cfg(test)]
mod cli_tests {
    use crate::cli::{Cli, Commands};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parsing() {
        assert!(Cli::try_parse_from(["hpkg", "--help"]).is_err());
        assert!(Cli::try_parse_from(["hpkg"]).is_err());

        for command in [
            "package",
            "hpl",
            "assemble-dependencies",
            "list-plugin-dependencies",
            "validate",
            "record-core-location",
            "tree",
        ] {
            assert!(Cli::try_parse_from(["hpkg", command]).is_ok(), "{command}");
        }
    }

    #[test]
    fn test_log_filter() {
        let cli = Cli::try_parse_from(["hpkg", "validate"]).unwrap();
        assert_eq!(cli.log_filter(), "info");

        let cli = Cli::try_parse_from(["hpkg", "--verbose", "validate"]).unwrap();
        assert_eq!(cli.log_filter(), "debug");

        let cli = Cli::try_parse_from(["hpkg", "validate", "-q"]).unwrap();
        assert_eq!(cli.log_filter(), "error");

        let cli = Cli::try_parse_from(["hpkg", "-v", "-q", "validate"]).unwrap();
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn test_global_paths() {
        let cli = Cli::try_parse_from([
            "hpkg",
            "tree",
            "--config",
            "/tmp/config.toml",
            "--manifest-path",
            "plugin",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
        assert_eq!(cli.manifest_path, Some(PathBuf::from("plugin")));
    }

    #[test]
    fn test_assemble_dependencies_arguments() {
        let cli = Cli::try_parse_from([
            "hpkg",
            "assemble-dependencies",
            "--output",
            "work/plugins",
            "--scopes",
            "compile,provided",
            "--include-optional",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::AssembleDependencies(_)));
    }

    #[test]
    fn test_isolation_check_needs_names() {
        assert!(Cli::try_parse_from(["hpkg", "isolation", "check"]).is_err());
        assert!(
            Cli::try_parse_from(["hpkg", "isolation", "check", "--chain", "nope", "a.B"]).is_err()
        );
        assert!(
            Cli::try_parse_from([
                "hpkg",
                "isolation",
                "check",
                "--chain",
                "infrastructure",
                "--resource",
                "jndi.properties"
            ])
            .is_ok()
        );
    }
}
