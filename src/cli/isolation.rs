//! `isolation check`: evaluate names against a class-isolation chain.
//!
//! ```bash
//! hpkg isolation check --chain servlet javax.servlet.Filter org.apache.maven.Maven
//! hpkg isolation check --chain masking --resource META-INF/services/org.sonatype.Foo
//! ```

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use crate::isolation::{LoaderChain, NameKind, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Chain {
    /// Tool internals masked
    Masking,
    /// Servlet API exposed over the masked classpath
    Servlet,
    /// Servlet API and infrastructure runtime exposed over the masked classpath
    Infrastructure,
}

impl Chain {
    fn build(self) -> LoaderChain {
        match self {
            Self::Masking => LoaderChain::masking(),
            Self::Servlet => LoaderChain::servlet_only(),
            Self::Infrastructure => LoaderChain::infrastructure_and_servlet(),
        }
    }
}

/// Inspect the class-isolation chains.
#[derive(Args, Debug)]
pub struct IsolationCommand {
    #[command(subcommand)]
    command: IsolationSubcommand,
}

#[derive(Subcommand, Debug)]
enum IsolationSubcommand {
    /// Print how each name resolves through a chain
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Chain to evaluate
    #[arg(long, value_enum, default_value = "masking")]
    chain: Chain,

    /// Treat names as resource paths instead of class names
    #[arg(long)]
    resource: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Class names (dotted) or resource paths (slashed)
    #[arg(required = true)]
    names: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Verdict<'a> {
    name: &'a str,
    kind: NameKind,
    #[serde(flatten)]
    resolution: Resolution,
}

impl IsolationCommand {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            IsolationSubcommand::Check(args) => args.execute(),
        }
    }
}

impl CheckArgs {
    fn execute(self) -> Result<()> {
        let chain = self.chain.build();
        let kind = if self.resource {
            NameKind::Resource
        } else {
            NameKind::Class
        };
        let verdicts: Vec<Verdict<'_>> = self
            .names
            .iter()
            .map(|name| Verdict {
                name,
                kind,
                resolution: chain.resolve(kind, name),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&verdicts)?);
            return Ok(());
        }

        println!("{} {}", "chain:".bold(), chain.layer_names().join(" -> "));
        for verdict in &verdicts {
            let outcome = match &verdict.resolution {
                Resolution::Denied {
                    ..
                } => verdict.resolution.to_string().red(),
                Resolution::Exposed {
                    ..
                } => verdict.resolution.to_string().green(),
                Resolution::Delegated => verdict.resolution.to_string().normal(),
            };
            println!("{}  {outcome}", verdict.name);
        }
        Ok(())
    }
}
