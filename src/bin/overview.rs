//! Synapse Overview CLI
//!
//! Generates the project overview, prints dependency trees and locates
//! artifacts by key.
//!
//! Usage:
//!   synapse-overview generate ./my-project
//!   synapse-overview tree ./my-project/api/Order.xml --root ./my-project
//!   synapse-overview locate Validate --kind sequence --root ./my-project

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use synapse_overview::config::OutputFormat;
use synapse_overview::{ArtifactKind, ArtifactLocator, OverviewAggregator, OverviewConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synapse-overview")]
#[command(about = "Resolve artifact dependencies and build project overviews")]
struct Cli {
    /// Config file (defaults to overview.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the entrypoint/connection overview of a project
    Generate {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },

    /// Print the dependency tree of one artifact
    Tree {
        /// Artifact file
        file: PathBuf,

        /// Project root (defaults to the parent of the artifact's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Print JSON instead of an indented tree
        #[arg(long)]
        json: bool,
    },

    /// Find the file that declares a key
    Locate {
        key: String,

        /// Artifact kind (sequence, endpoint, template, message-store, ...)
        #[arg(short, long)]
        kind: String,

        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Write it to this file instead of printing
        #[arg(long)]
        save: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Dot,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = OverviewConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Generate { root, output, format } => {
            let pretty = config.output.format == OutputFormat::Pretty;
            let aggregator = OverviewAggregator::new(config);
            let model = aggregator.generate(&root)?;

            let rendered = match format {
                Format::Json if pretty => serde_json::to_string_pretty(&model)?,
                Format::Json => serde_json::to_string(&model)?,
                Format::Dot => model.to_dot(),
            };
            emit(&rendered, output.as_deref())?;

            eprintln!(
                "✅ {}: {} entrypoints, {} connections",
                model.project_name,
                model.entrypoints.len(),
                model.connections.len()
            );
        }
        Commands::Tree { file, root, json } => {
            let root = root.unwrap_or_else(|| default_root(&file));
            let aggregator = OverviewAggregator::new(config);
            let tree = aggregator.tree(&root, &file);

            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                print!("{}", tree.render());
                let connectors: Vec<&str> = tree
                    .collect_kind(ArtifactKind::Connector)
                    .into_iter()
                    .filter_map(|d| d.name.as_deref())
                    .collect();
                eprintln!("✅ {} connector usages: {}", connectors.len(), connectors.join(", "));
            }
        }
        Commands::Locate { key, kind, root } => {
            let kind: ArtifactKind = kind.parse()?;
            let locator = ArtifactLocator::new(config.layout);

            match locator.locate(&key, kind, &root) {
                Some(path) => println!("{}", path.display()),
                None => {
                    eprintln!("❌ No {} declares '{}'", kind, key);
                    let suggestions = locator.suggest(&key, kind, &root, 5);
                    if !suggestions.is_empty() {
                        eprintln!("   Did you mean: {}", suggestions.join(", "));
                    }
                    std::process::exit(2);
                }
            }
        }
        Commands::Config { save } => match save {
            Some(path) => {
                config.save(&path)?;
                eprintln!("✅ Saved configuration to: {}", path);
            }
            None => println!("{}", toml::to_string_pretty(&config)?),
        },
    }

    Ok(())
}

/// `project/sequences/Foo.xml` → `project`
fn default_root(file: &Path) -> PathBuf {
    file.parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("✅ Wrote: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
