use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use todo_api::topology::{self, TopologyError};

/// Checks and renders the deployment topology declaration.
#[derive(Parser)]
#[command(name = "topology", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report every violation in a declaration
    Validate(FileArgs),
    /// Print the reconciler variables as JSON
    Render(RenderArgs),
    /// Print the layers in apply order with their resources
    Plan(FileArgs),
}

#[derive(Args)]
struct FileArgs {
    /// Declaration file (.toml, .json or .yaml)
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    input: FileArgs,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Validate(args) => {
            let topology = load_valid(&args.file)?;
            println!(
                "{}: {}-{} is valid",
                args.file.display(),
                topology.project,
                topology.environment
            );
        }
        Command::Render(args) => {
            let topology = load_valid(&args.input.file)?;
            let vars = topology.to_tfvars();
            let rendered = if args.pretty {
                serde_json::to_string_pretty(&vars)
            } else {
                serde_json::to_string(&vars)
            }
            .map_err(TopologyError::from)?;
            println!("{rendered}");
        }
        Command::Plan(args) => {
            let topology = load_valid(&args.file)?;
            for (step, plan) in topology.apply_order().iter().enumerate() {
                let depends_on: Vec<&str> =
                    plan.depends_on.iter().map(|layer| layer.as_str()).collect();
                println!(
                    "{}. {} (after: {})",
                    step + 1,
                    plan.layer.as_str(),
                    if depends_on.is_empty() {
                        "-".to_string()
                    } else {
                        depends_on.join(", ")
                    }
                );
                for resource in &plan.resources {
                    println!("   - {resource}");
                }
            }
        }
    }
    Ok(())
}

fn load_valid(path: &Path) -> Result<topology::DeploymentTopology> {
    topology::load_valid(path).with_context(|| format!("checking {}", path.display()))
}
