//! CLI for inspecting a routes directory: route table, merged schema
//! document, and structural lint.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fsroutes::lint::lint_routes_dir;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fsroutes")]
#[command(about = "File-based route table inspector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved route table
    Routes {
        /// Routes directory to inspect
        #[arg(short, long)]
        dir: PathBuf,

        /// Prefix prepended to every route
        #[arg(short, long, default_value = "")]
        prefix: String,
    },
    /// Print the merged OpenAPI-like schema document
    Schema {
        /// Routes directory to inspect
        #[arg(short, long)]
        dir: PathBuf,

        /// Prefix prepended to every route
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Base schema file (YAML or JSON) merged under the computed paths
        #[arg(short, long)]
        base: Option<PathBuf>,

        /// Emit YAML instead of pretty JSON
        #[arg(long, default_value_t = false)]
        yaml: bool,
    },
    /// Check the directory structure; exits non-zero on issues
    Lint {
        /// Routes directory to check
        #[arg(short, long)]
        dir: PathBuf,
    },
}

fn load_base(path: &PathBuf) -> anyhow::Result<Value> {
    let content = fs::read_to_string(path)?;
    let value = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(value)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Routes { dir, prefix } => {
            let report = lint_routes_dir(&dir, &prefix, None)?;
            if report.schema.is_none() {
                println!("directory {} not found", dir.display());
                return Ok(());
            }
            for route in &report.routes {
                let middleware = if route.middleware.is_empty() {
                    String::new()
                } else {
                    format!(" (with {} middleware)", route.middleware.len())
                };
                println!(
                    "{:<7} {} -> {}{}",
                    route.method.to_string(),
                    route.route,
                    route.handler,
                    middleware
                );
            }
        }
        Commands::Schema {
            dir,
            prefix,
            base,
            yaml,
        } => {
            let base = base.as_ref().map(load_base).transpose()?;
            let report = lint_routes_dir(&dir, &prefix, base)?;
            match report.schema {
                Some(schema) if yaml => print!("{}", serde_yaml::to_string(&schema)?),
                Some(schema) => println!("{}", serde_json::to_string_pretty(&schema)?),
                None => println!("null"),
            }
        }
        Commands::Lint { dir } => {
            let report = lint_routes_dir(&dir, "", None)?;
            if report.issues.is_empty() {
                println!("ok: {} route(s), no issues", report.routes.len());
            } else {
                eprintln!("{} issue(s) found:", report.issues.len());
                for issue in &report.issues {
                    eprintln!("  {issue}");
                }
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
