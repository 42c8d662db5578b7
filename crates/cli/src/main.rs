//! Stratus CLI
//!
//! Command-line front end: discovers service document sets under a
//! model directory, runs each service's patch/resolve/context pipeline
//! as one independent unit of work, and reports per-service results.
//!
//! Expected layout: one subdirectory per service containing `api.json`
//! (required) plus optional `docs.json`, `paginators.json`, and
//! `waiters.json`; a single shared endpoints document is passed with
//! `--endpoints`.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use stratus_codegen::{assemble, GenerationSet, ServiceDocuments};
use stratus_common::ServiceError;
use stratus_model::endpoints::EndpointsModel;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "stratus")]
#[command(version, about = "Resolve cloud API model documents into generation contexts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one service and display a model summary
    #[command(after_help = "EXAMPLES:\n  \
        # Inspect a single service\n  \
        stratus parse --models ./models --service ledger")]
    Parse {
        /// Directory containing per-service model directories
        #[arg(short, long)]
        models: PathBuf,

        /// Service to resolve (directory name under --models)
        #[arg(short, long)]
        service: String,
    },

    /// Resolve every service and emit generation contexts
    #[command(after_help = "EXAMPLES:\n  \
        # Process every service in the model directory\n  \
        stratus generate --models ./models --endpoints ./endpoints.json --output ./contexts\n\n  \
        # Only selected services\n  \
        stratus generate --models ./models --filter ledger,objectstore")]
    Generate {
        /// Directory containing per-service model directories
        #[arg(short, long)]
        models: PathBuf,

        /// Shared endpoints document
        #[arg(short, long)]
        endpoints: Option<PathBuf>,

        /// Comma-separated list of service names to include
        #[arg(long, value_delimiter = ',')]
        filter: Option<Vec<String>>,

        /// Directory to write per-service context JSON into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { models, service } => parse_command(&models, &service, cli.verbose),
        Commands::Generate {
            models,
            endpoints,
            filter,
            output,
        } => generate_command(
            &models,
            endpoints.as_deref(),
            filter.as_deref(),
            output.as_deref(),
            cli.verbose,
        ),
    }
}

fn parse_command(models: &Path, service: &str, verbose: bool) -> Result<()> {
    println!("{} Resolving service: {}", "→".cyan(), service.yellow());

    let documents = load_service(&models.join(service))
        .with_context(|| format!("Failed to load documents for {service}"))?;
    let set = assemble(documents, None)?;

    println!("\n{}", "✓ Resolution successful!".green().bold());
    println!("  Service: {}", set.service.name.yellow());
    println!("  Protocol: {}", set.service.protocol.name);
    println!("  Operations: {}", set.service.operations.len());
    println!("  Shapes: {}", set.shapes.len());
    println!("  Errors: {}", set.errors.len());
    println!("  Paginators: {}", set.paginators.len());
    println!("  Waiters: {}", set.waiters.len());

    if verbose {
        println!("\n{}", "Operations:".bold());
        for op in &set.service.operations {
            println!(
                "  • {} {} {}",
                op.wire_name.cyan(),
                op.http_method,
                op.request_uri
            );
        }
    }

    Ok(())
}

fn generate_command(
    models: &Path,
    endpoints_path: Option<&Path>,
    filter: Option<&[String]>,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let endpoints = endpoints_path
        .map(|path| -> Result<EndpointsModel> {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read endpoints document {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse endpoints document {}", path.display()))
        })
        .transpose()?;

    let services = discover_services(models, filter)?;
    if services.is_empty() {
        anyhow::bail!("No service model directories found under {}", models.display());
    }

    println!(
        "{} Processing {} services",
        "→".cyan(),
        services.len().to_string().yellow()
    );

    // One unit of work per service; a failure is reported and does not
    // halt the others.
    let results: Vec<std::result::Result<GenerationSet, ServiceError>> = services
        .par_iter()
        .map(|dir| {
            let name = service_name(dir);
            let documents = load_service(dir)
                .map_err(|e| ServiceError::new(name, stratus_common::Error::Io(e)))?;
            assemble(documents, endpoints.as_ref())
        })
        .collect();

    let mut failed = 0;
    for result in &results {
        match result {
            Ok(set) => {
                println!(
                    "{} {} ({} operations, {} shapes)",
                    "✓".green(),
                    set.service.name.yellow(),
                    set.service.operations.len(),
                    set.shapes.len()
                );
                if let Some(dir) = output {
                    write_contexts(dir, set)?;
                }
            }
            Err(e) => {
                eprintln!("{} {}", "⚠".yellow(), e);
                failed += 1;
            }
        }
    }

    if verbose {
        println!("\n  Models: {}", models.display());
        if let Some(dir) = output {
            println!("  Output: {}", dir.display());
        }
    }

    println!(
        "\n{} {} succeeded, {} failed",
        "✓".green().bold(),
        results.len() - failed,
        failed
    );

    if failed > 0 {
        anyhow::bail!("{failed} service(s) failed");
    }
    Ok(())
}

/// Find service directories: any directory directly containing an
/// `api.json`.
fn discover_services(models: &Path, filter: Option<&[String]>) -> Result<Vec<PathBuf>> {
    if !models.is_dir() {
        anyhow::bail!("Not a directory: {}", models.display());
    }

    let mut services = Vec::new();
    for entry in WalkDir::new(models)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() && entry.file_name().to_str() == Some("api.json") {
            let Some(dir) = entry.path().parent() else {
                continue;
            };
            if let Some(filter) = filter {
                let name = service_name(dir);
                if !filter.iter().any(|f| f == &name) {
                    continue;
                }
            }
            services.push(dir.to_path_buf());
        }
    }
    services.sort();
    Ok(services)
}

fn service_name(dir: &Path) -> String {
    dir.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Load one service's document set from its directory.
fn load_service(dir: &Path) -> std::io::Result<ServiceDocuments> {
    let model = serde_json::from_str(&fs::read_to_string(dir.join("api.json"))?)?;

    let docs = read_optional(&dir.join("docs.json"))?;
    let pagination = read_optional(&dir.join("paginators.json"))?;
    let waiters = read_optional(&dir.join("waiters.json"))?;

    Ok(ServiceDocuments {
        name: service_name(dir),
        model,
        docs,
        pagination,
        waiters,
    })
}

fn read_optional<T: serde::de::DeserializeOwned>(path: &Path) -> std::io::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&fs::read_to_string(path)?)?))
}

fn write_contexts(dir: &Path, set: &GenerationSet) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(format!("{}.json", set.service.name));
    let values = stratus_codegen::handoff::template_values(set)
        .context("Failed to project generation contexts")?;
    fs::write(&path, serde_json::to_vec_pretty(&values.into_json())?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
