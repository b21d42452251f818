use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use topo_common::{KgStore, KnowledgeGraph, Snapshot, TaskId};
use topo_verifier::{report, VerificationResult};

#[derive(Parser)]
#[command(name = "topo-tools", about = "Manual-invocation wrapper around the topology verifier")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a candidate snapshot against either a reference snapshot
    /// (simple tasks) or a complex-task topology template.
    Check(CheckArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// Candidate circuit snapshot JSON.
    #[arg(long)]
    snapshot: PathBuf,
    /// Knowledge-graph overlay JSON.
    #[arg(long)]
    kg: PathBuf,
    /// Base component table JSON, consulted when the KG overlay has no
    /// entry for a part.
    #[arg(long)]
    base_table: Option<PathBuf>,
    /// Reference snapshot JSON, required for simple tasks (task ids
    /// outside the complex-task template table 17-23).
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Task identifier.
    #[arg(long)]
    task_id: u32,
    /// Print the result as JSON instead of plain text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "topo_tools=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => check(args),
    }
}

fn check(args: CheckArgs) -> Result<ExitCode> {
    let snapshot: Snapshot = topo_common::load_json(&args.snapshot)
        .with_context(|| format!("loading candidate snapshot from {}", args.snapshot.display()))?;
    let overlay: KnowledgeGraph = topo_common::load_json(&args.kg)
        .with_context(|| format!("loading knowledge graph from {}", args.kg.display()))?;
    let base_table: Option<KnowledgeGraph> = args
        .base_table
        .as_ref()
        .map(|path| topo_common::load_json(path).with_context(|| format!("loading base component table from {}", path.display())))
        .transpose()?;
    let store = KgStore::new(overlay, base_table);
    let task_id = TaskId(args.task_id);

    let result = if topo_circuit::resolve_template(task_id).is_ok() {
        topo_verifier::verify_complex(&snapshot, &store, task_id)
    } else {
        let reference_path = args
            .reference
            .as_ref()
            .with_context(|| format!("task {} is a simple task and requires --reference", task_id.0))?;
        let reference: Snapshot = topo_common::load_json(reference_path)
            .with_context(|| format!("loading reference snapshot from {}", reference_path.display()))?;
        topo_verifier::verify_simple(&snapshot, &reference, &store, task_id)
    };

    let summary = CheckSummary::from(&result);
    output_summary(&summary, args.json)?;

    if result.passed {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn output_summary<T>(summary: &T, json: bool) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckSummary {
    passed: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl From<&VerificationResult> for CheckSummary {
    fn from(result: &VerificationResult) -> Self {
        CheckSummary {
            passed: result.passed,
            errors: result.errors.clone(),
            warnings: result.warnings.clone(),
        }
    }
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "{warning}")?;
        }
        let formatted = report(&self.errors);
        if formatted.is_empty() {
            writeln!(f, "Topology verification passed.")
        } else {
            writeln!(f, "{formatted}")
        }
    }
}
