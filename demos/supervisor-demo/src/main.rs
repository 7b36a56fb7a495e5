//! Supervisor Demo
//!
//! Loads an agent registry and a fixed plan from JSON, runs one query through
//! the supervisor and prints the outcome.
//!
//! ```bash
//! cargo run -p supervisor-demo -- \
//!     --registry demos/supervisor-demo/data/registry.json \
//!     --plan demos/supervisor-demo/data/plan.json \
//!     --query "Add today's meeting notes to the knowledge base under Project X"
//! ```
//!
//! Set `OPENROUTER_API_KEY` (a `.env` file works) to have the final answer
//! summarized by a model instead of stitched together from tool results.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use supervisor_core::{AgentRegistry, Plan, StaticPlanner};
use supervisor_runtime::{AnswerSynthesizer, QueryRequest, Supervisor};
use tracing::info;

#[derive(Parser)]
#[command(name = "supervisor-demo")]
#[command(about = "Runs one query through the agent supervisor")]
struct Args {
    /// JSON file with the agent registry entries
    #[arg(short, long)]
    registry: PathBuf,

    /// JSON file with the plan to execute
    #[arg(short, long)]
    plan: PathBuf,

    /// The user's query
    #[arg(short, long)]
    query: String,

    /// Conversation to record the exchange under
    #[arg(short, long)]
    conversation_id: Option<String>,

    /// JSON object forwarded to every agent as call context
    #[arg(long, default_value = "{}")]
    context: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("supervisor_demo=info,supervisor_runtime=info")
            }),
        )
        .init();

    let args = Args::parse();

    let registry = AgentRegistry::from_path(&args.registry)
        .with_context(|| format!("loading registry from {}", args.registry.display()))?;
    info!(agents = ?registry.names(), "Loaded agent registry");

    let raw_plan = std::fs::read_to_string(&args.plan)
        .with_context(|| format!("reading plan from {}", args.plan.display()))?;
    let plan: Plan = serde_json::from_str(&raw_plan).context("parsing plan JSON")?;
    plan.validate().context("plan is not executable")?;
    info!(steps = plan.len(), "Loaded plan");

    let context: serde_json::Value =
        serde_json::from_str(&args.context).context("parsing --context JSON")?;

    let synthesizer = AnswerSynthesizer::from_env();
    if !synthesizer.has_backend() {
        info!("OPENROUTER_API_KEY not set, the answer will be stitched from tool results");
    }

    let supervisor = Supervisor::builder(registry)
        .with_planner(Arc::new(StaticPlanner::new(plan)))
        .with_synthesizer(synthesizer)
        .build()?;

    let mut request = QueryRequest::new(args.query).with_context(context);
    if let Some(id) = args.conversation_id {
        request = request.with_conversation(id);
    }

    let outcome = supervisor.handle(request).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
