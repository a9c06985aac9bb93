use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use tracing::info;

use debate_engine::{
    DebateEvent, DebateOrchestrator, DebateRequest, GenerationConfig, GenerationService,
    InMemoryHistoryStore, SynthesisConfig,
};

/// Run one debate and stream its events to stdout.
#[derive(Debug, Parser)]
#[command(name = "debate-cli", version, about)]
struct Cli {
    /// Question or motion to debate.
    #[arg(long)]
    prompt: String,

    /// Stop once the moderator's confidence reaches this value (0-100).
    #[arg(long)]
    confidence_target: f64,

    /// Round cap (1-20).
    #[arg(long, default_value_t = 8)]
    max_rounds: u32,

    /// Log which synthesis stage produced each round's result.
    #[arg(
        long,
        env = "DEBUG_MODERATOR",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    debug_moderator: bool,

    /// Model identifier; overrides the configured default.
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,
}

/// One server-sent-event frame.
fn sse_frame(event: &DebateEvent) -> Result<String> {
    let json = serde_json::to_string(event).context("serializing debate event")?;
    Ok(format!("data: {}\n\n", json))
}

/// Write and flush one frame.
fn write_frame(out: &mut impl Write, event: &DebateEvent) -> Result<()> {
    out.write_all(sse_frame(event)?.as_bytes())
        .context("writing event to stdout")?;
    out.flush().context("flushing stdout")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let request = DebateRequest::new(cli.prompt, cli.confidence_target, cli.max_rounds);
    request.validate().context("invalid debate request")?;

    let mut config = GenerationConfig::from_env();
    if let Some(model) = cli.model {
        config.model = model;
    }
    let model = config.model.clone();
    let service = GenerationService::new(config).context("configuring generation backend")?;
    let backend = if service.is_enabled() { "openai" } else { "stand-in" };
    info!(model = %model, backend, "Debate runner starting");

    let synthesis = SynthesisConfig {
        debug: cli.debug_moderator,
        ..SynthesisConfig::default()
    };
    let store = Arc::new(InMemoryHistoryStore::new());
    let orchestrator = DebateOrchestrator::new(service.shared(), store, synthesis);

    let mut events = orchestrator.run(request);
    while let Some(event) = events.next().await {
        write_frame(&mut std::io::stdout().lock(), &event)?;
    }

    Ok(())
}
