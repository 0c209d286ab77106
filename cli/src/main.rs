//! CLI entrypoint for crossdesk
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use crossdesk_application::{QueryOutcome, RunQueryUseCase};
use crossdesk_domain::{OutputFormat, SessionId, SessionRepository};
use crossdesk_infrastructure::{
    ConfigLoader, FileConfig, FileSessionStore, JsonlTraceLogger, MemorySessionStore, RoutedModel,
    seeded_directory,
};
use crossdesk_presentation::{
    ChatRepl, Cli, ConsoleFormatter, ConsoleProgress, disable_colors, parse_reply,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = if cli.no_config {
        FileConfig::default()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    config.validate()?;

    info!("Starting crossdesk");

    // === Dependency Injection ===
    // Model routing: the OpenRouter rotation when a key is present, the
    // deterministic heuristic otherwise
    let (model, model_label) = if cli.offline {
        (RoutedModel::offline(), "heuristic (offline)".to_string())
    } else if let Some(key) = config.model.api_key() {
        let settings = config.model.settings(key);
        let label = settings.models.join(", ");
        (RoutedModel::online(settings), label)
    } else {
        let label = format!("heuristic (set {} to enable a model)", config.model.api_key_env);
        (RoutedModel::offline(), label)
    };

    // Sessions back the follow-up suspension flow, so one-shot runs need
    // a store that outlives the process
    match config.engine.session_path() {
        Some(dir) => {
            let sessions = Arc::new(FileSessionStore::new(dir)?);
            run(cli, config, model, model_label, sessions).await
        }
        None => {
            let sessions = Arc::new(MemorySessionStore::default());
            run(cli, config, model, model_label, sessions).await
        }
    }
}

async fn run<S>(
    cli: Cli,
    config: FileConfig,
    model: RoutedModel,
    model_label: String,
    sessions: Arc<S>,
) -> Result<()>
where
    S: SessionRepository + 'static,
{
    if !config.output.color {
        disable_colors();
    }

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    let show_progress = !cli.quiet && format != OutputFormat::Json;

    let mut engine = RunQueryUseCase::new(Arc::new(model), seeded_directory(), sessions)
        .with_params(config.params());

    if let Some(path) = &config.engine.trace_log
        && let Some(logger) = JsonlTraceLogger::new(path)
    {
        engine = engine.with_logger(Arc::new(logger));
    }

    if show_progress {
        engine = engine.with_progress(Arc::new(ConsoleProgress));
    }

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(engine, model_label);
        repl.run().await?;
        return Ok(());
    }

    // One-shot runs stop cleanly on Ctrl-C; chat leaves it to readline
    let cancel = CancellationToken::new();
    engine = engine.with_cancellation(cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    // Resuming a suspended run: the positional argument is the reply
    if let Some(session_id) = &cli.resume {
        let Some(reply) = cli.query.as_deref() else {
            bail!("--resume needs the follow-up reply as the positional argument");
        };
        let id = SessionId::new(session_id.clone());
        let request = engine.pending_request(&id).await?;
        let Some((field, value)) = parse_reply(request.field, reply) else {
            bail!("Empty reply. Expected a value like \"{}=...\"", request.field);
        };
        let outcome = engine.resume(&id, field, value).await?;
        render_outcome(outcome, format);
        return Ok(());
    }

    // Single question mode - a query is required
    let query = match &cli.query {
        Some(q) => q.clone(),
        None => bail!("A question is required. Use --chat for interactive mode."),
    };

    // Print header
    if show_progress {
        println!();
        println!("Question: {}", query);
        println!("Model: {}", model_label);
        println!();
    }

    let outcome = engine.run(&query).await?;
    render_outcome(outcome, format);

    Ok(())
}

fn render_outcome(outcome: QueryOutcome, format: OutputFormat) {
    match outcome {
        QueryOutcome::Answer(answer) => {
            let output = match format {
                OutputFormat::Full => ConsoleFormatter::format(&answer),
                OutputFormat::Answer => ConsoleFormatter::format_answer_only(&answer),
                OutputFormat::Json => ConsoleFormatter::format_json(&answer),
            };
            println!("{}", output);
        }
        QueryOutcome::NeedsInput { session, request } => {
            let output = match format {
                OutputFormat::Json => ConsoleFormatter::format_prompt_json(&session, &request),
                _ => ConsoleFormatter::format_prompt(&session, &request),
            };
            println!("{}", output);
        }
    }
}
