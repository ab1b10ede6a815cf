//! CLI entrypoint for tutor-reason
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use reasoning_application::{
    LlmGateway, NoPerformanceStore, NoThoughts, PerformanceStore, ProviderRouter,
    RunReasoningUseCase, ToolExecutorPort,
};
use reasoning_domain::{OutputFormat, ProviderKind, Query, RequestContext, SearchModes};
use reasoning_infrastructure::{
    ConfigLoader, FileConfig, JsonlPerformanceStore, RoutingGateway, build_adapters, build_probe,
    standard_registry,
};
use reasoning_presentation::{
    ChatRepl, Cli, ConsoleFormatter, OutputFormatter, ReplConfig, ThoughtReporter,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    if cli.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let log_dir = cli.log_dir.as_deref().or(config.logging.log_dir.as_deref());
    let _log_guard = init_logging(cli.verbose, log_dir, &config.logging.file_prefix)?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    info!("Starting tutor-reason");

    // === Dependency Injection ===
    let use_case = Arc::new(build_use_case(&config)?);
    let context = request_context(&cli, &config)?;
    let format: OutputFormat = cli
        .format
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();
    let show_thoughts = !cli.quiet && config.output.show_thoughts;

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(use_case, context)
            .with_format(format)
            .with_config(ReplConfig {
                show_progress: show_thoughts,
                history_file: config.output.history_file.clone(),
            });
        repl.run().await?;
        return Ok(());
    }

    // Single question mode - question is required
    let question = match cli.question {
        Some(q) if !q.trim().is_empty() => q,
        _ => bail!("Question is required. Use --chat for interactive mode."),
    };

    let query = Query::new(question, context);
    let result = if show_thoughts && format != OutputFormat::Json {
        let reporter = ThoughtReporter::new();
        let result = use_case.execute(query, &reporter).await;
        reporter.finish();
        result?
    } else {
        use_case.execute(query, &NoThoughts).await?
    };

    info!(pipeline = %result.source_pipeline, references = result.references.len(), "Run finished");
    println!("{}", ConsoleFormatter.render(&result, format));

    Ok(())
}

/// Console logging by `-v` count, plus a daily-rolling file when a log
/// directory is configured. The returned guard flushes the file writer.
fn init_logging(verbose: u8, log_dir: Option<&Path>, file_prefix: &str) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(console);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}

fn build_use_case(config: &FileConfig) -> Result<RunReasoningUseCase> {
    let adapters = build_adapters(&config.providers)?;
    let gateway: Arc<dyn LlmGateway> = Arc::new(RoutingGateway::new(adapters));
    let tools: Arc<dyn ToolExecutorPort> = Arc::new(standard_registry(&config.tools)?);

    let performance: Arc<dyn PerformanceStore> = match config
        .routing
        .performance_log_path()
        .and_then(|path| {
            JsonlPerformanceStore::open_with_retention(path, config.routing.performance_retention())
        })
    {
        Some(store) => {
            info!(path = %store.path().display(), records = store.len(), "Performance log opened");
            Arc::new(store)
        }
        None => Arc::new(NoPerformanceStore),
    };

    let router = ProviderRouter::new(config.routing_table()?)
        .with_performance_store(performance.clone())
        .with_probe(Arc::new(build_probe(&config.providers)?));

    Ok(RunReasoningUseCase::new(gateway, tools, Arc::new(router))
        .with_performance_store(performance)
        .with_params(config.orchestration.to_params()))
}

fn request_context(cli: &Cli, config: &FileConfig) -> Result<RequestContext> {
    let preferred_provider = match &cli.provider {
        Some(name) => Some(name.parse::<ProviderKind>()?),
        None => config.preferred_provider()?,
    };

    let mut context = RequestContext::new().with_search(SearchModes {
        web: cli.web,
        academic: cli.academic,
    });
    context.preferred_provider = preferred_provider;
    context.document_id = cli.document.clone();
    context.subject = cli.subject.clone();
    context.user_id = cli.user.clone();
    Ok(context)
}
