use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, ValueEnum};
use context_accuracy::{run_suite, LogSink, ReadinessStatus, RunReport, SuiteConfig, TransportConfig};
use context_backend::{
    AnalysisBackend, BackendClient, ChildProcessBackend, HttpBackend, ReplayBackend,
};
use context_verifier::FallbackPolicy;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code for configuration and startup errors.
pub const EXIT_STARTUP_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "context-verify")]
#[command(
    about = "Cross-check a code-analysis backend's symbol answers and score its readiness",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Suite configuration (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project the backend analyzes; relative paths are resolved against it
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// HTTP backend base URL (JSON-RPC at {url}/mcp)
    #[arg(long, conflicts_with_all = ["server_command", "replay"])]
    server_url: Option<String>,

    /// Spawn an MCP server over stdio instead of using HTTP
    #[arg(long, conflicts_with = "replay")]
    server_command: Option<String>,

    /// Argument for --server-command (repeatable)
    #[arg(long = "server-arg", requires = "server_command", allow_hyphen_values = true)]
    server_args: Vec<String>,

    /// Answer from a recorded replay script instead of a live backend
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Per-call timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Verdict when a name is present but no declaration pattern matched: accept|reject
    #[arg(long)]
    fallback: Option<String>,

    /// Minimum success rate (percent) for READY
    #[arg(long)]
    ready_threshold: Option<f64>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

pub async fn main_entry() -> Result<ExitCode> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers
    if cli.format == OutputFormat::Json {
        cli.quiet = true;
    }
    init_logging(&cli);

    let config = resolve_config(&cli)?;
    if cli.print_config {
        let rendered =
            toml::to_string_pretty(&config).context("Failed to render configuration")?;
        print!("{rendered}");
        return Ok(ExitCode::SUCCESS);
    }

    let backend = connect(&config.transport).await?;
    let client = BackendClient::new(backend, config.client_config());
    let (report, _) = run_suite(&client, &config, LogSink).await?;

    print_report(&report, cli.format)?;
    Ok(exit_code(report.status()))
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // rmcp and reqwest are chatty at debug
    if !cli.verbose {
        builder.filter_module("rmcp", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<SuiteConfig> {
    let mut config = match &cli.config {
        Some(path) => SuiteConfig::load(path)?,
        None => SuiteConfig::default(),
    };

    if let Some(root) = &cli.project_root {
        config.project_root = Some(root.clone());
    }
    if let Some(url) = &cli.server_url {
        config.transport = TransportConfig::Http { url: url.clone() };
    }
    if let Some(command) = &cli.server_command {
        config.transport = TransportConfig::ChildProcess {
            command: command.clone(),
            args: cli.server_args.clone(),
        };
    }
    if let Some(path) = &cli.replay {
        config.transport = TransportConfig::Replay { path: path.clone() };
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.call_timeout_ms = timeout_ms;
    }
    if let Some(fallback) = &cli.fallback {
        config.fallback_policy = fallback
            .parse::<FallbackPolicy>()
            .context("Invalid --fallback")?;
    }
    if let Some(threshold) = cli.ready_threshold {
        config.ready_threshold = threshold;
    }

    config.validate()?;
    Ok(config)
}

async fn connect(transport: &TransportConfig) -> Result<Box<dyn AnalysisBackend>> {
    let backend: Box<dyn AnalysisBackend> = match transport {
        TransportConfig::Http { url } => {
            Box::new(HttpBackend::new(url.clone()).context("Failed to build HTTP client")?)
        }
        TransportConfig::ChildProcess { command, args } => Box::new(
            ChildProcessBackend::spawn(command, args)
                .await
                .with_context(|| format!("Failed to start MCP server '{command}'"))?,
        ),
        TransportConfig::Replay { path } => Box::new(
            ReplayBackend::load(path)
                .with_context(|| format!("Failed to load replay script {}", path.display()))?,
        ),
    };
    log::info!("Backend: {}", backend.describe());
    Ok(backend)
}

fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Markdown => print!("{}", report.render_markdown()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(report).context("Failed to serialize report")?
        ),
    }
    Ok(())
}

fn exit_code(status: ReadinessStatus) -> ExitCode {
    if status.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
