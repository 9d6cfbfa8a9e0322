use anyhow::Context;
use chatrelay::config::{Config, TransportKind};
use chatrelay::relay::BackendClient;
use chatrelay::session::SessionBootstrap;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "chatrelay", version, about = "Relay chat messages to an HTTP backend")]
struct Cli {
    /// Config file (defaults to ~/.chatrelay/config.toml when present)
    #[arg(short, long, env = "CHATRELAY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Backend base URL; `/chat` is appended
    #[arg(long, env = "CHATRELAY_BACKEND_URL", global = true)]
    backend_url: Option<String>,

    /// Directory for session credentials
    #[arg(long, env = "CHATRELAY_SESSION_PATH", global = true)]
    session_path: Option<PathBuf>,

    /// Messaging transport
    #[arg(long, value_enum, global = true)]
    transport: Option<TransportArg>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Start the session and relay messages (default)
    Run,
    /// Check that the backend answers on /health
    Health,
    /// Print the effective configuration
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum TransportArg {
    Console,
    Whatsapp,
}

impl From<TransportArg> for TransportKind {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Console => TransportKind::Console,
            TransportArg::Whatsapp => TransportKind::Whatsapp,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.clone();
    }
    if let Some(path) = &cli.session_path {
        config.session.path = path.clone();
    }
    if let Some(transport) = cli.transport {
        config.session.transport = transport.into();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("chatrelay: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match chatrelay::logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("chatrelay: failed to initialize logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::Health => health(&config).await,
        Command::Config => print_config(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting chatrelay");
    tracing::info!("Backend URL: {}", config.backend.base_url);

    let backend = BackendClient::new(&config.backend).context("Failed to build backend client")?;
    let transport = chatrelay::build_transport(config.session.transport)
        .context("Failed to select messaging transport")?;

    SessionBootstrap::new(Arc::new(config), Arc::new(backend), transport)
        .run()
        .await
        .context("Session initialization failed")?;

    tracing::info!("chatrelay stopped");
    Ok(())
}

async fn health(config: &Config) -> anyhow::Result<()> {
    let backend = BackendClient::new(&config.backend).context("Failed to build backend client")?;
    let status = backend
        .health()
        .await
        .with_context(|| format!("Backend at {} is not reachable", backend.base_url()))?;

    println!(
        "{}: status={} chatbot={}",
        backend.base_url(),
        status.status,
        status.chatbot_status.as_deref().unwrap_or("-")
    );

    if !status.is_healthy() {
        anyhow::bail!("backend reports unhealthy state");
    }
    Ok(())
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    let rendered = config.to_toml().context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
