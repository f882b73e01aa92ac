use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use invitations::config::InvitationsConfig;
use invitations::infra::mail::email_enabled;
use invitations::Invitations;
use mimalloc::MiMalloc;
use modkit::HttpLayers;
use runtime::{absolutize_sqlite_dsn, AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MODULE_NAME: &str = "invitations";

/// Invite Server - event invitations with RSVP tracking
#[derive(Parser)]
#[command(name = "invite-server")]
#[command(about = "Invite Server - event invitations with RSVP tracking")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config and $PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    /// Dotenv file with SMTP credentials and BASE_URL
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_loaded = runtime::load_dotenv(&cli.env_file)?;

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // defaults -> YAML -> APP__* -> flat env (PORT) -> CLI
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_env_overrides(|k| std::env::var(k).ok());
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(env_loaded, "Invite Server starting");

    let module_config = invitations_config(&config)?;

    if cli.print_config {
        println!("{}", config.to_redacted_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, module_config, args).await,
        Commands::Check => check_config(&config, &module_config),
    }
}

/// Module section of the config with the flat `.env` variables laid over it.
fn invitations_config(config: &AppConfig) -> Result<InvitationsConfig> {
    let mut module: InvitationsConfig = config.module_config(MODULE_NAME)?;
    module.apply_env_overrides(|k| std::env::var(k).ok())?;
    module.validate()?;
    Ok(module)
}

async fn connect_database(
    db_config: Option<&DatabaseConfig>,
    home_dir: &Path,
    mock: bool,
) -> Result<DatabaseConnection> {
    let dsn = match (mock, db_config) {
        (true, _) => "sqlite::memory:".to_string(),
        (false, Some(db)) => absolutize_sqlite_dsn(db.url.trim(), home_dir, true)?,
        (false, None) => anyhow::bail!("Database URL not configured"),
    };

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if mock {
        // every pooled connection would otherwise see its own empty database
        opts.max_connections(1).min_connections(1);
    } else if let Some(db) = db_config {
        opts.max_connections(db.max_conns.unwrap_or(10));
        let busy = Duration::from_millis(u64::from(db.busy_timeout_ms.unwrap_or(5_000)));
        opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy));
    }

    tracing::info!("Connecting to database: {}", dsn);
    Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {dsn}"))
}

fn static_dir(config: &AppConfig) -> PathBuf {
    let dir = PathBuf::from(&config.server.static_dir);
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "static directory not found; /static will return 404");
    }
    dir
}

async fn run_server(config: AppConfig, module_config: InvitationsConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let home_dir = PathBuf::from(&config.server.home_dir);
    let db = connect_database(config.database.as_ref(), &home_dir, args.mock).await?;
    let module = Invitations::init(db, &module_config).await?;

    let layers = HttpLayers::from_timeout_secs(config.server.timeout_sec)
        .with_cors(config.server.cors_enabled);
    let router = layers.apply(module.register_rest(&static_dir(&config)));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = modkit::wait_for_shutdown().await {
            tracing::error!(error = %e, "signal handler failed");
        }
        trigger.cancel();
    });

    println!("Visit: {}", module_config.base_url);
    modkit::serve(router, addr, cancel).await
}

fn check_config(config: &AppConfig, module_config: &InvitationsConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    println!("Configuration check passed");
    println!(
        "Email notifications: {}",
        if email_enabled(module_config) { "enabled" } else { "disabled" }
    );
    println!("{}", config.to_redacted_yaml()?);
    Ok(())
}
