//! vmail server and admin commands

use actix_web::{web, HttpServer};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vmail_api::middleware::ApiKeyAuth;
use vmail_api::{create_app, AppState};
use vmail_core::repositories::{InMemoryVerificationRepository, VerificationRepository};
use vmail_core::services::verification::{
    MailDispatcherTrait, VerificationService, VerificationServiceConfig,
};
use vmail_infra::database::{DatabasePool, MySqlVerificationRepository};
use vmail_infra::mail::MailServiceAdapter;
use vmail_shared::config::{AppConfig, LogFormat, LoggingConfig};

#[derive(Parser)]
#[command(name = "vmail")]
#[command(about = "Email address verification service with one-time passcodes")]
struct Cli {
    /// Env file read before the VMAIL_* variables (default: .env)
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Create the record table
    Initialize,
    /// Delete every verification record
    Clear,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging);

    let store = if config.database.is_memory() { "memory" } else { "mysql" };
    info!(
        environment = %config.environment,
        store = store,
        mail_provider = %config.mail.provider,
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await,
        Commands::Initialize => initialize(&config).await,
        Commands::Clear => clear(&config).await,
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let mailer = Arc::new(MailServiceAdapter::from_config(&config.mail));
    info!(provider = mailer.provider_name(), "Mail provider ready");
    if !mailer.delivers_mail() && !config.environment.is_development() {
        warn!(
            environment = %config.environment,
            event = "mail_not_delivered",
            "Mock mail provider active outside development; no verification mail will be sent"
        );
    }

    if config.database.is_memory() {
        warn!("Using the in-memory record store; records are lost on restart");
        let repository = Arc::new(InMemoryVerificationRepository::new());
        return run_server(config, repository, mailer).await;
    }

    let pool = DatabasePool::new(config.database.clone()).await?;
    let repository = Arc::new(MySqlVerificationRepository::new(pool.get_pool().clone()));
    let result = run_server(config, repository, mailer).await;
    pool.close().await;
    result
}

async fn run_server<R, M>(
    config: &AppConfig,
    repository: Arc<R>,
    mailer: Arc<M>,
) -> anyhow::Result<()>
where
    R: VerificationRepository + 'static,
    M: MailDispatcherTrait + 'static,
{
    let service = VerificationService::new(
        repository,
        mailer,
        VerificationServiceConfig::from(&config.verification),
    );
    let app_state = web::Data::new(AppState::new(Arc::new(service)));
    let api_keys = ApiKeyAuth::from_config(&config.server);
    let bind_address = config.server.bind_address();

    let mut server = HttpServer::new(move || create_app(app_state.clone(), api_keys.clone()))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    info!(bind = %bind_address, "Starting vmail API server");
    server.bind(&bind_address)?.run().await?;
    info!("Server stopped");
    Ok(())
}

async fn initialize(config: &AppConfig) -> anyhow::Result<()> {
    if config.database.is_memory() {
        info!("In-memory record store needs no schema");
        return Ok(());
    }

    let pool = DatabasePool::new(config.database.clone()).await?;
    pool.initialize_schema().await?;
    pool.close().await;
    Ok(())
}

async fn clear(config: &AppConfig) -> anyhow::Result<()> {
    if config.database.is_memory() {
        info!(removed = 0, "In-memory record store starts empty, nothing to clear");
        return Ok(());
    }

    let pool = DatabasePool::new(config.database.clone()).await?;
    let service = VerificationService::new(
        Arc::new(MySqlVerificationRepository::new(pool.get_pool().clone())),
        Arc::new(MailServiceAdapter::from_config(&config.mail)),
        VerificationServiceConfig::from(&config.verification),
    );
    let removed = service.clear_all().await?;
    info!(removed = removed, "Cleared verification records");
    pool.close().await;
    Ok(())
}
