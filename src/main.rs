use std::net::SocketAddr;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use civic_api::config::{self, Environment};
use civic_api::database::DatabaseManager;
use civic_api::services::{generator_from_config, seed};
use civic_api::{app, AppState};

#[derive(Parser)]
#[command(name = "civic-api")]
#[command(about = "Civic engagement platform API server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Create the admin user and sample organization if missing")]
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("civic_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Migrate => migrate().await,
        Command::Seed => run_seed().await,
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting Civic API in {:?} mode", config.environment);

    if matches!(config.environment, Environment::Production) && config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET_KEY must be set in production");
    }

    let stores = DatabaseManager::open(&config.database)
        .await
        .context("failed to open database")?;
    let generator = generator_from_config(&config.ai).context("failed to build AI generator")?;
    let state = AppState::new(stores, generator);

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Civic API listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let config = config::config();
    let pool = DatabaseManager::connect_configured(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    println!("Migrations applied");
    Ok(())
}

async fn run_seed() -> anyhow::Result<()> {
    let config = config::config();
    let stores = DatabaseManager::open(&config.database).await?;
    let report = seed::seed(stores.store.as_ref()).await?;

    if report.created {
        println!("Seeded admin user {}", report.admin_email);
    } else {
        println!("Admin user {} already exists, nothing to do", report.admin_email);
    }
    Ok(())
}
