use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pizza_restaurant_service::{connect, handlers::create_router, handlers::AppState, seed};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "DATABASE_URL", default_value = "app.db", global = true)]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "PORT", default_value_t = 5555)]
        port: u16,
    },
    /// Replace all data with the sample restaurants and pizzas
    Seed,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let pool = connect(&cli.database_url)?;

    match cli.command {
        Commands::Serve { host, port } => {
            let app = create_router(AppState::new(pool));

            let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
            info!("Pizza restaurants API listening on {}", listener.local_addr()?);

            axum::serve(listener, app).await?;
        }
        Commands::Seed => {
            let mut conn = pool.get()?;
            seed::seed(&mut conn)?;
        }
    }

    Ok(())
}
