//! fidorev-server - FIDO Data Cleanliness Review Portal
//!
//! Ingests tabular data pulls, queues them by priority, walks a reviewer
//! through each row alongside an AI-generated suggestion, and exports
//! the cleaned dataset.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use fidorev_server::services::suggestion_client::ChatSuggestionClient;
use fidorev_server::AppState;

#[derive(Debug, Parser)]
#[command(name = "fidorev-server", version, about = "FIDO data cleanliness review portal")]
struct Args {
    /// Data folder holding the portal database
    #[arg(long)]
    data_folder: Option<String>,

    /// Address to listen on
    #[arg(long, env = "FIDOREV_BIND", default_value = "127.0.0.1:5731")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting fidorev-server (FIDO review portal)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve data folder and open (or create) the database
    let data_folder =
        fidorev_common::config::resolve_data_folder(args.data_folder.as_deref(), "FIDOREV_DATA");
    let db_path = fidorev_common::config::ensure_data_folder(&data_folder)
        .map_err(|e| anyhow::anyhow!("Failed to initialize data folder: {}", e))?;
    info!("Database: {}", db_path.display());

    let db = fidorev_server::db::init_pool(&db_path).await?;
    info!("Database connection established");

    // Suggestion endpoint settings: Database → ENV → TOML
    let toml_config = fidorev_common::config::load_toml_config()
        .map_err(|e| anyhow::anyhow!("Failed to load TOML config: {}", e))?;
    let suggest = fidorev_server::config::resolve_suggest_settings(&db, &toml_config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to resolve suggestion settings: {}", e))?;

    let suggester = ChatSuggestionClient::new(
        suggest.api_key.clone(),
        suggest.base_url.clone(),
        suggest.model.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create suggestion client: {}", e))?;

    // Create application state and router
    let state = AppState::new(db, Arc::new(suggester), suggest.timeout);
    let app = fidorev_server::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("Listening on http://{}", args.bind);
    info!("Health check: http://{}/health", args.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
