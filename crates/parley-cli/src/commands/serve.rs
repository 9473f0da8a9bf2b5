//! Web server command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use parley_core::{Config, DashScopeClient, Hub, TextGenerator};
use parley_web::AppState;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// TOML configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Keep everything in memory instead of Redis
    #[arg(long)]
    pub memory: bool,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (default: logs/parley.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let (db, storage) = if args.memory {
        (parley_db::in_memory(), "memory".to_string())
    } else {
        let pool = parley_db::init_pool(&config.redis.url)
            .await
            .with_context(|| format!("Failed to connect to Redis at {}", config.redis.url))?;
        (pool, "redis".to_string())
    };

    if config.generation.api_key.is_empty() {
        tracing::warn!("DASHSCOPE_API_KEY is not set, agent turns will use fallback replies");
    }
    let client = DashScopeClient::new(&config.generation);
    let model = client.model().to_string();
    let generator: Arc<dyn TextGenerator> = Arc::new(client);

    let hub = Hub::new(config.hub);
    let state = AppState::new(db, hub, generator, &config.discussion);

    let host = config.server.host.as_str();
    let port = config.server.port;

    println!();
    println!("  {} {}", "Parley".cyan().bold(), "Discussion Server".bold());
    println!();
    println!("  {}        http://{}:{}/api", "API".green(), host, port);
    println!("  {}  ws://{}:{}/api/ws/{{room_id}}", "WebSocket".green(), host, port);
    println!("  {}    {}", "Storage".green(), storage);
    println!("  {}      {}", "Model".green(), model);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    parley_web::run_server(state, host, port).await?;

    Ok(())
}
