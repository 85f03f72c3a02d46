use clap::Parser;
use mizan::config::{Config, ConfigManager, ConfigValidator};
use mizan::http_server::HttpServer;
use mizan::store::{DatabasePool, Store};
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "mizan")]
#[command(about = "Mizan multi-tenant expense management API")]
#[command(version)]
enum Cli {
    /// Start the API server
    Serve(ServeArgs),
    /// Apply database migrations and exit
    Migrate(MigrateArgs),
    /// Print the configuration JSON schema
    ConfigSchema,
}

#[derive(Parser)]
struct ServeArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "~/.config/mizan/config.yaml")]
    config: String,
    /// Host to bind to (overrides config)
    #[arg(short = 'H', long)]
    host: Option<String>,
    /// Port to bind to (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Parser)]
struct MigrateArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "~/.config/mizan/config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli {
        Cli::Serve(args) => {
            if args.json_logs {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(&args.log_level)
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(&args.log_level)
                    .init();
            }

            // The manager stays alive so config hot reload keeps working.
            let (mut config, _config_manager) = load_config(&args.config).await?;

            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }

            match ConfigValidator::new().validate(&config) {
                Ok(warnings) => {
                    for warning in warnings {
                        warn!("{}", warning);
                    }
                }
                Err(errors) => {
                    for e in &errors {
                        error!("{}", e);
                    }
                    anyhow::bail!("invalid configuration");
                }
            }

            let store = open_store(&config).await?;

            info!(
                "Starting Mizan server on {}:{}",
                config.server.host, config.server.port
            );

            let server = HttpServer::new(config, store);
            server.run().await?;
        }
        Cli::Migrate(args) => {
            tracing_subscriber::fmt().with_env_filter("info").init();

            let (config, _config_manager) = load_config(&args.config).await?;
            let _store = open_store(&config).await?;
            info!("Migrations applied");
        }
        Cli::ConfigSchema => {
            println!("{}", ConfigValidator::new().export_schema());
        }
    }

    Ok(())
}

/// Load the config file if it exists; otherwise fall back to defaults.
/// The returned manager (when present) watches the file for changes.
async fn load_config(path: &str) -> anyhow::Result<(Config, Option<ConfigManager>)> {
    let expanded = shellexpand::tilde(path).to_string();

    if !Path::new(&expanded).exists() {
        warn!("Config file {} not found, using defaults", expanded);
        return Ok((Config::default(), None));
    }

    let manager = ConfigManager::new(&expanded).await?;
    let config = manager.get_config();
    Ok((config, Some(manager)))
}

/// Open the database pool (running migrations) and wrap it in a store.
async fn open_store(config: &Config) -> anyhow::Result<Store> {
    let db_path = shellexpand::tilde(&config.database.path).to_string();
    let pool = DatabasePool::new(Path::new(&db_path), config.database.max_connections).await?;
    Ok(Store::new(pool.pool().clone()))
}
