use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use hearth::{
    config::{self, HearthConfig},
    db, events, observability, retention,
};
use uuid::Uuid;

/// Name of the config file looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "hearth.toml";

/// CLI arguments for hearth
#[derive(Parser, Debug)]
#[command(version, about = "Household maintenance jobs", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./hearth.toml if it exists)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run the retention worker until interrupted (default)
    Serve,
    /// Prune old checked shopping-list items once and exit
    PruneCheckedItems {
        /// Only prune lists of this group (defaults to every group)
        #[arg(long)]
        group: Option<Uuid>,
        /// Override the number of checked items kept per list
        #[arg(long)]
        max_checked_items: Option<usize>,
    },
    /// Run database migrations and exit
    Migrate,
    /// Export the JSON schema for the configuration file
    Schema {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Schema { output }) => {
            #[cfg(feature = "json-schema")]
            run_schema_export(output);
            #[cfg(not(feature = "json-schema"))]
            {
                let _ = output;
                eprintln!("Error: JSON schema export requires the 'json-schema' feature");
                std::process::exit(1);
            }
        }
        Some(Command::Migrate) => {
            run_migrate(args.config.as_deref()).await;
        }
        Some(Command::PruneCheckedItems {
            group,
            max_checked_items,
        }) => {
            run_prune(args.config.as_deref(), group, max_checked_items).await;
        }
        Some(Command::Serve) | None => {
            run_server(args.config.as_deref()).await;
        }
    }
}

/// Find the config file to load, if any.
///
/// An explicit path must exist. Without one, `./hearth.toml` is used when
/// present; otherwise the built-in defaults apply.
fn resolve_config_path(explicit_path: Option<&str>) -> Result<Option<PathBuf>, String> {
    if let Some(path) = explicit_path {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()));
        }
        return Ok(Some(path));
    }

    let cwd_config = PathBuf::from(DEFAULT_CONFIG_FILE);
    if cwd_config.exists() {
        return Ok(Some(cwd_config));
    }

    Ok(None)
}

/// Load the config and start logging, exiting the process on failure.
fn load_config(explicit_path: Option<&str>) -> (HearthConfig, observability::TracingGuard) {
    let config_path = match resolve_config_path(explicit_path) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = match &config_path {
        Some(path) => match HearthConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => HearthConfig::default(),
    };

    let guard = match observability::init_tracing(&config.observability) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match &config_path {
        Some(path) => tracing::info!(config_file = %path.display(), "Loaded configuration"),
        None => tracing::info!("No config file found, using defaults"),
    }

    (config, guard)
}

/// Connect to the configured database, running migrations when enabled.
async fn connect_database(config: &config::DatabaseConfig) -> db::DbPool {
    if config.is_none() {
        eprintln!("Error: Database is not configured. Add a [database] section to the config.");
        std::process::exit(1);
    }

    let pool = match db::DbPool::from_config(config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if config.run_migrations()
        && let Err(e) = pool.run_migrations().await
    {
        tracing::error!(error = %e, "Database migrations failed");
        eprintln!("Error: Database migrations failed: {}", e);
        std::process::exit(1);
    }

    pool
}

async fn run_server(explicit_config_path: Option<&str>) {
    let (config, _tracing_guard) = load_config(explicit_config_path);

    if let Err(e) = observability::metrics::init_metrics(&config.observability.metrics) {
        tracing::error!(error = %e, "Failed to initialize metrics");
        std::process::exit(1);
    }

    let db = Arc::new(connect_database(&config.database).await);
    let event_bus = Arc::new(events::EventBus::new());

    let worker = tokio::spawn(retention::start_retention_worker(
        db,
        event_bus,
        config.retention.clone(),
    ));

    shutdown_signal().await;

    tracing::info!("Shutdown signal received, stopping retention worker");
    worker.abort();
}

async fn run_prune(
    explicit_config_path: Option<&str>,
    group_id: Option<Uuid>,
    max_checked_items: Option<usize>,
) {
    let (config, _tracing_guard) = load_config(explicit_config_path);
    let db = connect_database(&config.database).await;
    let event_bus = Arc::new(events::EventBus::new());
    let max_checked_items = max_checked_items.unwrap_or(config.retention.max_checked_items);

    match retention::delete_old_checked_list_items(&db, event_bus, group_id, max_checked_items)
        .await
    {
        Ok(result) => {
            tracing::info!(
                groups = result.groups_scanned,
                lists = result.lists_scanned,
                lists_trimmed = result.lists_trimmed,
                items_deleted = result.items_deleted,
                "Pruned checked shopping-list items"
            );
            println!(
                "Deleted {} checked item(s) from {} list(s)",
                result.items_deleted, result.lists_trimmed
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Pruning checked items failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let (config, _tracing_guard) = load_config(explicit_config_path);

    if config.database.is_none() {
        eprintln!("Error: Database is not configured. Nothing to migrate.");
        std::process::exit(1);
    }

    tracing::info!("Running database migrations");

    match db::DbPool::from_config(&config.database).await {
        Ok(pool) => match pool.run_migrations().await {
            Ok(()) => {
                tracing::info!("Database migrations completed successfully");
            }
            Err(e) => {
                tracing::error!(error = %e, "Database migrations failed");
                eprintln!("Error: Database migrations failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "json-schema")]
fn run_schema_export(output: Option<String>) {
    let content = match HearthConfig::json_schema_string() {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error: Failed to serialize config schema: {}", e);
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &content) {
                eprintln!("Error: Failed to write to {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Config JSON schema written to {}", path);
        }
        None => {
            println!("{}", content);
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
