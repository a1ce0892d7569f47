mod cli;

use videometa::{
    config, maintenance,
    server::{self, auth},
    store::{DbMetaStore, MemoryMetaStore},
};
use videometa_db::pool::init_pool;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn open_db(path: &Path) -> Result<videometa_db::pool::DbPool> {
    let path_str = path.to_string_lossy();
    tracing::info!("Opening database at {}", path_str);
    Ok(init_pool(&path_str)?)
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    db: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(db) = db {
        config.server.db_path = db;
    }

    tracing::info!("Starting videometa server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let pool = open_db(&config.server.db_path)?;
    server::start_server(config, pool).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "videometa=trace,videometa_db=debug,videometa_common=debug,tower_http=debug".to_string()
        } else {
            "videometa=info,videometa_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port, db } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, db, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("videometa {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Fields => print_fields(),
        Commands::HashPassword { password } => hash_password(&password),
        Commands::GenerateApiKey => generate_api_key(),
        Commands::ConsolidateLengths { dry_run, db } => {
            consolidate_lengths(cli.config.as_deref(), db, dry_run)
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Database: {}", config.server.db_path.display());
            println!("  Auth enabled: {}", config.auth.enabled);
            println!("  Users: {}", config.auth.users.len());
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Database: {}", config.server.db_path.display());
        }
    }

    Ok(())
}

fn print_fields() -> Result<()> {
    let ext = videometa::init_extensions(Arc::new(MemoryMetaStore::new()));
    let out = json!({
        "fields": ext.fields.all(),
        "hooks": ext.hooks.registrations(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn hash_password(password: &str) -> Result<()> {
    let hash = auth::hash_password(password)?;
    println!("{}", hash);
    Ok(())
}

fn generate_api_key() -> Result<()> {
    let key = auth::generate_api_key();
    println!("{}", key);
    Ok(())
}

fn consolidate_lengths(
    config_path: Option<&Path>,
    db: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let db_path = db.unwrap_or(config.server.db_path);

    let pool = open_db(&db_path)?;
    let store = DbMetaStore::new(pool.clone());
    let report = maintenance::consolidate_lengths(&pool, &store, dry_run)?;

    let verb = if dry_run { "Would update" } else { "Updated" };
    println!("Scanned {} video items", report.scanned);
    println!("{} {} items", verb, report.updated.len());
    for id in &report.updated {
        println!("  {}", id);
    }
    if report.without_length > 0 {
        println!("{} items have no length", report.without_length);
    }

    Ok(())
}
