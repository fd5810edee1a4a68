//! Prefill service binary.
//!
//! Wires the layers together: settings → store (+migrations) → resolver
//! coordinator → event bridges → Axum server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use prefill_resolver::{Coordinator, ResolverEvent};
use prefill_server::broadcast::BroadcastManager;
use prefill_server::event_bridge::{spawn_resolution_bridge, spawn_store_bridge};
use prefill_server::{AppState, ServerConfig, serve};
use prefill_settings::{LoggingSettings, PrefillSettings};
use prefill_store::{ConnectionConfig, EntryStore, new_file, run_migrations};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "prefill", version, about = "Local companion service for the Prefill extension")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the companion service (the default when no command is given).
    Serve(ServeArgs),
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Bind address (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Entry database path (overrides settings).
    #[arg(long)]
    db: Option<PathBuf>,

    /// Emit JSON log lines.
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Command::Serve(args) = cli.command.unwrap_or(Command::Serve(ServeArgs::default()));

    let settings = prefill_settings::get_settings();
    init_logging(&settings.logging, args.json_logs);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?
        .block_on(run(args, &settings))
}

fn init_logging(settings: &LoggingSettings, force_json: bool) {
    let filter =
        EnvFilter::try_from_env("PREFILL_LOG").unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if force_json || settings.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(args: ServeArgs, settings: &PrefillSettings) -> anyhow::Result<()> {
    let db_path = resolve_db_path(&args, settings)?;
    info!(db = %db_path.display(), "opening entry database");

    let pool = new_file(
        db_path.to_str().context("database path is not valid UTF-8")?,
        &ConnectionConfig {
            pool_size: settings.storage.pool_size,
            ..Default::default()
        },
    )?;
    {
        let conn = pool.get()?;
        let _ = run_migrations(&conn)?;
    }
    let store = Arc::new(EntryStore::new(pool));

    let capacity = settings.resolver.channel_capacity;
    let coordinator = Coordinator::spawn_with_capacity(capacity, capacity);
    let broadcast = Arc::new(BroadcastManager::new());
    let _ = spawn_store_bridge(&store, coordinator.clone());
    let _ = spawn_resolution_bridge(&coordinator, Arc::clone(&broadcast));

    // Seed the resolver with the current collection so the first page
    // visit resolves against real data, not an empty cache.
    let initial = store.list()?;
    info!(entries = initial.len(), "seeding resolver snapshot");
    if !coordinator.send(ResolverEvent::EntriesChanged(initial)).await {
        anyhow::bail!("resolver task failed to start");
    }

    let state = AppState {
        broadcast,
        coordinator,
        store,
        start_time: Instant::now(),
        metrics: prefill_server::metrics::install_recorder(),
    };

    let config = ServerConfig {
        host: args.host.unwrap_or_else(|| settings.server.host.clone()),
        port: args.port.unwrap_or(settings.server.ws_port),
    };

    tokio::select! {
        result = serve(&config, state) => result.context("server exited"),
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}

fn resolve_db_path(args: &ServeArgs, settings: &PrefillSettings) -> anyhow::Result<PathBuf> {
    let path = match &args.db {
        Some(path) => path.clone(),
        None if !settings.storage.db_path.is_empty() => {
            PathBuf::from(&settings.storage.db_path)
        }
        None => prefill_settings::default_db_path(),
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(path)
}
