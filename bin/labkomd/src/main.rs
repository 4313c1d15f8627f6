//! `labkomd` — the lab-resource request service.
//!
//! Usage:
//!   labkomd -c <context-name-or-path> [--listen <addr>]
//!   labkomd --hash-password <password>
//!
//! The context name resolves to `/etc/labkom/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod middleware;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use labkom_agenda::AgendaModule;
use labkom_auth::AuthModule;
use labkom_auth::service::AuthConfig;
use labkom_core::{LogNotifier, Module, Notifier};
use labkom_lab::LabModule;
use labkom_lab::policy::Policy;
use labkom_lab::worker::SweepConfig;

use config::ServerConfig;

/// Lab request service.
#[derive(Parser, Debug)]
#[command(name = "labkomd", about = "Lab-resource request service")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Hash a password for the [admin] config section, then exit.
    #[arg(long = "hash-password", value_name = "PASSWORD")]
    hash_password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Some(password) = &cli.hash_password {
        println!("{}", bootstrap::hash_password(password)?);
        return Ok(());
    }

    let context = cli
        .config
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--config is required (or use --hash-password)"))?;

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(context);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = labkom_core::ServiceConfig {
        data_dir: Some(data_dir.clone()),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    // Embedded stores, shared by all modules. The KV overlay gets the
    // read-only reference YAML files before anything reads from it.
    let redb = labkom_kv::RedbStore::open(&core_config.resolve_db_path())
        .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?;
    let overlay = labkom_kv::OverlayKV::new(redb);
    let loaded = labkom_kv::FileLoader::load(&core_config.resolve_reference_dir(), &overlay)
        .map_err(|e| anyhow::anyhow!("failed to load reference data: {}", e))?;
    info!("Loaded {} reference entries", loaded);
    let kv: Arc<dyn labkom_kv::KVStore> = Arc::new(overlay);

    let sql: Arc<dyn labkom_sql::SQLStore> = Arc::new(
        labkom_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    let blob: Arc<dyn labkom_blob::BlobStore> = Arc::new(
        labkom_blob::FileStore::open(&core_config.resolve_blob_dir())
            .map_err(|e| anyhow::anyhow!("failed to open blob store: {}", e))?,
    );

    // ── Modules ──

    let auth_config = AuthConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        token_ttl_secs: server_config.jwt.expire_secs,
    };
    let auth_module = AuthModule::new(Arc::clone(&sql), auth_config)?;
    if auth_module.service().seed_admin(
        &server_config.admin.email,
        &server_config.admin.nama,
        &server_config.admin.password_hash,
    )? {
        info!("Bootstrap admin account created");
    }
    info!("Auth module initialized");

    let mut sweep_config = SweepConfig::default();
    if let Some(secs) = server_config.server.sweep_interval_secs {
        sweep_config.sweep_interval = secs;
    }
    let lab_module = LabModule::with_config(
        Arc::clone(&sql),
        Arc::clone(&kv),
        Arc::clone(&blob),
        sweep_config,
    )?;
    info!("Lab module initialized");

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let agenda_module = AgendaModule::new(Arc::clone(&sql), notifier)?;
    info!("Agenda module initialized");

    let module_routes = vec![
        (auth_module.name(), auth_module.routes()),
        (lab_module.name(), lab_module.routes()),
        (agenda_module.name(), agenda_module.routes()),
    ];

    // Per-request deadline: TOML override, else the policy file.
    let policy = Policy::load(kv.as_ref());
    let request_timeout = Duration::from_secs(
        server_config
            .server
            .request_timeout_secs
            .unwrap_or(policy.request_timeout_secs),
    );

    let app = routes::build_router(
        Arc::clone(auth_module.service()),
        module_routes,
        request_timeout,
    );

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("labkomd listening on {}", cli.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    lab_module.shutdown();
    info!("labkomd stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }
}
