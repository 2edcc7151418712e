mod config;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsift_server::{build_router, AppState};
use docsift_storage::{PersistenceSink, SqliteUploadStore, StorageConfig};
use docsift_upload::TempStorage;
use tracing::{info, warn};

use crate::config::RuntimeConfig;

#[derive(Debug, Parser)]
#[command(author, version, about = "PDF and CSV extraction service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Serve {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides `http.port`.
        #[arg(long, env = "PORT")]
        port: Option<u16>,
        /// Overrides `storage.sqlite_path` and turns persistence on.
        #[arg(long, env = "DOCSIFT_SQLITE_PATH")]
        sqlite_path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            config,
            port,
            sqlite_path,
        } => {
            let mut runtime = RuntimeConfig::load(config.as_deref())?;
            if let Some(port) = port {
                runtime.http.port = port;
            }
            if sqlite_path.is_some() {
                runtime.storage.sqlite_path = sqlite_path;
            }
            serve(runtime).await
        }
    }
}

async fn serve(config: RuntimeConfig) -> Result<()> {
    let temp = TempStorage::new(&config.uploads.temp_dir);
    temp.ensure_dir().await.with_context(|| {
        format!(
            "failed to create upload directory {}",
            config.uploads.temp_dir.display()
        )
    })?;

    let sink: Option<Arc<dyn PersistenceSink>> = match &config.storage.sqlite_path {
        Some(sqlite_path) => {
            let store = SqliteUploadStore::connect(&StorageConfig {
                sqlite_path: sqlite_path.clone(),
            })
            .await?;
            info!(sqlite_path = %sqlite_path, "persistence enabled");
            Some(Arc::new(store) as Arc<dyn PersistenceSink>)
        }
        None => {
            warn!("no sqlite_path configured: extracted content will not be persisted");
            None
        }
    };

    let state = AppState::new(temp, sink, config.server_config());
    let app = build_router(state);

    let bind = config.bind_address();
    let socket: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid socket address {}", bind))?;

    let listener = tokio::net::TcpListener::bind(socket)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;

    info!(
        bind = %bind,
        temp_dir = %config.uploads.temp_dir.display(),
        "docsiftd listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("axum server failed")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
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
    info!("shutdown signal received, draining in-flight uploads");
}
