mod cli;
mod server;

use std::sync::Arc;

use clap::Parser;
use eyre::WrapErr;

use ocrlabel_core::{LabelStore, StoreConfig};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    // The data directory must exist before anything is served; a missing
    // label index is reconciled from sidecars here.
    let store = LabelStore::open(&StoreConfig {
        data_dir: args.data_dir.clone(),
        label_file: args.label_file.clone(),
    })
    .wrap_err_with(|| {
        format!(
            "open data directory `{}` (create it or set DATA_DIR)",
            args.data_dir.display()
        )
    })?;

    tracing::info!(
        data_dir = %store.root().display(),
        index = %store.index_path().display(),
        "label store ready"
    );

    let bind_addr = format!("{}:{}", args.bind, args.port);
    let allowed_origins = std::iter::once(format!("http://{bind_addr}"))
        .chain(args.cors_origin.iter().cloned())
        .map(|origin| {
            origin
                .parse::<axum::http::HeaderValue>()
                .wrap_err_with(|| format!("invalid CORS origin `{origin}`"))
        })
        .collect::<eyre::Result<Vec<_>>>()?;

    let data_dir = store.root().display().to_string();
    let state = server::AppState {
        store: Arc::new(store),
    };
    let router = server::build_router(state, allowed_origins);

    if args.bind == "0.0.0.0" {
        tracing::warn!("server is bound to 0.0.0.0; it is accessible from the network");
    }

    println!();
    println!("  ocrlabel is running:");
    println!("    URL:       http://{bind_addr}");
    println!("    Data dir:  {data_dir}");
    println!();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("bind TCP listener")?;

    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("run HTTP server")?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => {
            // Without a signal handler, keep serving until the process is killed.
            tracing::error!(error = %err, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    }
}
