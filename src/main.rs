// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use kube::Client;
use std::sync::Arc;
use tracing::{debug, error, info};
use ycdns_webhook::{
    config::{Cli, WebhookConfig},
    constants::{SOLVER_NAME, SOLVER_RESOURCE_VERSION},
    metrics,
    solver::{Solver, YandexCloudSolver},
    webhook::{self, WebhookState},
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("ycdns-webhook")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn init_logging() {
    // Respects RUST_LOG, defaults to INFO.
    // RUST_LOG_FORMAT=json switches to structured output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging();

    // reqwest and axum-server are built without a default crypto provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let config = match WebhookConfig::try_from(cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e:#}");
            return Err(e);
        }
    };

    info!(
        group = %config.group_name,
        version = SOLVER_RESOURCE_VERSION,
        solver = SOLVER_NAME,
        addr = %config.listen_addr,
        "Starting cert-manager webhook for Yandex Cloud DNS"
    );

    metrics::init_metrics();

    debug!("Initializing Kubernetes client");
    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let mut solver = YandexCloudSolver::new(config.endpoints.clone());
    solver
        .initialize(client)
        .await
        .with_context(|| format!("Failed to initialize solver {SOLVER_NAME}"))?;

    let state = WebhookState::new(&config.group_name, vec![Arc::new(solver) as Arc<dyn Solver>]);
    let app = webhook::router(state);

    webhook::serve(&config, app).await?;

    info!("Webhook stopped");
    Ok(())
}
