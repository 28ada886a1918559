// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP surface of the cert-manager webhook.
//!
//! cert-manager reaches solvers through the Kubernetes API aggregation layer.
//! The webhook serves, under the configured API group:
//!
//! | Method | Path                                   | Purpose                       |
//! |--------|----------------------------------------|-------------------------------|
//! | GET    | `/apis/{group}/v1alpha1`               | API discovery                 |
//! | POST   | `/apis/{group}/v1alpha1/{solverName}`  | `ChallengePayload` in and out |
//! | GET    | `/healthz`                             | Liveness/readiness            |
//! | GET    | `/metrics`                             | Prometheus metrics            |
//!
//! Solver failures are not HTTP errors: they are reported inside the payload
//! with `success: false` so cert-manager records the message on the Challenge.

use crate::config::WebhookConfig;
use crate::constants::{
    KIND_CHALLENGE_PAYLOAD, SHUTDOWN_GRACE_PERIOD_SECS, SOLVER_RESOURCE_VERSION,
    WEBHOOK_API_VERSION,
};
use crate::errors::SolverError;
use crate::metrics;
use crate::solver::{dispatch, ChallengeRequest, Solver};
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Envelope exchanged with cert-manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    /// Always `webhook.acme.cert-manager.io/v1alpha1`
    #[serde(default)]
    pub api_version: String,

    /// Always `ChallengePayload`
    #[serde(default)]
    pub kind: String,

    /// Challenge sent by cert-manager
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,

    /// Outcome filled in by the webhook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

/// Outcome of a challenge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    /// Request uid
    pub uid: String,
    /// Whether the solver succeeded
    pub success: bool,
    /// Failure details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FailureStatus>,
}

/// Kubernetes-style status describing a failed challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureStatus {
    /// Always `Failure`
    pub status: String,
    /// Error message
    pub message: String,
    /// Machine readable reason
    pub reason: String,
    /// 500 for transient failures, 400 otherwise
    pub code: u16,
}

impl ChallengeResponse {
    /// Successful response for `uid`.
    #[must_use]
    pub fn success(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            success: true,
            status: None,
        }
    }

    /// Failed response for `uid` describing `err`.
    #[must_use]
    pub fn failure(uid: &str, err: &SolverError) -> Self {
        let code = if err.is_transient() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        };

        Self {
            uid: uid.to_string(),
            success: false,
            status: Some(FailureStatus {
                status: "Failure".to_string(),
                message: err.to_string(),
                reason: err.status_reason().to_string(),
                code: code.as_u16(),
            }),
        }
    }
}

/// Shared state of the webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    group_name: Arc<str>,
    solvers: Arc<Vec<Arc<dyn Solver>>>,
}

impl WebhookState {
    /// State serving `solvers` under `group_name`.
    #[must_use]
    pub fn new(group_name: &str, solvers: Vec<Arc<dyn Solver>>) -> Self {
        Self {
            group_name: Arc::from(group_name),
            solvers: Arc::new(solvers),
        }
    }

    fn solver(&self, name: &str) -> Option<Arc<dyn Solver>> {
        self.solvers.iter().find(|s| s.name() == name).cloned()
    }
}

/// Build the webhook router.
pub fn router(state: WebhookState) -> Router {
    let base = format!("/apis/{}/{SOLVER_RESOURCE_VERSION}", state.group_name);

    Router::new()
        .route(&base, get(discovery))
        .route(&format!("{base}/{{solver}}"), post(solve))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

async fn discovery(State(state): State<WebhookState>) -> Json<APIResourceList> {
    let resources = state
        .solvers
        .iter()
        .map(|s| APIResource {
            name: s.name().to_string(),
            singular_name: s.name().to_string(),
            namespaced: false,
            kind: KIND_CHALLENGE_PAYLOAD.to_string(),
            verbs: vec!["create".to_string()],
            ..Default::default()
        })
        .collect();

    Json(APIResourceList {
        group_version: format!("{}/{SOLVER_RESOURCE_VERSION}", state.group_name),
        resources,
    })
}

async fn solve(
    State(state): State<WebhookState>,
    Path(solver_name): Path<String>,
    body: Bytes,
) -> Response {
    let Some(solver) = state.solver(&solver_name) else {
        warn!(solver = %solver_name, "Challenge for unknown solver");
        return (
            StatusCode::NOT_FOUND,
            format!("no solver named {solver_name:?} is registered"),
        )
            .into_response();
    };

    let payload: ChallengePayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Undecodable challenge payload");
            return (
                StatusCode::BAD_REQUEST,
                format!("invalid ChallengePayload: {e}"),
            )
                .into_response();
        }
    };

    let Some(request) = payload.request else {
        return (
            StatusCode::BAD_REQUEST,
            "ChallengePayload has no request".to_string(),
        )
            .into_response();
    };

    info!(
        uid = %request.uid,
        action = %request.action,
        fqdn = %request.resolved_fqdn,
        namespace = %request.resource_namespace,
        solver = %solver_name,
        "Handling challenge"
    );

    let start = Instant::now();
    let result = dispatch(solver.as_ref(), &request).await;
    metrics::record_challenge(request.action.as_str(), result.is_ok(), start.elapsed());

    let response = match result {
        Ok(()) => {
            info!(uid = %request.uid, action = %request.action, "Challenge handled");
            ChallengeResponse::success(&request.uid)
        }
        Err(e) => {
            error!(
                uid = %request.uid,
                action = %request.action,
                fqdn = %request.resolved_fqdn,
                reason = e.status_reason(),
                error = %e,
                "Challenge failed"
            );
            ChallengeResponse::failure(&request.uid, &e)
        }
    };

    Json(ChallengePayload {
        api_version: WEBHOOK_API_VERSION.to_string(),
        kind: KIND_CHALLENGE_PAYLOAD.to_string(),
        request: Some(request),
        response: Some(response),
    })
    .into_response()
}

async fn healthz() -> &'static str {
    "ok"
}

async fn metrics_endpoint() -> Response {
    match metrics::gather_metrics() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Wait for SIGTERM or SIGINT.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT"),
        () = terminate => info!("Received SIGTERM"),
    }
}

/// Serve the router until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the TLS material cannot be loaded or the listener fails.
pub async fn serve(config: &WebhookConfig, app: Router) -> Result<()> {
    let handle: Handle<SocketAddr> = Handle::new();

    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down webhook server");
        shutdown_handle.graceful_shutdown(Some(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)));
    });

    let service = app.into_make_service();

    match &config.tls {
        Some(tls) => {
            debug!(cert = %tls.cert.display(), key = %tls.key.display(), "Loading TLS material");
            let rustls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .context("Failed to load TLS certificate and key")?;

            info!(addr = %config.listen_addr, "Serving webhook over HTTPS");
            axum_server::bind_rustls(config.listen_addr, rustls_config)
                .handle(handle)
                .serve(service)
                .await
                .context("Webhook HTTPS server failed")?;
        }
        None => {
            warn!(addr = %config.listen_addr, "Serving webhook over plain HTTP, TLS is expected in production");
            axum_server::bind(config.listen_addr)
                .handle(handle)
                .serve(service)
                .await
                .context("Webhook HTTP server failed")?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod webhook_tests;
