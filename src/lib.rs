// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # ycdns-webhook - cert-manager DNS-01 solver for Yandex Cloud DNS
//!
//! This crate implements a cert-manager webhook that answers ACME DNS-01
//! challenges by managing TXT records in Yandex Cloud DNS.
//!
//! ## Overview
//!
//! cert-manager posts a `ChallengePayload` to the webhook for every challenge.
//! The solver decodes the issuer's config, reads the service account key from
//! a Kubernetes Secret, authenticates to Yandex Cloud IAM and adds or removes
//! the challenge value in the zone's TXT record set.
//!
//! ## Modules
//!
//! - [`config`] - Solver config, Yandex endpoints and startup configuration
//! - [`credentials`] - Service account keys and the Secrets holding them
//! - [`errors`] - Error types reported back to cert-manager
//! - [`solver`] - The solver contract and the Yandex Cloud solver
//! - [`webhook`] - HTTP routes and server
//! - [`yandex`] - IAM and Cloud DNS clients and record set logic
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ycdns_webhook::config::YandexEndpoints;
//! use ycdns_webhook::solver::{Solver, YandexCloudSolver};
//! use ycdns_webhook::webhook::{router, WebhookState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = kube::Client::try_default().await?;
//! let mut solver = YandexCloudSolver::new(YandexEndpoints::yandex_cloud()?);
//! solver.initialize(client).await?;
//!
//! let app = router(WebhookState::new("acme.example.com", vec![Arc::new(solver)]));
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod credentials;
pub mod errors;
pub mod metrics;
pub mod solver;
pub mod webhook;
pub mod yandex;

#[cfg(test)]
mod test_support;
