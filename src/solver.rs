// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The cert-manager DNS-01 solver contract and its Yandex Cloud implementation.
//!
//! cert-manager hands every challenge to a named solver with `Present` or
//! `CleanUp`. [`Solver`] mirrors that contract; [`YandexCloudSolver`] resolves
//! the per-issuer config and Secret into a [`YandexCloudDnsProvider`] and lets
//! it mutate the TXT record set.
//!
//! `Present` must tolerate being called several times with the same key, and
//! `CleanUp` must only remove the record value matching the request's key so
//! that concurrent validations of the same name do not interfere.

use crate::config::{SolverConfig, YandexEndpoints};
use crate::constants::SOLVER_NAME;
use crate::credentials::{resolve_service_account_key, KubeSecretStore, SecretStore};
use crate::errors::SolverError;
use crate::yandex::YandexCloudDnsProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Action requested by cert-manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeAction {
    /// Create the challenge record
    Present,
    /// Remove the challenge record
    CleanUp,
}

impl ChallengeAction {
    /// Wire name of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::CleanUp => "CleanUp",
        }
    }
}

impl fmt::Display for ChallengeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS-01 challenge as sent by cert-manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Request id, echoed in the response
    #[serde(default)]
    pub uid: String,

    /// `Present` or `CleanUp`
    pub action: ChallengeAction,

    /// Challenge type, always `dns-01` for this solver
    #[serde(rename = "type", default)]
    pub challenge_type: String,

    /// Domain being validated
    #[serde(default)]
    pub dns_name: String,

    /// TXT record value
    #[serde(default)]
    pub key: String,

    /// Namespace to read referenced Secrets from
    #[serde(default)]
    pub resource_namespace: String,

    /// Fully qualified name of the TXT record
    #[serde(rename = "resolvedFQDN", default)]
    pub resolved_fqdn: String,

    /// Zone the record lives in, as resolved by cert-manager
    #[serde(default)]
    pub resolved_zone: String,

    /// Whether ambient credentials may be used
    #[serde(default)]
    pub allow_ambient_credentials: bool,

    /// Solver config from the issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// A DNS-01 solver served by the webhook.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Solver name, unique within the webhook's API group.
    fn name(&self) -> &str;

    /// Create the challenge record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be presented.
    async fn present(&self, request: &ChallengeRequest) -> Result<(), SolverError>;

    /// Remove the challenge record matching the request key.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be removed.
    async fn cleanup(&self, request: &ChallengeRequest) -> Result<(), SolverError>;

    /// Called once at startup with a Kubernetes client.
    ///
    /// # Errors
    ///
    /// Returns an error if the solver cannot be initialized.
    async fn initialize(&mut self, client: kube::Client) -> Result<(), SolverError>;
}

/// Run the action a request asks for.
///
/// # Errors
///
/// Returns the solver's error.
pub async fn dispatch(solver: &dyn Solver, request: &ChallengeRequest) -> Result<(), SolverError> {
    match request.action {
        ChallengeAction::Present => solver.present(request).await,
        ChallengeAction::CleanUp => solver.cleanup(request).await,
    }
}

/// DNS-01 solver for Yandex Cloud DNS.
pub struct YandexCloudSolver {
    endpoints: YandexEndpoints,
    secrets: Option<Arc<dyn SecretStore>>,
}

impl YandexCloudSolver {
    /// Create an uninitialized solver.
    #[must_use]
    pub fn new(endpoints: YandexEndpoints) -> Self {
        Self {
            endpoints,
            secrets: None,
        }
    }

    /// Use `store` for Secret lookups instead of the Kubernetes API.
    #[must_use]
    pub fn with_secret_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(store);
        self
    }

    /// Build the provider for a challenge from its config and Secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the solver has no Secret
    /// store yet, the Secret is missing or incomplete, or the key is rejected.
    pub async fn provider_for(
        &self,
        request: &ChallengeRequest,
    ) -> Result<YandexCloudDnsProvider, SolverError> {
        let cfg = SolverConfig::load(request.config.as_ref())?;
        cfg.validate()?;

        let store = self
            .secrets
            .as_deref()
            .ok_or_else(|| SolverError::NotInitialized {
                solver: SOLVER_NAME.to_string(),
            })?;

        let key = resolve_service_account_key(
            store,
            &cfg.authorization_key_secret_name,
            &request.resource_namespace,
        )
        .await?;

        debug!(
            zone_id = %cfg.dns_zone_id,
            key_id = %key.id,
            key_algorithm = %key.key_algorithm,
            "Resolved service account key"
        );

        Ok(YandexCloudDnsProvider::new(
            &cfg.dns_zone_id,
            &key,
            self.endpoints.clone(),
        )?)
    }
}

#[async_trait]
impl Solver for YandexCloudSolver {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    async fn present(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        let provider = self.provider_for(request).await?;
        provider.present(&request.resolved_fqdn, &request.key).await
    }

    async fn cleanup(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        let provider = self.provider_for(request).await?;
        provider.cleanup(&request.resolved_fqdn, &request.key).await
    }

    async fn initialize(&mut self, client: kube::Client) -> Result<(), SolverError> {
        info!(solver = SOLVER_NAME, "Initializing solver with Kubernetes client");
        self.secrets = Some(Arc::new(KubeSecretStore::new(client)));
        Ok(())
    }
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod solver_tests;
