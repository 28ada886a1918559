// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service account key resolution from Kubernetes Secrets.
//!
//! The authorization key Secret mirrors the JSON document `yc iam key create`
//! writes out:
//!
//! | Secret key         | Required | Content                               |
//! |--------------------|----------|---------------------------------------|
//! | `id`               | yes      | Authorized key id                     |
//! | `serviceAccountId` | yes      | Service account the key belongs to    |
//! | `encryption`       | no       | `RSA_2048` (default) or `RSA_4096`    |
//! | `publicKey`        | yes      | PEM public key                        |
//! | `privateKey`       | yes      | PEM private key                       |
//!
//! Secrets are read through the [`SecretStore`] trait so the resolver can be
//! exercised without a cluster.

use crate::constants::{
    SECRET_KEY_ENCRYPTION, SECRET_KEY_ID, SECRET_KEY_PRIVATE_KEY, SECRET_KEY_PUBLIC_KEY,
    SECRET_KEY_SERVICE_ACCOUNT_ID,
};
use crate::errors::SecretError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::fmt;
use tracing::debug;

/// Key algorithm of a service account authorized key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// 2048-bit RSA
    #[default]
    Rsa2048,
    /// 4096-bit RSA
    Rsa4096,
}

impl KeyAlgorithm {
    /// Map the `encryption` Secret value to an algorithm.
    ///
    /// Only `RSA_4096` selects the 4096-bit algorithm; any other value falls
    /// back to 2048-bit.
    #[must_use]
    pub fn from_secret_value(value: &str) -> Self {
        if value == "RSA_4096" {
            Self::Rsa4096
        } else {
            Self::Rsa2048
        }
    }

    /// Name as used by the Yandex Cloud IAM API.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsa2048 => "RSA_2048",
            Self::Rsa4096 => "RSA_4096",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorized key of a Yandex Cloud service account.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountKey {
    /// Authorized key id, sent as the JWT `kid`
    pub id: String,
    /// Service account id, sent as the JWT `iss`
    pub service_account_id: String,
    /// Key algorithm
    pub key_algorithm: KeyAlgorithm,
    /// PEM public key
    pub public_key: String,
    /// PEM private key
    pub private_key: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("id", &self.id)
            .field("service_account_id", &self.service_account_id)
            .field("key_algorithm", &self.key_algorithm)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Read access to namespaced Secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a Secret, `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::SecretLookupFailed`] if the lookup itself fails.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, SecretError>;
}

/// [`SecretStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    /// Wrap a Kubernetes client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, SecretError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name)
            .await
            .map_err(|e| SecretError::SecretLookupFailed {
                secret_name: name.to_string(),
                namespace: namespace.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Read one data key of a Secret as a UTF-8 string.
///
/// # Errors
///
/// Returns [`SecretError::KeyNotFound`] if the key is absent and
/// [`SecretError::InvalidKeyData`] if its value is not UTF-8.
pub fn fetch_key_from_secret(
    secret: &Secret,
    key: &str,
    secret_name: &str,
    namespace: &str,
) -> Result<String, SecretError> {
    let bytes = secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .ok_or_else(|| SecretError::KeyNotFound {
            key: key.to_string(),
            secret_name: secret_name.to_string(),
            namespace: namespace.to_string(),
        })?;

    String::from_utf8(bytes.0.clone()).map_err(|_| SecretError::InvalidKeyData {
        key: key.to_string(),
        secret_name: secret_name.to_string(),
        namespace: namespace.to_string(),
    })
}

/// Fetch the authorization key Secret and extract the service account key.
///
/// # Errors
///
/// Returns an error if the Secret cannot be fetched, does not exist, or lacks
/// any of `id`, `serviceAccountId`, `publicKey`, `privateKey`. A missing or
/// unreadable `encryption` key is not an error.
pub async fn resolve_service_account_key(
    store: &dyn SecretStore,
    secret_name: &str,
    namespace: &str,
) -> Result<ServiceAccountKey, SecretError> {
    debug!(secret = %secret_name, namespace = %namespace, "Fetching authorization key secret");

    let secret = store
        .get_secret(namespace, secret_name)
        .await?
        .ok_or_else(|| SecretError::SecretNotFound {
            secret_name: secret_name.to_string(),
            namespace: namespace.to_string(),
        })?;

    let id = fetch_key_from_secret(&secret, SECRET_KEY_ID, secret_name, namespace)?;
    let service_account_id =
        fetch_key_from_secret(&secret, SECRET_KEY_SERVICE_ACCOUNT_ID, secret_name, namespace)?;
    let key_algorithm =
        fetch_key_from_secret(&secret, SECRET_KEY_ENCRYPTION, secret_name, namespace)
            .map(|value| KeyAlgorithm::from_secret_value(&value))
            .unwrap_or_default();
    let public_key = fetch_key_from_secret(&secret, SECRET_KEY_PUBLIC_KEY, secret_name, namespace)?;
    let private_key =
        fetch_key_from_secret(&secret, SECRET_KEY_PRIVATE_KEY, secret_name, namespace)?;

    Ok(ServiceAccountKey {
        id,
        service_account_id,
        key_algorithm,
        public_key,
        private_key,
    })
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod credentials_tests;
