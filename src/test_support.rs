// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared fixtures for unit tests.

use crate::credentials::SecretStore;
use crate::errors::SecretError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::{BTreeMap, HashMap};

pub const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/sa_private_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../tests/fixtures/sa_public_key.pem");
pub const OTHER_PUBLIC_KEY: &str = include_str!("../tests/fixtures/other_public_key.pem");

pub const TEST_KEY_ID: &str = "ajeq9jfrgs7dnbd5bnmh";
pub const TEST_SERVICE_ACCOUNT_ID: &str = "ajelprpohp7r6bl9m5pe";

/// Build a Secret from string pairs.
pub fn secret(name: &str, namespace: &str, pairs: &[(&str, &str)]) -> Secret {
    let data: BTreeMap<String, ByteString> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), ByteString(v.as_bytes().to_vec())))
        .collect();

    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}

/// A complete authorization key Secret built from the fixture keys.
pub fn authorized_key_secret(name: &str, namespace: &str) -> Secret {
    secret(
        name,
        namespace,
        &[
            ("id", TEST_KEY_ID),
            ("serviceAccountId", TEST_SERVICE_ACCOUNT_ID),
            ("encryption", "RSA_2048"),
            ("publicKey", TEST_PUBLIC_KEY),
            ("privateKey", TEST_PRIVATE_KEY),
        ],
    )
}

/// In-memory [`SecretStore`] keyed by `(namespace, name)`.
#[derive(Default)]
pub struct StaticSecretStore {
    secrets: HashMap<(String, String), Secret>,
    fail_with: Option<String>,
}

impl StaticSecretStore {
    pub fn with_secret(mut self, secret: Secret) -> Self {
        let namespace = secret.metadata.namespace.clone().unwrap_or_default();
        let name = secret.metadata.name.clone().unwrap_or_default();
        self.secrets.insert((namespace, name), secret);
        self
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            secrets: HashMap::new(),
            fail_with: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, SecretError> {
        if let Some(reason) = &self.fail_with {
            return Err(SecretError::SecretLookupFailed {
                secret_name: name.to_string(),
                namespace: namespace.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}
