// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::{
    api::{Api, DeleteParams, PostParams},
    client::Client,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use ycdns_webhook::credentials::SecretStore;
use ycdns_webhook::errors::SecretError;

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/sa_private_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/sa_public_key.pem");

pub const TEST_KEY_ID: &str = "ajeq9jfrgs7dnbd5bnmh";
pub const TEST_SERVICE_ACCOUNT_ID: &str = "ajelprpohp7r6bl9m5pe";

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([
                ("test".to_string(), "integration".to_string()),
                ("managed-by".to_string(), "ycdns-webhook-test".to_string()),
            ])),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            println!("Deleted test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Secret holding the fixture service account key.
pub fn authorized_key_secret(name: &str, namespace: &str) -> Secret {
    let data = BTreeMap::from(
        [
            ("id", TEST_KEY_ID),
            ("serviceAccountId", TEST_SERVICE_ACCOUNT_ID),
            ("encryption", "RSA_2048"),
            ("publicKey", TEST_PUBLIC_KEY),
            ("privateKey", TEST_PRIVATE_KEY),
        ]
        .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec()))),
    );

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

/// Create the fixture key Secret in a cluster
pub async fn create_authorized_key_secret(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    secrets
        .create(&PostParams::default(), &authorized_key_secret(name, namespace))
        .await?;
    println!("Created Secret: {namespace}/{name}");
    Ok(())
}

/// In-memory Secret store keyed by `namespace/name`.
#[derive(Default)]
pub struct MapSecretStore {
    secrets: HashMap<String, Secret>,
}

impl MapSecretStore {
    pub fn with_secret(mut self, secret: Secret) -> Self {
        let key = format!(
            "{}/{}",
            secret.metadata.namespace.clone().unwrap_or_default(),
            secret.metadata.name.clone().unwrap_or_default()
        );
        self.secrets.insert(key, secret);
        self
    }
}

#[async_trait]
impl SecretStore for MapSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, SecretError> {
        Ok(self.secrets.get(&format!("{namespace}/{name}")).cloned())
    }
}

/// A `ChallengePayload` as cert-manager sends it.
pub fn challenge_payload(
    uid: &str,
    action: &str,
    fqdn: &str,
    key: &str,
    namespace: &str,
    config: Value,
) -> Value {
    json!({
        "apiVersion": "webhook.acme.cert-manager.io/v1alpha1",
        "kind": "ChallengePayload",
        "request": {
            "uid": uid,
            "action": action,
            "type": "dns-01",
            "dnsName": fqdn.trim_start_matches("_acme-challenge.").trim_end_matches('.'),
            "key": key,
            "resourceNamespace": namespace,
            "resolvedFQDN": fqdn,
            "resolvedZone": fqdn.trim_start_matches("_acme-challenge."),
            "allowAmbientCredentials": false,
            "config": config
        }
    })
}
