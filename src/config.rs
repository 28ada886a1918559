// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Solver and webhook configuration.
//!
//! Two kinds of configuration exist:
//!
//! - [`SolverConfig`] - decoded per challenge from the `config` blob on the ACME
//!   issuer's webhook solver stanza
//! - [`WebhookConfig`] - process startup configuration, parsed once from the
//!   command line and environment in `main` and injected from there
//!
//! # Example
//!
//! ```rust
//! use ycdns_webhook::config::SolverConfig;
//!
//! let raw = serde_json::json!({
//!     "dnsZoneId": "dns-zone-id",
//!     "authorizationKeySecretName": "yc-key",
//! });
//! let cfg = SolverConfig::load(Some(&raw)).unwrap();
//! cfg.validate().unwrap();
//! assert_eq!(cfg.dns_zone_id, "dns-zone-id");
//! ```

use crate::constants::{
    DEFAULT_DNS_ENDPOINT, DEFAULT_IAM_ENDPOINT, DEFAULT_LISTEN_ADDR, ENV_GROUP_NAME,
};
use crate::errors::ConfigError;
use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

/// Per-issuer solver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    /// Yandex Cloud DNS zone id hosting the challenge records
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dns_zone_id: String,

    /// Name of the Secret holding the service account authorized key
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authorization_key_secret_name: String,
}

/// A JSON `null` string field decodes as empty so validation reports it missing.
fn null_as_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl SolverConfig {
    /// Decode the config blob of a challenge request.
    ///
    /// A missing blob yields an empty config; validation rejects it afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] if the blob is not a config object.
    pub fn load(raw: Option<&serde_json::Value>) -> Result<Self, ConfigError> {
        let Some(raw) = raw else {
            return Ok(Self::default());
        };
        if raw.is_null() {
            return Ok(Self::default());
        }

        Self::deserialize(raw).map_err(|e| ConfigError::Decode {
            reason: e.to_string(),
        })
    }

    /// Check that both fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first empty field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dns_zone_id.is_empty() {
            return Err(ConfigError::MissingField { field: "dnsZoneId" });
        }
        if self.authorization_key_secret_name.is_empty() {
            return Err(ConfigError::MissingField {
                field: "authorizationKeySecretName",
            });
        }
        Ok(())
    }
}

/// Base URLs of the Yandex Cloud APIs the solver talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YandexEndpoints {
    /// IAM API base URL (token exchange)
    pub iam: Url,
    /// Cloud DNS API base URL
    pub dns: Url,
}

impl YandexEndpoints {
    /// Endpoints of the public Yandex Cloud installation.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the defaults are constant.
    pub fn yandex_cloud() -> Result<Self> {
        Self::parse(DEFAULT_IAM_ENDPOINT, DEFAULT_DNS_ENDPOINT)
    }

    /// Parse both endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is not an absolute http(s) URL.
    pub fn parse(iam: &str, dns: &str) -> Result<Self> {
        Ok(Self {
            iam: parse_endpoint("IAM", iam)?,
            dns: parse_endpoint("DNS", dns)?,
        })
    }
}

fn parse_endpoint(what: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).with_context(|| format!("Invalid {what} endpoint '{value}'"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("Invalid {what} endpoint '{value}': scheme must be http or https");
    }
    Ok(url)
}

/// Command line and environment of the webhook binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "ycdns-webhook", version, about)]
pub struct Cli {
    /// API group the webhook is registered under (`groupName` on the issuer)
    #[arg(long, env = ENV_GROUP_NAME, default_value = "")]
    pub group_name: String,

    /// Address the webhook server listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// PEM certificate chain for serving TLS
    #[arg(long, env = "TLS_CERT_FILE")]
    pub tls_cert_file: Option<PathBuf>,

    /// PEM private key for serving TLS
    #[arg(long, env = "TLS_KEY_FILE")]
    pub tls_key_file: Option<PathBuf>,

    /// Yandex Cloud IAM API endpoint
    #[arg(long, env = "YC_IAM_ENDPOINT", default_value = DEFAULT_IAM_ENDPOINT)]
    pub iam_endpoint: String,

    /// Yandex Cloud DNS API endpoint
    #[arg(long, env = "YC_DNS_ENDPOINT", default_value = DEFAULT_DNS_ENDPOINT)]
    pub dns_endpoint: String,
}

/// TLS material for the webhook server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    /// Certificate chain path
    pub cert: PathBuf,
    /// Private key path
    pub key: PathBuf,
}

/// Validated startup configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// API group the solver is served under
    pub group_name: String,
    /// Listen address
    pub listen_addr: SocketAddr,
    /// TLS files, `None` serves plain HTTP
    pub tls: Option<TlsFiles>,
    /// Yandex Cloud endpoints
    pub endpoints: YandexEndpoints,
}

impl TryFrom<Cli> for WebhookConfig {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self> {
        let group_name = cli.group_name.trim().to_string();
        if group_name.is_empty() {
            bail!("{ENV_GROUP_NAME} must be specified");
        }

        let tls = match (cli.tls_cert_file, cli.tls_key_file) {
            (Some(cert), Some(key)) => Some(TlsFiles { cert, key }),
            (None, None) => None,
            _ => bail!("TLS_CERT_FILE and TLS_KEY_FILE must be set together"),
        };

        Ok(Self {
            group_name,
            listen_addr: cli.listen_addr,
            tls,
            endpoints: YandexEndpoints::parse(&cli.iam_endpoint, &cli.dns_endpoint)?,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
