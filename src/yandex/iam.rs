// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service account authentication against Yandex Cloud IAM.
//!
//! An authorized key is turned into an IAM token in two steps:
//!
//! 1. Sign a PS256 JWT with the key's private key (`kid` = key id,
//!    `iss` = service account id, `aud` = token exchange URL)
//! 2. `POST /iam/v1/tokens` with `{"jwt": ...}` and use the returned
//!    `iamToken` as a bearer token

use crate::constants::{IAM_TOKENS_PATH, IAM_TOKEN_AUDIENCE, JWT_LIFETIME_SECS};
use crate::credentials::{KeyAlgorithm, ServiceAccountKey};
use crate::errors::{ApiError, CredentialError};
use crate::metrics;
use crate::yandex::types::{IamTokenRequest, IamTokenResponse};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use url::Url;

/// Marker that starts the PEM block inside a Yandex private key.
const PEM_BEGIN: &str = "-----BEGIN";

/// Claims of the service account JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Service account id
    pub iss: String,
    /// Token exchange URL
    pub aud: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Signing credentials derived from a [`ServiceAccountKey`].
#[derive(Clone)]
pub struct ServiceAccountCredentials {
    key_id: String,
    service_account_id: String,
    key_algorithm: KeyAlgorithm,
    encoding_key: EncodingKey,
}

impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("key_id", &self.key_id)
            .field("service_account_id", &self.service_account_id)
            .field("key_algorithm", &self.key_algorithm)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountCredentials {
    /// Validate an authorized key and load its private key.
    ///
    /// Yandex key files prefix the PEM block with a
    /// `PLEASE DO NOT REMOVE THIS LINE!` banner; anything before the PEM block
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidServiceAccountKey`] if the key id or
    /// service account id is blank, or the private key is not an RSA PEM key.
    pub fn from_key(key: &ServiceAccountKey) -> Result<Self, CredentialError> {
        if key.id.trim().is_empty() {
            return Err(CredentialError::InvalidServiceAccountKey {
                reason: "key id is empty".to_string(),
            });
        }
        if key.service_account_id.trim().is_empty() {
            return Err(CredentialError::InvalidServiceAccountKey {
                reason: "key should be issued for a service account, but serviceAccountId is empty"
                    .to_string(),
            });
        }

        let pem = strip_pem_preamble(&key.private_key).ok_or_else(|| {
            CredentialError::InvalidServiceAccountKey {
                reason: "private key is not PEM encoded".to_string(),
            }
        })?;

        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            CredentialError::InvalidServiceAccountKey {
                reason: format!("invalid private key: {e}"),
            }
        })?;

        Ok(Self {
            key_id: key.id.clone(),
            service_account_id: key.service_account_id.clone(),
            key_algorithm: key.key_algorithm,
            encoding_key,
        })
    }

    /// Authorized key id.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Service account id.
    #[must_use]
    pub fn service_account_id(&self) -> &str {
        &self.service_account_id
    }

    /// Key algorithm.
    #[must_use]
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        self.key_algorithm
    }

    /// Claims for a JWT issued at `now`.
    #[must_use]
    pub fn claims(&self, now: DateTime<Utc>) -> JwtClaims {
        let iat = now.timestamp();
        JwtClaims {
            iss: self.service_account_id.clone(),
            aud: IAM_TOKEN_AUDIENCE.to_string(),
            iat,
            exp: iat + JWT_LIFETIME_SECS,
        }
    }

    /// Sign a PS256 JWT issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::JwtSigningFailed`] if signing fails.
    pub fn signed_jwt(&self, now: DateTime<Utc>) -> Result<String, CredentialError> {
        let mut header = Header::new(Algorithm::PS256);
        header.kid = Some(self.key_id.clone());

        jsonwebtoken::encode(&header, &self.claims(now), &self.encoding_key).map_err(|e| {
            CredentialError::JwtSigningFailed {
                service_account_id: self.service_account_id.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// Return the PEM block of a private key, dropping any leading banner.
fn strip_pem_preamble(private_key: &str) -> Option<&str> {
    private_key.find(PEM_BEGIN).map(|start| &private_key[start..])
}

/// Exchange a signed JWT for an IAM token.
///
/// # Errors
///
/// Returns an [`ApiError`] if the request fails, IAM rejects the JWT, or the
/// response cannot be decoded.
pub async fn exchange_jwt_for_iam_token(
    client: &HttpClient,
    iam_endpoint: &Url,
    jwt: &str,
) -> Result<String, ApiError> {
    let url = format!(
        "{}{IAM_TOKENS_PATH}",
        iam_endpoint.as_str().trim_end_matches('/')
    );

    debug!(url = %url, "Requesting IAM token");

    let response = client
        .post(&url)
        .json(&IamTokenRequest { jwt })
        .send()
        .await
        .map_err(|e| {
            metrics::record_api_call(metrics::API_OP_IAM_TOKEN, false);
            ApiError::HttpRequestFailed {
                url: url.clone(),
                reason: e.to_string(),
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        metrics::record_api_call(metrics::API_OP_IAM_TOKEN, false);
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ApiError::UnexpectedHttpResponse {
            url,
            status_code: status.as_u16(),
            reason: body,
        });
    }

    let token: IamTokenResponse = response.json().await.map_err(|e| {
        metrics::record_api_call(metrics::API_OP_IAM_TOKEN, false);
        ApiError::InvalidResponse {
            url: url.clone(),
            reason: e.to_string(),
        }
    })?;

    metrics::record_api_call(metrics::API_OP_IAM_TOKEN, true);
    debug!(expires_at = ?token.expires_at, "IAM token issued");

    Ok(token.iam_token)
}

#[cfg(test)]
#[path = "iam_tests.rs"]
mod iam_tests;
