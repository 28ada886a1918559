// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the Yandex Cloud DNS-01 solver.
//!
//! This module provides specialized error types for:
//! - Solver configuration decoding and validation
//! - Kubernetes Secret lookup and field extraction
//! - Service account credential construction and JWT signing
//! - Yandex Cloud IAM and DNS API calls
//!
//! Every failure is returned to cert-manager as-is; nothing here is retried or
//! compensated locally. The composite [`SolverError`] exposes a status reason and a
//! transient flag so the webhook can report failures in a structured way.

use thiserror::Error;

/// Errors raised while decoding or validating the per-issuer solver config.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The `config` JSON blob could not be decoded into a solver config
    #[error("error decoding solver config: {reason}")]
    Decode {
        /// Underlying JSON error
        reason: String,
    },

    /// A required config field is empty or absent
    #[error("{field} field was not provided")]
    MissingField {
        /// JSON name of the missing field (e.g. `dnsZoneId`)
        field: &'static str,
    },
}

/// Errors raised while reading the authorization key Secret.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// The Kubernetes API call for the Secret failed
    #[error("unable to get secret `{secret_name}/{namespace}`; {reason}")]
    SecretLookupFailed {
        /// The Secret name
        secret_name: String,
        /// The namespace that was queried
        namespace: String,
        /// Underlying Kubernetes API error
        reason: String,
    },

    /// The Secret does not exist
    #[error("unable to get secret `{secret_name}/{namespace}`; secret not found")]
    SecretNotFound {
        /// The Secret name
        secret_name: String,
        /// The namespace that was queried
        namespace: String,
    },

    /// A required key is absent from the Secret data
    #[error("key {key:?} not found in secret \"{secret_name}/{namespace}\"")]
    KeyNotFound {
        /// The missing data key
        key: String,
        /// The Secret name
        secret_name: String,
        /// The Secret namespace
        namespace: String,
    },

    /// A required key holds bytes that are not valid UTF-8
    #[error("key {key:?} in secret \"{secret_name}/{namespace}\" is not valid UTF-8")]
    InvalidKeyData {
        /// The offending data key
        key: String,
        /// The Secret name
        secret_name: String,
        /// The Secret namespace
        namespace: String,
    },
}

/// Errors raised while building service account credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The key material or identity fields were rejected
    #[error("unable to create ServiceAccountKey: {reason}")]
    InvalidServiceAccountKey {
        /// Why the key was rejected
        reason: String,
    },

    /// Signing the IAM JWT failed
    #[error("unable to sign IAM JWT for service account {service_account_id}: {reason}")]
    JwtSigningFailed {
        /// Service account the JWT was issued for
        service_account_id: String,
        /// Underlying signing error
        reason: String,
    },
}

/// Errors raised while talking to the Yandex Cloud APIs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Creating the authenticated client (HTTP client or IAM token) failed
    #[error("unable to create SDK: {reason}")]
    ClientBuildFailed {
        /// Underlying failure
        reason: String,
        /// HTTP status of a rejected IAM token exchange
        status_code: Option<u16>,
    },

    /// The HTTP request could not be sent or its body could not be read
    #[error("HTTP request to {url} failed: {reason}")]
    HttpRequestFailed {
        /// Request URL
        url: String,
        /// Transport error
        reason: String,
    },

    /// The API answered with a non-success status
    #[error("unexpected HTTP response from {url}: {status_code} {reason}")]
    UnexpectedHttpResponse {
        /// Request URL
        url: String,
        /// HTTP status code
        status_code: u16,
        /// Response body
        reason: String,
    },

    /// The API answered with a body that could not be decoded
    #[error("invalid response from {url}: {reason}")]
    InvalidResponse {
        /// Request URL
        url: String,
        /// Decoding error
        reason: String,
    },

    /// A completed operation reported an error
    #[error("operation {operation_id} failed with code {code}: {message}")]
    OperationFailed {
        /// Yandex operation id
        operation_id: String,
        /// gRPC status code reported by the operation
        code: i32,
        /// Operation error message
        message: String,
    },

    /// Fetching the current record set failed
    #[error("unable to get DNS record for: {fqdn}, with code: {reason}")]
    GetRecordSetFailed {
        /// Record name
        fqdn: String,
        /// Underlying API error
        reason: String,
    },

    /// Deleting the old record set failed
    #[error("unable to delete DNS record for: {fqdn}, with code: {reason}")]
    DeleteRecordSetFailed {
        /// Record name
        fqdn: String,
        /// Underlying API error
        reason: String,
    },

    /// Adding the new record set failed
    #[error("unable to create DNS record for: {fqdn}, with code: {reason}, data: {data:?}")]
    AddRecordSetFailed {
        /// Record name
        fqdn: String,
        /// Underlying API error
        reason: String,
        /// Values that were being written
        data: Vec<String>,
    },
}

/// Composite error type returned by solver operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// Solver config decoding or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Secret lookup or field extraction error
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// Credential construction error
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Yandex Cloud API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// `present`/`cleanup` was called before `initialize`
    #[error("solver {solver} has not been initialized with a Kubernetes client")]
    NotInitialized {
        /// Solver name
        solver: String,
    },
}

impl SolverError {
    /// Returns true if retrying the same request later may succeed.
    ///
    /// Configuration, secret content and credential errors need a user fix;
    /// API and connectivity errors may clear up on their own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            // IAM refused the key itself; retrying with the same Secret cannot succeed
            Self::Api(ApiError::ClientBuildFailed {
                status_code: Some(code),
                ..
            }) => !(400..500).contains(code) || *code == 408 || *code == 429,

            Self::Secret(SecretError::SecretLookupFailed { .. })
            | Self::Api(_)
            | Self::NotInitialized { .. } => true,

            Self::Config(_)
            | Self::Secret(
                SecretError::SecretNotFound { .. }
                | SecretError::KeyNotFound { .. }
                | SecretError::InvalidKeyData { .. },
            )
            | Self::Credential(_) => false,
        }
    }

    /// Returns the Kubernetes status reason for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Config(ConfigError::Decode { .. }) => "InvalidSolverConfig",
            Self::Config(ConfigError::MissingField { .. }) => "MissingSolverConfigField",

            Self::Secret(SecretError::SecretLookupFailed { .. }) => "SecretLookupFailed",
            Self::Secret(SecretError::SecretNotFound { .. }) => "SecretNotFound",
            Self::Secret(SecretError::KeyNotFound { .. }) => "SecretKeyNotFound",
            Self::Secret(SecretError::InvalidKeyData { .. }) => "InvalidSecretData",

            Self::Credential(CredentialError::InvalidServiceAccountKey { .. }) => {
                "InvalidServiceAccountKey"
            }
            Self::Credential(CredentialError::JwtSigningFailed { .. }) => "JwtSigningFailed",

            Self::Api(ApiError::ClientBuildFailed { .. }) => "ClientBuildFailed",
            Self::Api(ApiError::HttpRequestFailed { .. }) => "HttpRequestFailed",
            Self::Api(ApiError::UnexpectedHttpResponse { .. }) => "UnexpectedHttpResponse",
            Self::Api(ApiError::InvalidResponse { .. }) => "InvalidApiResponse",
            Self::Api(ApiError::OperationFailed { .. }) => "OperationFailed",
            Self::Api(ApiError::GetRecordSetFailed { .. }) => "GetRecordSetFailed",
            Self::Api(ApiError::DeleteRecordSetFailed { .. }) => "RecordSetDeletionFailed",
            Self::Api(ApiError::AddRecordSetFailed { .. }) => "RecordSetCreationFailed",

            Self::NotInitialized { .. } => "SolverNotInitialized",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
