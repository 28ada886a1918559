// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Yandex Cloud DNS-01 webhook.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Solver Constants
// ============================================================================

/// Name of this solver as referenced from an ACME `Issuer` (`solverName`)
pub const SOLVER_NAME: &str = "yandex-cloud";

/// API version of the cert-manager webhook payloads
pub const WEBHOOK_API_VERSION: &str = "webhook.acme.cert-manager.io/v1alpha1";

/// Kind of the cert-manager webhook payloads
pub const KIND_CHALLENGE_PAYLOAD: &str = "ChallengePayload";

/// Version segment under which the solver resource is served
pub const SOLVER_RESOURCE_VERSION: &str = "v1alpha1";

/// Environment variable holding the API group the webhook is registered under
pub const ENV_GROUP_NAME: &str = "GROUP_NAME";

// ============================================================================
// DNS Record Constants
// ============================================================================

/// Record type managed by this solver
pub const RECORD_TYPE_TXT: &str = "TXT";

/// TTL for challenge TXT record sets (1 minute)
pub const CHALLENGE_RECORD_TTL_SECS: i64 = 60;

// ============================================================================
// Secret Keys
// ============================================================================

/// Secret key holding the authorized key id
pub const SECRET_KEY_ID: &str = "id";

/// Secret key holding the service account id
pub const SECRET_KEY_SERVICE_ACCOUNT_ID: &str = "serviceAccountId";

/// Secret key holding the key algorithm (optional)
pub const SECRET_KEY_ENCRYPTION: &str = "encryption";

/// Secret key holding the PEM public key
pub const SECRET_KEY_PUBLIC_KEY: &str = "publicKey";

/// Secret key holding the PEM private key
pub const SECRET_KEY_PRIVATE_KEY: &str = "privateKey";

// ============================================================================
// Yandex Cloud API Constants
// ============================================================================

/// Default IAM API endpoint
pub const DEFAULT_IAM_ENDPOINT: &str = "https://iam.api.cloud.yandex.net";

/// Default Cloud DNS API endpoint
pub const DEFAULT_DNS_ENDPOINT: &str = "https://dns.api.cloud.yandex.net";

/// Path of the IAM token exchange relative to the IAM endpoint
pub const IAM_TOKENS_PATH: &str = "/iam/v1/tokens";

/// Audience claim expected by the IAM token exchange
pub const IAM_TOKEN_AUDIENCE: &str = "https://iam.api.cloud.yandex.net/iam/v1/tokens";

/// Lifetime of the service account JWT (1 hour, the maximum IAM accepts)
pub const JWT_LIFETIME_SECS: i64 = 3600;

/// Timeout for every Yandex Cloud HTTP request
pub const YANDEX_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Webhook Server Constants
// ============================================================================

/// Default listen address for the webhook server
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8443";

/// Grace period for in-flight requests on shutdown
pub const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 10;
