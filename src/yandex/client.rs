// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Authenticated Yandex Cloud DNS API client.
//!
//! A [`DnsClient`] is short-lived: one is built per `Present`/`CleanUp` call,
//! with a freshly exchanged IAM token, and dropped afterwards.

use crate::config::YandexEndpoints;
use crate::constants::YANDEX_HTTP_TIMEOUT_SECS;
use crate::errors::{ApiError, SolverError};
use crate::metrics;
use crate::yandex::iam::{exchange_jwt_for_iam_token, ServiceAccountCredentials};
use crate::yandex::types::{Operation, RecordSet, UpdateRecordSetsRequest};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Record set operations of the DNS zone service.
#[async_trait]
pub trait RecordSetApi: Send + Sync {
    /// Fetch the record set `(name, record_type)` of a zone, `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for any failure other than "not found".
    async fn get_record_set(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
    ) -> Result<Option<RecordSet>, ApiError>;

    /// Apply deletions and additions to a zone.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the call fails or the returned operation
    /// carries an error.
    async fn update_record_sets(
        &self,
        zone_id: &str,
        request: &UpdateRecordSetsRequest,
    ) -> Result<Operation, ApiError>;
}

/// Build the HTTP client used for Yandex Cloud calls.
///
/// # Errors
///
/// Returns [`ApiError::ClientBuildFailed`] if the TLS backend cannot be set up.
pub fn build_http_client() -> Result<HttpClient, ApiError> {
    HttpClient::builder()
        .timeout(Duration::from_secs(YANDEX_HTTP_TIMEOUT_SECS))
        .build()
        .map_err(|e| ApiError::ClientBuildFailed {
            reason: format!("failed to create HTTP client: {e}"),
            status_code: None,
        })
}

/// Cloud DNS client holding a bearer IAM token.
#[derive(Debug, Clone)]
pub struct DnsClient {
    http: HttpClient,
    dns_endpoint: Url,
    iam_token: String,
}

impl DnsClient {
    /// Wrap an existing IAM token.
    #[must_use]
    pub fn with_token(http: HttpClient, dns_endpoint: Url, iam_token: String) -> Self {
        Self {
            http,
            dns_endpoint,
            iam_token,
        }
    }

    /// Authenticate with a service account key and return a ready client.
    ///
    /// # Errors
    ///
    /// Returns a credential error if the JWT cannot be signed and
    /// [`ApiError::ClientBuildFailed`] if the token exchange fails.
    pub async fn connect(
        credentials: &ServiceAccountCredentials,
        endpoints: &YandexEndpoints,
    ) -> Result<Self, SolverError> {
        let http = build_http_client()?;
        let jwt = credentials.signed_jwt(Utc::now())?;

        let iam_token = exchange_jwt_for_iam_token(&http, &endpoints.iam, &jwt)
            .await
            .map_err(|e| {
                let status_code = match &e {
                    ApiError::UnexpectedHttpResponse { status_code, .. } => Some(*status_code),
                    _ => None,
                };
                ApiError::ClientBuildFailed {
                    reason: e.to_string(),
                    status_code,
                }
            })?;

        debug!(
            service_account_id = %credentials.service_account_id(),
            "Authenticated against Yandex Cloud IAM"
        );

        Ok(Self::with_token(http, endpoints.dns.clone(), iam_token))
    }

    /// URL of a zone method, e.g. `.../dns/v1/zones/{id}:getRecordSet`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidResponse`] if the resulting URL does not parse.
    pub fn zone_method_url(&self, zone_id: &str, method: &str) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/dns/v1/zones/{zone_id}:{method}",
            self.dns_endpoint.as_str().trim_end_matches('/')
        );
        Url::parse(&raw).map_err(|e| ApiError::InvalidResponse {
            url: raw,
            reason: format!("invalid request URL: {e}"),
        })
    }

    async fn send(
        &self,
        operation: &str,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        info!(operation = %operation, url = %url, "HTTP API request to Yandex Cloud DNS");

        request
            .bearer_auth(&self.iam_token)
            .send()
            .await
            .map_err(|e| {
                metrics::record_api_call(operation, false);
                error!(operation = %operation, url = %url, error = %e, "HTTP API request failed");
                ApiError::HttpRequestFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            })
    }

    async fn fail(operation: &str, url: &Url, response: Response) -> ApiError {
        metrics::record_api_call(operation, false);
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(
            operation = %operation,
            url = %url,
            status = %status,
            error = %body,
            "HTTP API request failed"
        );
        ApiError::UnexpectedHttpResponse {
            url: url.to_string(),
            status_code: status.as_u16(),
            reason: body,
        }
    }
}

#[async_trait]
impl RecordSetApi for DnsClient {
    async fn get_record_set(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
    ) -> Result<Option<RecordSet>, ApiError> {
        let op = metrics::API_OP_GET_RECORD_SET;
        let mut url = self.zone_method_url(zone_id, "getRecordSet")?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("type", record_type);

        let response = self.send(op, &url, self.http.get(url.clone())).await?;

        if response.status() == StatusCode::NOT_FOUND {
            metrics::record_api_call(op, true);
            debug!(zone_id = %zone_id, name = %name, "Record set not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::fail(op, &url, response).await);
        }

        let record_set: RecordSet = response.json().await.map_err(|e| {
            metrics::record_api_call(op, false);
            ApiError::InvalidResponse {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        metrics::record_api_call(op, true);
        Ok(Some(record_set))
    }

    async fn update_record_sets(
        &self,
        zone_id: &str,
        request: &UpdateRecordSetsRequest,
    ) -> Result<Operation, ApiError> {
        let op = metrics::API_OP_UPDATE_RECORD_SETS;
        let url = self.zone_method_url(zone_id, "updateRecordSets")?;

        let response = self
            .send(op, &url, self.http.post(url.clone()).json(request))
            .await?;

        if !response.status().is_success() {
            return Err(Self::fail(op, &url, response).await);
        }

        let operation: Operation = response.json().await.map_err(|e| {
            metrics::record_api_call(op, false);
            ApiError::InvalidResponse {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        if let Some(err) = &operation.error {
            metrics::record_api_call(op, false);
            return Err(ApiError::OperationFailed {
                operation_id: operation.id.clone(),
                code: err.code,
                message: err.message.clone(),
            });
        }

        metrics::record_api_call(op, true);
        debug!(operation_id = %operation.id, done = operation.done, "Record sets updated");
        Ok(operation)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
