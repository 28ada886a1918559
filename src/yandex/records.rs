// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TXT record set mutation for DNS-01 challenges.
//!
//! The record set is always replaced as a whole, in two separate calls: delete
//! the old set, then add the new one. The two calls are not atomic; if the
//! addition fails after a successful deletion the record set stays absent.

use super::client::RecordSetApi;
use super::types::{RecordSet, UpdateRecordSetsRequest};
use crate::constants::{CHALLENGE_RECORD_TTL_SECS, RECORD_TYPE_TXT};
use crate::errors::ApiError;
use tracing::{debug, info};

/// Values of the record set after presenting `value`.
///
/// The value is appended even if it is already present.
#[must_use]
pub fn values_after_present(existing: Option<&RecordSet>, value: &str) -> Vec<String> {
    let mut data = existing.map(|rs| rs.data.clone()).unwrap_or_default();
    data.push(value.to_string());
    data
}

/// Values of the record set after cleaning up `value`.
///
/// Every occurrence of the value is removed; the order of the rest is kept.
#[must_use]
pub fn values_after_cleanup(existing: &[String], value: &str) -> Vec<String> {
    existing
        .iter()
        .filter(|item| item.as_str() != value)
        .cloned()
        .collect()
}

/// The TXT record set written for a challenge.
#[must_use]
pub fn challenge_record_set(fqdn: &str, data: Vec<String>) -> RecordSet {
    RecordSet {
        name: fqdn.to_string(),
        record_type: RECORD_TYPE_TXT.to_string(),
        ttl: CHALLENGE_RECORD_TTL_SECS,
        data,
    }
}

async fn fetch_txt_record_set<A: RecordSetApi + ?Sized>(
    api: &A,
    zone_id: &str,
    fqdn: &str,
) -> Result<Option<RecordSet>, ApiError> {
    api.get_record_set(zone_id, fqdn, RECORD_TYPE_TXT)
        .await
        .map_err(|e| ApiError::GetRecordSetFailed {
            fqdn: fqdn.to_string(),
            reason: e.to_string(),
        })
}

async fn delete_record_set<A: RecordSetApi + ?Sized>(
    api: &A,
    zone_id: &str,
    fqdn: &str,
    record_set: RecordSet,
) -> Result<(), ApiError> {
    debug!(zone_id = %zone_id, fqdn = %fqdn, values = ?record_set.data, "Deleting TXT record set");
    api.update_record_sets(zone_id, &UpdateRecordSetsRequest::delete(record_set))
        .await
        .map_err(|e| ApiError::DeleteRecordSetFailed {
            fqdn: fqdn.to_string(),
            reason: e.to_string(),
        })?;
    Ok(())
}

async fn add_record_set<A: RecordSetApi + ?Sized>(
    api: &A,
    zone_id: &str,
    fqdn: &str,
    data: Vec<String>,
) -> Result<(), ApiError> {
    debug!(zone_id = %zone_id, fqdn = %fqdn, values = ?data, "Adding TXT record set");
    let request = UpdateRecordSetsRequest::add(challenge_record_set(fqdn, data.clone()));
    api.update_record_sets(zone_id, &request)
        .await
        .map_err(|e| ApiError::AddRecordSetFailed {
            fqdn: fqdn.to_string(),
            reason: e.to_string(),
            data,
        })?;
    Ok(())
}

/// Ensure the TXT record set `fqdn` contains `value`.
///
/// # Errors
///
/// Returns an error if fetching, deleting or adding the record set fails. A
/// failed deletion aborts before the addition.
pub async fn present_txt_record<A: RecordSetApi + ?Sized>(
    api: &A,
    zone_id: &str,
    fqdn: &str,
    value: &str,
) -> Result<(), ApiError> {
    let existing = fetch_txt_record_set(api, zone_id, fqdn).await?;
    let data = values_after_present(existing.as_ref(), value);

    if let Some(old) = existing {
        delete_record_set(api, zone_id, fqdn, old).await?;
    }
    add_record_set(api, zone_id, fqdn, data).await?;

    info!(zone_id = %zone_id, fqdn = %fqdn, "Presented TXT record");
    Ok(())
}

/// Remove `value` from the TXT record set `fqdn`.
///
/// A missing record set is a no-op. The old set is always deleted; a new one is
/// added only if values remain.
///
/// # Errors
///
/// Returns an error if fetching, deleting or re-adding the record set fails.
pub async fn cleanup_txt_record<A: RecordSetApi + ?Sized>(
    api: &A,
    zone_id: &str,
    fqdn: &str,
    value: &str,
) -> Result<(), ApiError> {
    let Some(existing) = fetch_txt_record_set(api, zone_id, fqdn).await? else {
        debug!(zone_id = %zone_id, fqdn = %fqdn, "No TXT record set, nothing to clean up");
        return Ok(());
    };

    let remaining = values_after_cleanup(&existing.data, value);

    delete_record_set(api, zone_id, fqdn, existing).await?;
    if !remaining.is_empty() {
        add_record_set(api, zone_id, fqdn, remaining).await?;
    }

    info!(zone_id = %zone_id, fqdn = %fqdn, "Cleaned up TXT record");
    Ok(())
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
