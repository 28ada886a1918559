// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types of the Yandex Cloud IAM and DNS REST APIs.
//!
//! `int64` fields follow the proto3 JSON mapping: written as strings, accepted
//! as strings or numbers.

use serde::{Deserialize, Serialize};

/// A DNS record set as exposed by `getRecordSet` and `updateRecordSets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Record name
    #[serde(default)]
    pub name: String,
    /// Record type (e.g. `TXT`)
    #[serde(rename = "type", default)]
    pub record_type: String,
    /// Time to live in seconds
    #[serde(default, with = "int64_string")]
    pub ttl: i64,
    /// Record values
    #[serde(default)]
    pub data: Vec<String>,
}

/// Body of `POST /dns/v1/zones/{id}:updateRecordSets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecordSetsRequest {
    /// Record sets to delete
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deletions: Vec<RecordSet>,
    /// Record sets to add
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additions: Vec<RecordSet>,
}

impl UpdateRecordSetsRequest {
    /// A request deleting exactly one record set.
    #[must_use]
    pub fn delete(record_set: RecordSet) -> Self {
        Self {
            deletions: vec![record_set],
            additions: Vec::new(),
        }
    }

    /// A request adding exactly one record set.
    #[must_use]
    pub fn add(record_set: RecordSet) -> Self {
        Self {
            deletions: Vec::new(),
            additions: vec![record_set],
        }
    }
}

/// Long-running operation returned by mutating calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation id
    #[serde(default)]
    pub id: String,
    /// Human readable description
    #[serde(default)]
    pub description: String,
    /// Whether the operation has completed
    #[serde(default)]
    pub done: bool,
    /// Error of a completed, failed operation
    #[serde(default)]
    pub error: Option<OperationError>,
}

/// Error status carried by an [`Operation`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OperationError {
    /// gRPC status code
    #[serde(default)]
    pub code: i32,
    /// Error message
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /iam/v1/tokens`.
#[derive(Debug, Clone, Serialize)]
pub struct IamTokenRequest<'a> {
    /// Signed service account JWT
    pub jwt: &'a str,
}

/// Response of `POST /iam/v1/tokens`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamTokenResponse {
    /// Bearer token for subsequent API calls
    pub iam_token: String,
    /// Token expiry (RFC 3339)
    #[serde(default)]
    pub expires_at: Option<String>,
}

mod int64_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
