// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for Yandex API wire types.

#[cfg(test)]
mod tests {
    use crate::yandex::types::*;
    use serde_json::json;

    #[test]
    fn test_record_set_ttl_accepts_string_and_number() {
        let from_string: RecordSet = serde_json::from_value(json!({
            "name": "_acme-challenge.example.com.",
            "type": "TXT",
            "ttl": "60",
            "data": ["a"],
        }))
        .unwrap();
        assert_eq!(from_string.ttl, 60);
        assert_eq!(from_string.record_type, "TXT");

        let from_number: RecordSet =
            serde_json::from_value(json!({"name": "x.", "type": "TXT", "ttl": 300})).unwrap();
        assert_eq!(from_number.ttl, 300);
        assert!(from_number.data.is_empty());
    }

    #[test]
    fn test_record_set_serializes_ttl_as_string() {
        let rs = RecordSet {
            name: "_acme-challenge.example.com.".to_string(),
            record_type: "TXT".to_string(),
            ttl: 60,
            data: vec!["token".to_string()],
        };

        assert_eq!(
            serde_json::to_value(&rs).unwrap(),
            json!({
                "name": "_acme-challenge.example.com.",
                "type": "TXT",
                "ttl": "60",
                "data": ["token"],
            })
        );
    }

    #[test]
    fn test_update_request_omits_empty_lists() {
        let rs = RecordSet {
            name: "x.".to_string(),
            record_type: "TXT".to_string(),
            ttl: 60,
            data: vec!["v".to_string()],
        };

        let body = serde_json::to_value(UpdateRecordSetsRequest::delete(rs.clone())).unwrap();
        assert!(body.get("additions").is_none());
        assert_eq!(body["deletions"][0]["data"], json!(["v"]));

        let body = serde_json::to_value(UpdateRecordSetsRequest::add(rs)).unwrap();
        assert!(body.get("deletions").is_none());
        assert_eq!(body["additions"][0]["ttl"], json!("60"));
    }

    #[test]
    fn test_operation_with_error() {
        let op: Operation = serde_json::from_value(json!({
            "id": "dnsop1",
            "description": "Update record sets",
            "createdAt": "2024-01-01T00:00:00Z",
            "done": true,
            "error": {"code": 9, "message": "record set already exists"},
        }))
        .unwrap();

        assert!(op.done);
        let err = op.error.unwrap();
        assert_eq!(err.code, 9);
        assert_eq!(err.message, "record set already exists");
    }

    #[test]
    fn test_iam_token_response() {
        let resp: IamTokenResponse = serde_json::from_value(json!({
            "iamToken": "t1.abc",
            "expiresAt": "2024-01-01T12:00:00Z",
        }))
        .unwrap();
        assert_eq!(resp.iam_token, "t1.abc");
        assert_eq!(resp.expires_at.as_deref(), Some("2024-01-01T12:00:00Z"));
    }
}
