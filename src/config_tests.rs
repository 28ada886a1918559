// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use crate::config::{Cli, SolverConfig, WebhookConfig, YandexEndpoints};
    use crate::errors::ConfigError;
    use clap::Parser;
    use serde_json::json;

    #[test]
    fn test_load_missing_blob_is_empty_config() {
        let cfg = SolverConfig::load(None).unwrap();
        assert_eq!(cfg, SolverConfig::default());

        let cfg = SolverConfig::load(Some(&serde_json::Value::Null)).unwrap();
        assert_eq!(cfg, SolverConfig::default());
    }

    #[test]
    fn test_load_full_config() {
        let raw = json!({
            "dnsZoneId": "dns1234",
            "authorizationKeySecretName": "yc-authorized-key",
        });

        let cfg = SolverConfig::load(Some(&raw)).unwrap();
        assert_eq!(cfg.dns_zone_id, "dns1234");
        assert_eq!(cfg.authorization_key_secret_name, "yc-authorized-key");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_ignores_unknown_fields() {
        let raw = json!({"dnsZoneId": "dns1234", "folderId": "b1g"});
        let cfg = SolverConfig::load(Some(&raw)).unwrap();
        assert_eq!(cfg.dns_zone_id, "dns1234");
        assert!(cfg.authorization_key_secret_name.is_empty());
    }

    #[test]
    fn test_load_null_fields_are_reported_missing() {
        let raw = json!({"dnsZoneId": null, "authorizationKeySecretName": "yc-key"});
        let cfg = SolverConfig::load(Some(&raw)).unwrap();
        assert!(cfg.dns_zone_id.is_empty());
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::MissingField { field: "dnsZoneId" })
        );

        let raw = json!({"dnsZoneId": "dns1234", "authorizationKeySecretName": null});
        let cfg = SolverConfig::load(Some(&raw)).unwrap();
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::MissingField {
                field: "authorizationKeySecretName"
            })
        );
    }

    #[test]
    fn test_load_rejects_wrong_field_type() {
        let raw = json!({"dnsZoneId": 42});
        let err = SolverConfig::load(Some(&raw)).unwrap_err();
        assert!(matches!(err, ConfigError::Decode { .. }));
    }

    #[test]
    fn test_load_rejects_non_object() {
        let raw = json!("not an object");
        let err = SolverConfig::load(Some(&raw)).unwrap_err();
        assert!(matches!(err, ConfigError::Decode { .. }));
        assert!(err.to_string().starts_with("error decoding solver config"));
    }

    #[test]
    fn test_validate_missing_zone_id() {
        let cfg = SolverConfig {
            dns_zone_id: String::new(),
            authorization_key_secret_name: "yc-key".to_string(),
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::MissingField { field: "dnsZoneId" })
        );
    }

    #[test]
    fn test_validate_missing_secret_name() {
        let cfg = SolverConfig {
            dns_zone_id: "dns1234".to_string(),
            authorization_key_secret_name: String::new(),
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::MissingField {
                field: "authorizationKeySecretName"
            })
        );
    }

    #[test]
    fn test_validate_empty_config_reports_zone_first() {
        let err = SolverConfig::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "dnsZoneId field was not provided");
    }

    #[test]
    fn test_endpoints_parse() {
        let endpoints =
            YandexEndpoints::parse("http://127.0.0.1:8081", "https://dns.example.test").unwrap();
        assert_eq!(endpoints.iam.as_str(), "http://127.0.0.1:8081/");
        assert_eq!(endpoints.dns.host_str(), Some("dns.example.test"));
    }

    #[test]
    fn test_endpoints_reject_other_schemes() {
        assert!(YandexEndpoints::parse("ftp://iam", "https://dns").is_err());
        assert!(YandexEndpoints::parse("https://iam", "not a url").is_err());
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = YandexEndpoints::yandex_cloud().unwrap();
        assert_eq!(endpoints.iam.host_str(), Some("iam.api.cloud.yandex.net"));
        assert_eq!(endpoints.dns.host_str(), Some("dns.api.cloud.yandex.net"));
    }

    #[test]
    fn test_webhook_config_requires_group_name() {
        let cli = Cli::try_parse_from(["ycdns-webhook", "--group-name", "  "]).unwrap();
        let err = WebhookConfig::try_from(cli).unwrap_err();
        assert!(err.to_string().contains("GROUP_NAME must be specified"));
    }

    #[test]
    fn test_webhook_config_defaults() {
        let cli = Cli::try_parse_from(["ycdns-webhook", "--group-name", "acme.example.com"])
            .unwrap();
        let cfg = WebhookConfig::try_from(cli).unwrap();

        assert_eq!(cfg.group_name, "acme.example.com");
        assert_eq!(cfg.listen_addr.port(), 8443);
        assert!(cfg.tls.is_none());
        assert_eq!(cfg.endpoints, YandexEndpoints::yandex_cloud().unwrap());
    }

    #[test]
    fn test_webhook_config_tls_pair() {
        let cli = Cli::try_parse_from([
            "ycdns-webhook",
            "--group-name",
            "acme.example.com",
            "--tls-cert-file",
            "/tls/tls.crt",
            "--tls-key-file",
            "/tls/tls.key",
        ])
        .unwrap();
        let cfg = WebhookConfig::try_from(cli).unwrap();
        let tls = cfg.tls.unwrap();
        assert_eq!(tls.cert.to_str(), Some("/tls/tls.crt"));
        assert_eq!(tls.key.to_str(), Some("/tls/tls.key"));
    }

    #[test]
    fn test_webhook_config_rejects_half_tls_pair() {
        let cli = Cli::try_parse_from([
            "ycdns-webhook",
            "--group-name",
            "acme.example.com",
            "--tls-cert-file",
            "/tls/tls.crt",
        ])
        .unwrap();
        assert!(WebhookConfig::try_from(cli).is_err());
    }
}
