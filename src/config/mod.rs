pub mod types;
mod validators;

// Re-export all public types
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validators::{
        validate_array_size, validate_listen_address, validate_network_cidr,
        validate_positive_timeout, validate_weight,
    };
    use std::collections::HashMap;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    // Test utilities
    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_system_config_complete() {
        let config_toml = r#"
[server]
listen = "0.0.0.0:9090"
request_timeout = 60

[service]
name = "orders"

[network]
ignore_nets = ["10.255.0.0/16"]
allow_nets = ["10.0.0.0/8", "192.168.0.0/16"]

[discovery]
enabled = true
server_addr = "nacos.internal"
server_port = 8849
scheme = "https"
namespace_id = "staging"
group_name = "ORDERS"
cluster_name = "east"
timeout_ms = 3000
weight = 50.0
ephemeral = false
beat_interval = 3
grace_period = 2

[metadata]
enabled = false
connect_timeout = 4
protocols = ["http", "grpc"]

[logging]
level = "debug"
format = "pretty"

[monitoring]
metrics_enabled = false
metrics_path = "/prom"
"#;

        let file = create_temp_file(config_toml);
        let config = SystemConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:9090");
        assert_eq!(config.server.request_timeout, 60);
        assert_eq!(config.service.name, "orders");
        assert_eq!(config.network.ignore_nets, vec!["10.255.0.0/16"]);
        assert_eq!(config.network.allow_nets.len(), 2);
        assert_eq!(config.discovery.server_addr, "nacos.internal");
        assert_eq!(config.discovery.server_port, 8849);
        assert_eq!(config.discovery.namespace_id, "staging");
        assert_eq!(config.discovery.group_name, "ORDERS");
        assert_eq!(config.discovery.cluster_name, "east");
        assert_eq!(config.discovery.weight, 50.0);
        assert!(!config.discovery.ephemeral);
        assert_eq!(config.discovery.grace_period(), Duration::from_secs(2));
        assert_eq!(config.discovery.request_timeout(), Duration::from_millis(3000));
        assert_eq!(config.discovery.base_url(), "https://nacos.internal:8849");
        assert!(!config.metadata.enabled);
        assert_eq!(config.metadata.protocols, vec!["http", "grpc"]);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
        assert!(!config.monitoring.metrics_enabled);
        assert_eq!(config.monitoring.metrics_path, "/prom");
    }

    #[test]
    fn test_system_config_defaults() {
        let file = create_temp_file("");
        let config = SystemConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.service.name, "example-beego-opensergo");
        assert_eq!(
            config.network.ignore_nets,
            vec!["30.39.179.16/30", "fe80::1/24"]
        );
        assert!(config.network.allow_nets.is_empty());
        assert!(config.discovery.enabled);
        assert_eq!(config.discovery.base_url(), "http://127.0.0.1:8848");
        assert_eq!(config.discovery.timeout_ms, 5000);
        assert_eq!(config.discovery.weight, 100.0);
        assert!(config.discovery.ephemeral);
        assert_eq!(config.discovery.group_name, "DEFAULT_GROUP");
        assert_eq!(config.discovery.grace_period(), Duration::from_secs(10));
        assert_eq!(config.discovery.beat_interval(), Duration::from_secs(5));
        assert!(config.metadata.enabled);
        assert_eq!(config.metadata.connect_timeout, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
        assert!(config.monitoring.metrics_enabled);
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = SystemConfig::load_from_file("/nonexistent/service-beacon.toml");
        assert!(matches!(
            result,
            Err(crate::types::Error::Config(
                crate::types::ConfigError::FileNotFound { .. }
            ))
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = SystemConfig::load_or_default("/nonexistent/service-beacon.toml").unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:8080");
    }

    #[test]
    fn test_load_or_default_parse_error() {
        let file = create_temp_file("[server\nlisten = ");
        let result = SystemConfig::load_or_default(file.path());
        assert!(matches!(
            result,
            Err(crate::types::Error::Config(
                crate::types::ConfigError::ParseError(_)
            ))
        ));
    }

    #[test]
    fn test_env_override_server_addr() {
        let env: HashMap<&str, &str> = [(ENV_SERVER_ADDR, " 10.1.1.1 ")].into_iter().collect();
        let mut config = SystemConfig::default();
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.discovery.server_addr, "10.1.1.1");
    }

    #[test]
    fn test_env_override_ignores_empty_value() {
        let mut config = SystemConfig::default();
        config.apply_overrides_from(|_| Some("   ".to_string()));
        assert_eq!(config.discovery.server_addr, "127.0.0.1");

        config.apply_overrides_from(|_| None);
        assert_eq!(config.discovery.server_addr, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_default_config_is_valid() {
        assert!(SystemConfig::default().validate().await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_rejects_malformed_cidr() {
        let mut config = SystemConfig::default();
        config.network.allow_nets = vec!["10.0.0.0/8".to_string(), "10.0.0/8".to_string()];

        let err = config.validate().await.unwrap_err();
        match err {
            crate::types::Error::Validation { field, .. } => {
                assert_eq!(field, "network.allow_nets[1]")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_startup_validation_tolerates_malformed_cidr() {
        let mut config = SystemConfig::default();
        config.network.ignore_nets.push("10.0.0.0/33".to_string());
        config.network.allow_nets = vec!["garbage".to_string()];

        assert!(config.validate_startup().await.is_ok());
        assert!(config.validate_subnet_filters().is_err());
        assert!(config.validate().await.is_err());
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_log_settings() {
        let mut config = SystemConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().await.is_err());

        let mut config = SystemConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().await.is_err());
    }

    #[tokio::test]
    async fn test_validate_discovery_settings() {
        let mut config = SystemConfig::default();
        config.discovery.server_port = 0;
        assert!(config.validate().await.is_err());

        let mut config = SystemConfig::default();
        config.discovery.scheme = "ftp".to_string();
        assert!(config.validate().await.is_err());

        let mut config = SystemConfig::default();
        config.discovery.beat_interval = 0;
        assert!(config.validate().await.is_err());

        // Disabled discovery skips its checks
        let mut config = SystemConfig::default();
        config.discovery.enabled = false;
        config.discovery.server_port = 0;
        assert!(config.validate().await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_metrics_path() {
        let mut config = SystemConfig::default();
        config.monitoring.metrics_path = "metrics".to_string();
        assert!(config.validate().await.is_err());
    }

    #[test]
    fn test_validate_listen_address() {
        assert!(validate_listen_address("127.0.0.1:8080").is_ok());
        assert!(validate_listen_address("[::]:8080").is_ok());

        assert!(validate_listen_address("invalid").is_err());
        assert!(validate_listen_address("127.0.0.1").is_err());
        assert!(validate_listen_address("0.0.0.0:0").is_err());
    }

    #[test]
    fn test_validate_network_cidr() {
        assert!(validate_network_cidr("30.39.179.16/30", "f").is_ok());
        assert!(validate_network_cidr("fe80::1/24", "f").is_ok());
        assert!(validate_network_cidr("2001:db8::/32", "f").is_ok());

        assert!(validate_network_cidr("192.168.1.1", "f").is_err());
        assert!(validate_network_cidr("192.168.1.0/33", "f").is_err());
        assert!(validate_network_cidr("", "f").is_err());
    }

    #[test]
    fn test_validate_helpers() {
        assert!(validate_positive_timeout(1, "t").is_ok());
        assert!(validate_positive_timeout(0, "t").is_err());

        assert!(validate_weight(0.0, "w").is_ok());
        assert!(validate_weight(100.0, "w").is_ok());
        assert!(validate_weight(-1.0, "w").is_err());
        assert!(validate_weight(10001.0, "w").is_err());

        assert!(validate_array_size(&[1, 2, 3], "a", 3).is_ok());
        assert!(validate_array_size(&[1, 2, 3], "a", 2).is_err());
    }
}
