//! Tracing configuration types.

use serde::Deserialize;

/// Configuration for logging and optional OpenTelemetry export.
#[derive(Debug, Clone, Deserialize)]
pub struct TracingConfig {
    /// Service name attached to exported spans.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// OTLP collector endpoint (e.g. "http://collector:4317").
    /// When `None`, spans are only written to stderr.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    #[serde(default)]
    pub protocol: OtlpProtocol,

    /// `EnvFilter` directive (e.g. "info", "request_id=debug,info").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// OTLP transport protocol.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OtlpProtocol {
    #[default]
    Grpc,
    Http,
}

fn default_service_name() -> String {
    "request-id-echo".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            otlp_endpoint: None,
            protocol: OtlpProtocol::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_disable_otlp() {
        let config = TracingConfig::default();
        assert_eq!(config.service_name, "request-id-echo");
        assert!(config.otlp_endpoint.is_none());
        assert_eq!(config.protocol, OtlpProtocol::Grpc);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_deserialize_http_protocol() {
        let config: TracingConfig = serde_json::from_str(
            r#"{"otlp_endpoint": "http://collector:4318", "protocol": "http"}"#,
        )
        .unwrap();

        assert_eq!(config.protocol, OtlpProtocol::Http);
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4318"));
        assert_eq!(config.service_name, "request-id-echo");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_unknown_protocol_is_rejected() {
        let result = serde_json::from_str::<TracingConfig>(r#"{"protocol": "udp"}"#);
        assert!(result.is_err());
    }
}
