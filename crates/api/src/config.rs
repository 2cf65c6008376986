use persistence::db::DatabaseConfig;
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Jobs stuck in `processing` longer than this are reaped as failed.
    #[serde(default = "default_stale_job_timeout")]
    pub stale_job_timeout_minutes: i64,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_stale_job_timeout() -> i64 {
    60
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with RS__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("RS").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("invalid server host/port configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from_toml(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    const MINIMAL: &str = r#"
        [server]
        [logging]
        [limits]
        [database]
        url = "postgres://localhost/roster_sync"
    "#;

    #[test]
    fn test_defaults_applied() {
        let config = config_from_toml(MINIMAL);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.limits.stale_job_timeout_minutes, 60);
    }

    #[test]
    fn test_socket_addr() {
        let config = config_from_toml(MINIMAL);
        assert_eq!(config.socket_addr().port(), 8080);
    }

    #[test]
    fn test_overrides() {
        let config = config_from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            [logging]
            level = "debug"
            format = "pretty"
            [limits]
            stale_job_timeout_minutes = 15
            [database]
            url = "postgres://localhost/other"
            max_connections = 3
        "#,
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.limits.stale_job_timeout_minutes, 15);
        assert_eq!(config.database.max_connections, 3);
    }
}
