use serde::Deserialize;
use std::net::SocketAddr;

use domain::services::IngestConfig;
use shared::jwt::JwtVerifier;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Ingestion and geofence evaluation tuning.
    #[serde(default)]
    pub tracking: TrackingConfig,
    /// JWT verification configuration.
    pub jwt: JwtAuthConfig,
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
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Converts into the persistence layer's pool configuration.
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Per-user request budget. Zero disables rate limiting.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

/// Tuning for the ingestion pipeline and geofence evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Consecutive agreeing pings required to confirm a zone transition.
    #[serde(default = "default_confirmation_pings")]
    pub confirmation_pings: u32,

    /// Minimum seconds between alerts sharing a dedupe key.
    #[serde(default = "default_alert_cooldown")]
    pub alert_cooldown_secs: i64,

    /// Battery percentage strictly below which a low-battery alert fires.
    #[serde(default = "default_low_battery_threshold")]
    pub low_battery_threshold: i32,

    /// Reject backdated client timestamps instead of clamping them.
    #[serde(default)]
    pub strict_ordering: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            confirmation_pings: default_confirmation_pings(),
            alert_cooldown_secs: default_alert_cooldown(),
            low_battery_threshold: default_low_battery_threshold(),
            strict_ordering: false,
        }
    }
}

impl TrackingConfig {
    /// Converts into the domain engine configuration.
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            confirmation_pings: self.confirmation_pings,
            alert_cooldown_secs: self.alert_cooldown_secs,
            low_battery_threshold: self.low_battery_threshold,
            strict_ordering: self.strict_ordering,
        }
    }
}

/// JWT verification configuration. Tokens are issued by the external identity
/// system; this service only verifies them.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// RSA public key in PEM format for verifying tokens.
    #[serde(default)]
    pub public_key: String,

    /// Shared HS256 secret for development and tests. Ignored when a public
    /// key is configured.
    #[serde(default)]
    pub dev_secret: String,

    /// Leeway in seconds for clock skew tolerance (default: 30).
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

impl JwtAuthConfig {
    /// Builds the token verifier from the configured key material.
    pub fn build_verifier(&self) -> Result<JwtVerifier, ConfigValidationError> {
        if !self.public_key.is_empty() {
            return JwtVerifier::from_rsa_public_key_pem(&self.public_key, self.leeway_secs)
                .map_err(|e| {
                    ConfigValidationError::InvalidValue(format!("jwt.public_key: {}", e))
                });
        }
        if !self.dev_secret.is_empty() {
            return Ok(JwtVerifier::insecure_hs256(&self.dev_secret));
        }
        Err(ConfigValidationError::MissingRequired(
            "jwt.public_key or jwt.dev_secret".to_string(),
        ))
    }
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
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    120
}
fn default_confirmation_pings() -> u32 {
    2
}
fn default_alert_cooldown() -> i64 {
    300
}
fn default_low_battery_threshold() -> i32 {
    15
}
fn default_jwt_leeway() -> u64 {
    30
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with PT__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PT").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides, without relying
    /// on config files (which may not be accessible during tests).
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 120

            [tracking]
            confirmation_pings = 2
            alert_cooldown_secs = 300
            low_battery_threshold = 15
            strict_ordering = false

            [jwt]
            public_key = ""
            dev_secret = "test-secret"
            leeway_secs = 30
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Validates cross-field constraints that serde defaults cannot express.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "database.url".to_string(),
            ));
        }
        if self.tracking.confirmation_pings == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "tracking.confirmation_pings must be at least 1".to_string(),
            ));
        }
        if self.tracking.alert_cooldown_secs < 0 {
            return Err(ConfigValidationError::InvalidValue(
                "tracking.alert_cooldown_secs must not be negative".to_string(),
            ));
        }
        self.jwt.build_verifier()?;
        Ok(())
    }

    /// Socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }
}
