use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Placeholder secrets used by development presets. Production refuses them.
pub const DEV_JWT_SECRET: &str = "viblog-dev-access-secret-change-me";
pub const DEV_JWT_REFRESH_SECRET: &str = "viblog-dev-refresh-secret-change-me";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL. When absent the URL is assembled from the parts below.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub sslmode: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub refresh_secret: String,
    pub access_expiry_minutes: i64,
    pub refresh_expiry_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub api_requests: u32,
    pub api_window_secs: u64,
    pub comment_requests: u32,
    pub comment_window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set to a non-default value in production")]
    InsecureSecret(&'static str),

    #[error("JWT access and refresh secrets must differ")]
    SharedSecret,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV")
            .or_else(|_| env::var("SERVER_ENV"))
            .as_deref()
        {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DB_SSLMODE") {
            self.database.sslmode = v;
        }
        if let Ok(v) = env::var("DB_MAX_OPEN_CONNS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DB_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        // JWT overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_REFRESH_SECRET") {
            self.jwt.refresh_secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRY_MINUTES") {
            self.jwt.access_expiry_minutes = v.parse().unwrap_or(self.jwt.access_expiry_minutes);
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRY_HOURS") {
            self.jwt.refresh_expiry_hours = v.parse().unwrap_or(self.jwt.refresh_expiry_hours);
        }

        // Rate limit overrides
        if let Ok(v) = env::var("RATELIMIT_ENABLED") {
            self.rate_limit.enabled = v.parse().unwrap_or(self.rate_limit.enabled);
        }
        if let Ok(v) = env::var("RATELIMIT_API_REQUESTS") {
            self.rate_limit.api_requests = v.parse().unwrap_or(self.rate_limit.api_requests);
        }
        if let Ok(v) = env::var("RATELIMIT_API_WINDOW_SECS") {
            self.rate_limit.api_window_secs = v.parse().unwrap_or(self.rate_limit.api_window_secs);
        }
        if let Ok(v) = env::var("RATELIMIT_COMMENT_REQUESTS") {
            self.rate_limit.comment_requests = v.parse().unwrap_or(self.rate_limit.comment_requests);
        }
        if let Ok(v) = env::var("RATELIMIT_COMMENT_WINDOW_SECS") {
            self.rate_limit.comment_window_secs = v.parse().unwrap_or(self.rate_limit.comment_window_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("MAX_REQUEST_SIZE_BYTES") {
            self.security.max_request_size_bytes = v.parse().unwrap_or(self.security.max_request_size_bytes);
        }

        // Logging overrides
        if let Ok(v) = env::var("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = env::var("LOG_FORMAT") {
            self.logging.format = match v.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Text,
            };
        }

        self
    }

    /// Reject configurations that would be unsafe to serve with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret == self.jwt.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }
        if self.environment == Environment::Production {
            if self.jwt.secret.is_empty() || self.jwt.secret == DEV_JWT_SECRET {
                return Err(ConfigError::InsecureSecret("JWT_SECRET"));
            }
            if self.jwt.refresh_secret.is_empty() || self.jwt.refresh_secret == DEV_JWT_REFRESH_SECRET {
                return Err(ConfigError::InsecureSecret("JWT_REFRESH_SECRET"));
            }
        }
        Ok(())
    }

    pub(crate) fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 30000,
            },
            database: DatabaseConfig::local(10, 5),
            jwt: JwtConfig {
                secret: DEV_JWT_SECRET.to_string(),
                refresh_secret: DEV_JWT_REFRESH_SECRET.to_string(),
                access_expiry_minutes: 15,
                refresh_expiry_hours: 24 * 7,
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                api_requests: 100,
                api_window_secs: 60,
                comment_requests: 5,
                comment_window_secs: 60,
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Text,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 30000,
            },
            database: DatabaseConfig::local(20, 5),
            jwt: JwtConfig {
                secret: DEV_JWT_SECRET.to_string(),
                refresh_secret: DEV_JWT_REFRESH_SECRET.to_string(),
                access_expiry_minutes: 15,
                refresh_expiry_hours: 24 * 7,
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                api_requests: 100,
                api_window_secs: 60,
                comment_requests: 5,
                comment_window_secs: 60,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.viblog.com".to_string()],
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 30000,
            },
            database: DatabaseConfig::local(25, 3),
            jwt: JwtConfig {
                secret: String::new(),
                refresh_secret: String::new(),
                access_expiry_minutes: 15,
                refresh_expiry_hours: 24 * 7,
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                api_requests: 100,
                api_window_secs: 60,
                comment_requests: 5,
                comment_window_secs: 60,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://viblog.com".to_string()],
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
        }
    }
}

impl DatabaseConfig {
    fn local(max_connections: u32, connect_timeout_secs: u64) -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            name: "viblog".to_string(),
            sslmode: "disable".to_string(),
            max_connections,
            connect_timeout_secs,
        }
    }

    /// Connection URL, preferring an explicit DATABASE_URL.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.name, self.sslmode
        )
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
