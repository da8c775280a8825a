use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // Access-token signing secret. Process-wide, read-only for the life of
    // the process; rotating it requires a restart.
    pub token_secret: String,
    pub token_ttl_seconds: u64,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// A missing or unusable signing secret / TTL fails here, so the process
    /// refuses to start rather than issue tokens it cannot verify later.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let token_secret = std::env::var("AUTH_TOKEN_SECRET")
            .map_err(|_| ConfigError::Missing("AUTH_TOKEN_SECRET"))?;
        if token_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("AUTH_TOKEN_SECRET"));
        }

        let token_ttl_seconds = std::env::var("AUTH_TOKEN_TTL_SECONDS")
            .map_err(|_| ConfigError::Missing("AUTH_TOKEN_TTL_SECONDS"))?
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid("AUTH_TOKEN_TTL_SECONDS"))?;
        if token_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("AUTH_TOKEN_TTL_SECONDS"));
        }

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            token_secret,
            token_ttl_seconds,
        })
    }
}
