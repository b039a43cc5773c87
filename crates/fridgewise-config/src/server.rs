use std::env;
use std::fmt;

use tracing::warn;

/// Runtime environment, from `ENVIRONMENT` (falls back to `NODE_ENV`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "test" => Some(Self::Test),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        })
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Port of the Prometheus metrics listener.
    pub metrics_port: u16,
    pub environment: Environment,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let environment = match env::var("ENVIRONMENT").or_else(|_| env::var("NODE_ENV")) {
            Ok(raw) => Environment::parse(&raw).unwrap_or_else(|| {
                warn!(environment = %raw, "Unknown environment, assuming development");
                Environment::Development
            }),
            Err(_) => defaults.environment,
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            metrics_port: env::var("METRICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.metrics_port),
            environment,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn metrics_address(&self) -> String {
        format!("{}:{}", self.host, self.metrics_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            metrics_port: 9000,
            environment: Environment::Development,
        }
    }
}
