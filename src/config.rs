// src/config.rs

use std::env;
use std::net::SocketAddr;

use dotenvy::dotenv;

/// Default percentage a learner must reach to pass a diagnostic level.
pub const DEFAULT_PASS_THRESHOLD: f64 = 60.0;

/// Section recommended when every diagnostic level up to the top of the bank is passed.
pub const COURSE_MASTERED_SECTION: &str = "Course mastered";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub log_dir: String,
    /// Allowed CORS origins. Empty means the permissive development default.
    pub cors_origins: Vec<String>,
    pub pass_threshold: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();

        let pass_threshold = match env::var("PASS_THRESHOLD") {
            Ok(raw) => parse_threshold(&raw)?,
            Err(_) => DEFAULT_PASS_THRESHOLD,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            log_dir,
            cors_origins,
            pass_threshold,
        })
    }

    /// Configuration for tests and local tooling that never touches the environment.
    pub fn for_testing(jwt_secret: &str) -> Self {
        Self {
            database_url: String::new(),
            jwt_secret: jwt_secret.to_string(),
            rust_log: "error".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            log_dir: "logs".to_string(),
            cors_origins: Vec::new(),
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name: "PASS_THRESHOLD",
        reason: format!("'{}' is not a number", raw),
    })?;

    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::Invalid {
            name: "PASS_THRESHOLD",
            reason: format!("{} is outside 0..=100", value),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold_accepts_percentages() {
        assert_eq!(parse_threshold("75").unwrap(), 75.0);
        assert_eq!(parse_threshold(" 0 ").unwrap(), 0.0);
        assert_eq!(parse_threshold("100").unwrap(), 100.0);
    }

    #[test]
    fn test_parse_threshold_rejects_out_of_range() {
        assert!(parse_threshold("100.5").is_err());
        assert!(parse_threshold("-1").is_err());
        assert!(parse_threshold("sixty").is_err());
    }

    #[test]
    fn test_parse_origins_skips_blanks() {
        let origins = parse_origins("http://localhost:3000, ,http://127.0.0.1:3000");
        assert_eq!(
            origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
    }
}
