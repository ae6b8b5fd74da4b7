//! Configuration management for the OCR Service

use serde::Deserialize;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ocr::EngineConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub pool: PoolConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Number of engines (and blocking threads) kept for recognition
    pub size: usize,
    /// How long shutdown waits for in-flight recognitions
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted request body in bytes
    pub max_bytes: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_POOL_SIZE: usize = 4;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
            },
            engine: EngineConfig {
                data_path: default_tessdata_path(),
                language: "eng".to_string(),
            },
            pool: PoolConfig {
                size: DEFAULT_POOL_SIZE,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            upload: UploadConfig {
                max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let pool_size: usize = parse_var(&lookup, "OCR_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "OCR_POOL_SIZE",
                value: "0".to_string(),
                reason: "pool needs at least one engine".to_string(),
            });
        }

        Ok(Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_var(&lookup, "SERVER_PORT", DEFAULT_PORT)?,
            },
            engine: EngineConfig {
                data_path: lookup("OCR_TESSDATA_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_tessdata_path),
                language: lookup("OCR_LANGUAGE").unwrap_or_else(|| "eng".to_string()),
            },
            pool: PoolConfig {
                size: pool_size,
                shutdown_timeout_secs: parse_var(
                    &lookup,
                    "OCR_SHUTDOWN_TIMEOUT_SECS",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                )?,
            },
            upload: UploadConfig {
                max_bytes: parse_var(&lookup, "OCR_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            },
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

/// `ocrtessdata` next to the executable
fn default_tessdata_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("ocrtessdata")))
        .unwrap_or_else(|| PathBuf::from("ocrtessdata"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.engine.language, "eng");
        assert!(config.engine.data_path.ends_with("ocrtessdata"));
        assert_eq!(config.pool.size, 4);
        assert_eq!(config.pool.shutdown_timeout_secs, 30);
        assert_eq!(config.upload.max_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_PORT", "8080"),
            ("OCR_TESSDATA_PATH", "/usr/share/tessdata"),
            ("OCR_LANGUAGE", "deu"),
            ("OCR_POOL_SIZE", " 8 "),
            ("OCR_MAX_UPLOAD_BYTES", "1024"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.data_path, PathBuf::from("/usr/share/tessdata"));
        assert_eq!(config.engine.language, "deu");
        assert_eq!(config.pool.size, 8);
        assert_eq!(config.upload.max_bytes, 1024);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = Config::from_lookup(lookup(&[("SERVER_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "SERVER_PORT", .. }));
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let err = Config::from_lookup(lookup(&[("OCR_POOL_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "OCR_POOL_SIZE", .. }));
    }
}
