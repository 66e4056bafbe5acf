// ABOUTME: Environment configuration for the Central Vet client
// ABOUTME: Reads API endpoint, HTTP timeouts, scanner/face tuning and cache lifetimes from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! Environment-based configuration
//!
//! Configuration is environment-only. [`ClientConfig::from_lookup`] takes the
//! variable source as a closure so tests can feed values without touching the
//! process environment.

use crate::cache::QueryCacheConfig;
use crate::errors::{AppError, AppResult};
use crate::face::FaceConfig;
use crate::scanner::ScannerConfig;
use central_vet_core::constants::{cache, face, scanner};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Base URL of the clinic API
pub const ENV_API_BASE_URL: &str = "CENTRAL_VET_API_BASE_URL";
/// Request timeout in seconds
pub const ENV_HTTP_TIMEOUT_SECS: &str = "CENTRAL_VET_HTTP_TIMEOUT_SECS";
/// Connect timeout in seconds
pub const ENV_HTTP_CONNECT_TIMEOUT_SECS: &str = "CENTRAL_VET_HTTP_CONNECT_TIMEOUT_SECS";
/// QR decode attempts per second
pub const ENV_SCAN_FPS: &str = "CENTRAL_VET_SCAN_FPS";
/// Minimum interval between live face detections in milliseconds
pub const ENV_FACE_DETECT_INTERVAL_MS: &str = "CENTRAL_VET_FACE_DETECT_INTERVAL_MS";
/// Face landmark model asset
pub const ENV_FACE_MODEL_URL: &str = "CENTRAL_VET_FACE_MODEL_URL";
/// Staleness window of cached pet queries in seconds
pub const ENV_PETS_STALE_SECS: &str = "CENTRAL_VET_PETS_STALE_SECS";
/// Bearer token for the session, if already obtained
pub const ENV_ACCESS_TOKEN: &str = "CENTRAL_VET_ACCESS_TOKEN";
/// Deployment environment
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// HTTP client timeout configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Complete client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Base URL of the clinic API
    pub api_base_url: Url,
    /// HTTP timeouts
    pub http: HttpClientConfig,
    /// Camera/decoder tuning
    pub scanner: ScannerConfig,
    /// Face-capture tuning
    pub face: FaceConfig,
    /// Query cache lifetimes
    pub cache: QueryCacheConfig,
    /// Bearer token for the session
    pub access_token: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("environment", &self.environment)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("http", &self.http)
            .field("scanner", &self.scanner)
            .field("face", &self.face)
            .field("cache", &self.cache)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a variable is present but invalid,
    /// or when `CENTRAL_VET_API_BASE_URL` is missing in production
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup(ENV_ENVIRONMENT)
            .map(|v| Environment::from_str_or_default(&v))
            .unwrap_or_default();

        let raw_url = match lookup(ENV_API_BASE_URL) {
            Some(url) => url,
            None if environment.is_production() => {
                return Err(AppError::config(format!(
                    "{ENV_API_BASE_URL} must be set in production"
                )));
            }
            None => {
                warn!("{ENV_API_BASE_URL} not set, using {DEFAULT_API_BASE_URL}");
                DEFAULT_API_BASE_URL.to_owned()
            }
        };
        let api_base_url = Url::parse(&raw_url).map_err(|e| {
            AppError::config(format!("invalid {ENV_API_BASE_URL} `{raw_url}`: {e}"))
        })?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(AppError::config(format!(
                "{ENV_API_BASE_URL} must use http or https"
            )));
        }

        let http = HttpClientConfig {
            timeout_secs: parse_positive(&lookup, ENV_HTTP_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)?,
            connect_timeout_secs: parse_positive(
                &lookup,
                ENV_HTTP_CONNECT_TIMEOUT_SECS,
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        };

        let fps = parse_positive(&lookup, ENV_SCAN_FPS, u64::from(scanner::DEFAULT_FPS))?;
        if fps > u64::from(scanner::MAX_FPS) {
            return Err(AppError::config(format!(
                "{ENV_SCAN_FPS} must be at most {}",
                scanner::MAX_FPS
            )));
        }

        let face = FaceConfig {
            detect_interval: Duration::from_millis(parse_positive(
                &lookup,
                ENV_FACE_DETECT_INTERVAL_MS,
                face::DEFAULT_DETECT_INTERVAL_MS,
            )?),
            model_url: lookup(ENV_FACE_MODEL_URL)
                .unwrap_or_else(|| face::DEFAULT_MODEL_URL.to_owned()),
            max_faces: face::MAX_FACES,
        };

        let cache = QueryCacheConfig {
            stale_after: Duration::from_secs(parse_positive(
                &lookup,
                ENV_PETS_STALE_SECS,
                cache::DEFAULT_STALE_SECS,
            )?),
            max_entries: cache::DEFAULT_MAX_ENTRIES,
        };

        let config = Self {
            environment,
            api_base_url,
            http,
            scanner: ScannerConfig {
                fps: u32::try_from(fps).unwrap_or(scanner::DEFAULT_FPS),
            },
            face,
            cache,
            access_token: lookup(ENV_ACCESS_TOKEN).filter(|t| !t.trim().is_empty()),
        };

        info!(
            environment = %config.environment,
            api = %config.api_base_url,
            "client configuration loaded"
        );
        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            api_base_url: Url::parse(DEFAULT_API_BASE_URL)
                .unwrap_or_else(|_| unreachable!("default API URL is valid")),
            http: HttpClientConfig::default(),
            scanner: ScannerConfig::default(),
            face: FaceConfig::default(),
            cache: QueryCacheConfig::default(),
            access_token: None,
        }
    }
}

fn parse_positive<F>(lookup: &F, key: &str, default: u64) -> AppResult<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(AppError::config(format!(
                "{key} must be a positive integer, got `{raw}`"
            ))),
            Ok(value) => Ok(value),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_in_development() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.http, HttpClientConfig::default());
        assert_eq!(config.scanner.fps, scanner::DEFAULT_FPS);
        assert_eq!(config.face.detect_interval, Duration::from_millis(80));
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_production_requires_api_url() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_ENVIRONMENT, "production")]))
            .unwrap_err();
        assert!(err.message.contains(ENV_API_BASE_URL));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_API_BASE_URL, "https://vet.example.org"),
            (ENV_SCAN_FPS, "5"),
            (ENV_FACE_DETECT_INTERVAL_MS, "120"),
            (ENV_PETS_STALE_SECS, "30"),
            (ENV_ACCESS_TOKEN, "tok"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url.host_str(), Some("vet.example.org"));
        assert_eq!(config.scanner.fps, 5);
        assert_eq!(config.face.detect_interval, Duration::from_millis(120));
        assert_eq!(config.cache.stale_after, Duration::from_secs(30));
        assert_eq!(config.access_token.as_deref(), Some("tok"));
        assert!(!format!("{config:?}").contains("tok\""));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ClientConfig::from_lookup(lookup_from(&[(ENV_SCAN_FPS, "0")])).is_err());
        assert!(ClientConfig::from_lookup(lookup_from(&[(ENV_SCAN_FPS, "120")])).is_err());
        assert!(
            ClientConfig::from_lookup(lookup_from(&[(ENV_HTTP_TIMEOUT_SECS, "soon")])).is_err()
        );
        assert!(ClientConfig::from_lookup(lookup_from(&[(ENV_API_BASE_URL, "ftp://x")])).is_err());
    }
}
