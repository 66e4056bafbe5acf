// ABOUTME: Shared HTTP client with connection pooling for clinic API calls
// ABOUTME: Singleton configured once at startup from HttpClientConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use crate::config::HttpClientConfig;
use reqwest::{Client, ClientBuilder};
use std::sync::OnceLock;
use std::time::Duration;

/// Configured timeouts for the shared client
static CLIENT_TIMEOUTS: OnceLock<HttpClientConfig> = OnceLock::new();

/// Global shared HTTP client
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Record the timeout configuration for the shared client
///
/// Must run before the first [`shared_client`] call to take effect; later
/// calls are ignored. Without it the defaults of `HttpClientConfig` apply.
pub fn initialize_shared_client(config: HttpClientConfig) {
    let _ = CLIENT_TIMEOUTS.set(config);
}

/// Shared HTTP client for clinic API calls
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let config = CLIENT_TIMEOUTS.get().copied().unwrap_or_default();
        build_client(&config)
    })
}

/// Build a dedicated client with the given timeouts
#[must_use]
pub fn build_client(config: &HttpClientConfig) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(concat!("central-vet/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}
