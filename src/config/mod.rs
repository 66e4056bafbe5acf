// ABOUTME: Configuration module for the Central Vet client
// ABOUTME: Environment-only settings for API access, adapters and caching
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! Configuration module
//!
//! - **Environment**: client configuration from environment variables

/// Environment-based client configuration
pub mod environment;

pub use environment::{ClientConfig, Environment, HttpClientConfig};
