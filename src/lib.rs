// ABOUTME: Main library entry point for the Central Vet client
// ABOUTME: QR scan and pet import flow, camera and face-capture adapters, clinic API client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

#![deny(unsafe_code)]

//! # Central Vet client
//!
//! Client side of the Central Vet platform where pet owners, veterinarians
//! and administrators manage pets. The stateful part is the QR workflow:
//! scan a pet tag, look the pet up, and claim it with its edit code when the
//! signed-in role allows it.
//!
//! ## Architecture
//!
//! - **Camera / Scanner**: frame source and QR decoding, one payload per session
//! - **Face**: landmark-model adapter used by vet registration
//! - **Flow**: the `Scan → Info → Edit → Done` state machine
//! - **Modal**: provider keeping a single flow open
//! - **API**: `reqwest` client for the clinic API with a query cache
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use central_vet::api::ApiClient;
//! use central_vet::auth::SessionToken;
//! use central_vet::config::ClientConfig;
//! use std::sync::Arc;
//!
//! # async fn run() -> central_vet::errors::AppResult<()> {
//! let config = ClientConfig::from_env()?;
//! let session = Arc::new(SessionToken::anonymous());
//! let api = ApiClient::from_config(&config, session);
//! # let _ = api;
//! # Ok(())
//! # }
//! ```

/// Clinic API traits and HTTP client
pub mod api;

/// Session token handling
pub mod auth;

/// Query cache for API reads
pub mod cache;

/// Camera device and stream seams
pub mod camera;

/// Environment configuration
pub mod config;

/// Error types and the inline notice seam
pub mod errors;

/// Face-capture adapter
pub mod face;

/// QR scan/import flow
pub mod flow;

/// Shared HTTP client
pub mod http_client;

/// Tracing subscriber setup
pub mod logging;

/// QR modal provider
pub mod modal;

/// Public pet page helpers
pub mod public_pet;

/// Vet registration wizard
pub mod registration;

/// QR scanning adapter
pub mod scanner;

pub use central_vet_core::{constants, models};
