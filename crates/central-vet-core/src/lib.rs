// ABOUTME: Core types and constants for the Central Vet clinic client
// ABOUTME: Foundation crate with error handling, wire models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

#![deny(unsafe_code)]

//! # Central Vet Core
//!
//! Foundation crate shared by the Central Vet client library. It holds the
//! pieces that change rarely: the error taxonomy, the wire models of the
//! clinic API, and constants.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode` and the structured remote `ApiError`
//! - **models**: pets, users, clinics and vet registration payloads
//! - **constants**: API paths, query keys and user-facing messages

/// Unified error handling with standard error codes
pub mod errors;

/// API paths, cache keys and user-facing messages
pub mod constants;

/// Wire and domain models for the clinic API
pub mod models;
