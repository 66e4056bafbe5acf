// ABOUTME: Clinic API seams consumed by the QR flow and the vet registration form
// ABOUTME: Traits hide the HTTP client so flows can run against in-memory fakes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! # Clinic API
//!
//! [`PetApi`] is the narrow surface the import flow needs; [`AccountApi`]
//! covers the calls made around login and registration. [`ApiClient`]
//! implements both over HTTP and adds the read-only pet queries that go
//! through the query cache.

mod client;

pub use client::ApiClient;

use crate::errors::ApiResult;
use async_trait::async_trait;
use central_vet_core::models::{
    ClinicDto, ImportPetRequest, PetSummary, RegisterVetWithFaceRequest, UserDto,
};

/// Pet lookup and import
#[async_trait]
pub trait PetApi: Send + Sync {
    /// Fetch a pet by its QR token, validated for the current viewer
    async fn lookup_by_token(&self, token: &str) -> ApiResult<PetSummary>;

    /// Claim a pet with its edit code
    async fn import_pet(&self, request: &ImportPetRequest) -> ApiResult<()>;
}

/// Session and registration calls
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Current user
    async fn whoami(&self) -> ApiResult<UserDto>;

    /// Clinics a vet may register with
    async fn clinics(&self) -> ApiResult<Vec<ClinicDto>>;

    /// Register a vet account together with a face image
    async fn register_vet_with_face(&self, request: &RegisterVetWithFaceRequest) -> ApiResult<()>;
}
