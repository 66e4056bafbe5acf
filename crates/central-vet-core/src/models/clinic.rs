// ABOUTME: Clinic registry model returned by the clinic API
// ABOUTME: Used as a pet's home clinic and by the vet registration clinic picker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use serde::{Deserialize, Serialize};

/// Registered veterinary clinic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicDto {
    /// Clinic id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Street address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Contact e-mail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
