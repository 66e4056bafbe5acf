// ABOUTME: Wire and domain models for the Central Vet clinic API
// ABOUTME: Re-exports pet, user, clinic and vet registration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! # Data Models
//!
//! Wire DTOs mirror the JSON of the clinic API (camelCase). Shapes that vary
//! with the viewer are validated into enums at the boundary:
//!
//! - `PublicPetDto` → [`PetSummary`], keyed by `accessLevelEnum`
//! - `PetListItemDto` → [`PetListItem`], keyed by the viewer's [`Role`]

mod clinic;
mod pet;
mod user;
mod vet;

pub use clinic::ClinicDto;
pub use pet::{
    parse_birthdate, AccessLevel, EditCodeResponse, EditLevel, ImportPetRequest, OwnerContact,
    OwnerDetail, PetListExtra, PetListItem, PetListItemDto, PetProfile, PetStatus, PetSummary,
    PublicPetDto, RecordAccess, Sex, Visibility,
};
pub use user::{Role, UserDto};
pub use vet::RegisterVetWithFaceRequest;
