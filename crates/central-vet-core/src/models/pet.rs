// ABOUTME: Pet wire DTOs and the validated PetSummary union keyed by access level
// ABOUTME: Role-shaped pet list items, import request and owner/edit-code payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use super::clinic::ClinicDto;
use super::user::Role;
use crate::errors::{ApiError, ApiResult};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Health/lifecycle status of a pet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PetStatus {
    /// Healthy, at home
    Ok,
    /// Reported lost; owner contact is public
    Lost,
    /// Under treatment
    Sick,
    /// Deceased
    Deceased,
}

/// Biological sex of a pet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    /// Male
    Male,
    /// Female
    Female,
    /// Not recorded
    Unknown,
}

/// Who may see a pet record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Only the public projection is visible
    PublicOnly,
    /// Visible to owner and clinic only
    Private,
    /// Fully public
    Public,
}

/// Capability tag describing what the current viewer may edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessLevel {
    /// Full clinical access (vet)
    #[serde(rename = "FULL")]
    Full,
    /// May add records but not change identity fields
    #[serde(rename = "WRITE")]
    Write,
    /// Read-only public projection
    #[serde(rename = "NONE")]
    NoAccess,
    /// Viewer is the owner of the record
    #[serde(rename = "FULL_OWNER")]
    FullOwner,
}

/// Edit rights of a non-owner viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditLevel {
    /// `WRITE`
    Write,
    /// `FULL`
    Full,
}

/// Pet as returned by `GET /api/public/pets/qr/{token}`
///
/// Every field is optional on the wire because the shape depends on the
/// viewer; [`PetSummary::try_from`] validates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPetDto {
    /// Pet id
    pub id: Option<i64>,
    /// Pet name
    pub name: Option<String>,
    /// Species
    pub species: Option<String>,
    /// Breed
    pub breed: Option<String>,
    /// Sex
    pub sex: Option<Sex>,
    /// Status
    pub status: Option<PetStatus>,
    /// ISO date or datetime
    pub birthdate: Option<String>,
    /// Visibility
    pub visibility: Option<Visibility>,
    /// Home clinic
    pub clinic: Option<ClinicDto>,
    /// Owner display name
    pub owner_name: Option<String>,
    /// Owner phone
    pub owner_contact: Option<String>,
    /// Owner e-mail
    pub owner_email: Option<String>,
    /// True when no owner has claimed the record yet
    pub can_be_imported: Option<bool>,
    /// Capability tag for the current viewer
    pub access_level_enum: Option<AccessLevel>,
    /// QR token of the record
    pub qr_code_token: Option<String>,
}

/// Owner contact fields exposed with a pet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerContact {
    /// Display name
    pub name: Option<String>,
    /// Phone number as entered by the owner
    pub phone: Option<String>,
    /// E-mail address
    pub email: Option<String>,
}

/// Validated projection of a pet shared by every access level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetProfile {
    /// Pet id
    pub id: i64,
    /// Pet name
    pub name: String,
    /// Species
    pub species: String,
    /// Breed
    pub breed: Option<String>,
    /// Sex
    pub sex: Sex,
    /// Status
    pub status: PetStatus,
    /// Birth date
    pub birthdate: Option<NaiveDate>,
    /// Visibility
    pub visibility: Option<Visibility>,
    /// Home clinic
    pub clinic: Option<ClinicDto>,
    /// Owner contact
    pub owner: OwnerContact,
    /// True when no owner has claimed the record yet
    pub can_be_imported: bool,
}

/// Pet fetched by QR token, discriminated by the viewer's capability
#[derive(Debug, Clone, PartialEq)]
pub enum PetSummary {
    /// `NONE`: public projection only
    Public(PetProfile),
    /// `WRITE` / `FULL`: a clinic with edit rights
    Editable {
        /// Pet data
        pet: PetProfile,
        /// Granted rights
        level: EditLevel,
    },
    /// `FULL_OWNER`: the viewer owns the record
    Owned(PetProfile),
}

impl PetSummary {
    /// Shared pet data
    #[must_use]
    pub const fn profile(&self) -> &PetProfile {
        match self {
            Self::Public(pet) | Self::Editable { pet, .. } | Self::Owned(pet) => pet,
        }
    }

    /// Consume into the shared pet data
    #[must_use]
    pub fn into_profile(self) -> PetProfile {
        match self {
            Self::Public(pet) | Self::Editable { pet, .. } | Self::Owned(pet) => pet,
        }
    }

    /// Capability tag this summary was built from
    #[must_use]
    pub const fn access_level(&self) -> AccessLevel {
        match self {
            Self::Public(_) => AccessLevel::NoAccess,
            Self::Editable {
                level: EditLevel::Write,
                ..
            } => AccessLevel::Write,
            Self::Editable {
                level: EditLevel::Full,
                ..
            } => AccessLevel::Full,
            Self::Owned(_) => AccessLevel::FullOwner,
        }
    }

    /// Server flag: the record has no claiming owner
    #[must_use]
    pub const fn can_be_imported(&self) -> bool {
        self.profile().can_be_imported
    }

    /// Pet is reported lost
    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.profile().status == PetStatus::Lost
    }
}

impl TryFrom<PublicPetDto> for PetSummary {
    type Error = ApiError;

    fn try_from(dto: PublicPetDto) -> ApiResult<Self> {
        let access = dto
            .access_level_enum
            .ok_or_else(|| missing("accessLevelEnum"))?;
        let birthdate = dto.birthdate.as_deref().map(parse_birthdate).transpose()?;

        let profile = PetProfile {
            id: dto.id.ok_or_else(|| missing("id"))?,
            name: dto.name.filter(|n| !n.is_empty()).ok_or_else(|| missing("name"))?,
            species: dto.species.ok_or_else(|| missing("species"))?,
            breed: dto.breed,
            sex: dto.sex.unwrap_or(Sex::Unknown),
            status: dto.status.ok_or_else(|| missing("status"))?,
            birthdate,
            visibility: dto.visibility,
            clinic: dto.clinic,
            owner: OwnerContact {
                name: dto.owner_name,
                phone: dto.owner_contact,
                email: dto.owner_email,
            },
            can_be_imported: dto.can_be_imported.unwrap_or(false),
        };

        Ok(match access {
            AccessLevel::NoAccess => Self::Public(profile),
            AccessLevel::Write => Self::Editable {
                pet: profile,
                level: EditLevel::Write,
            },
            AccessLevel::Full => Self::Editable {
                pet: profile,
                level: EditLevel::Full,
            },
            AccessLevel::FullOwner => Self::Owned(profile),
        })
    }
}

fn missing(field: &str) -> ApiError {
    ApiError::InvalidData(format!("pet response is missing `{field}`"))
}

/// Parse a birth date sent either as `YYYY-MM-DD` or as an RFC 3339 datetime
///
/// # Errors
///
/// Returns `ApiError::InvalidData` when neither format matches
pub fn parse_birthdate(raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .or_else(|_| {
            raw.get(..10)
                .ok_or(())
                .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|_| ()))
        })
        .map_err(|()| ApiError::InvalidData(format!("invalid birthdate `{raw}`")))
}

/// Clinical access a vet holds on a listed pet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordAccess {
    /// Read only
    ReadOnly,
    /// May write records
    Write,
    /// Full access
    Full,
}

/// Pet as listed by `GET /api/pets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetListItemDto {
    /// Pet id
    pub id: i64,
    /// Pet name
    pub name: String,
    /// Species
    pub species: String,
    /// Breed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    /// Status
    pub status: PetStatus,
    /// ISO date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    /// Sent to vets only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    /// Sent to vets only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<RecordAccess>,
    /// Sent to owners only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_clinic: Option<String>,
}

/// Role-specific columns of a pet list row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetListExtra {
    /// Vet view: who owns it and what the clinic may do
    Vet {
        /// Owner display name
        owner_name: Option<String>,
        /// Clinic access on the record
        access: Option<RecordAccess>,
    },
    /// Owner view: where the pet is treated
    Owner {
        /// Home clinic name
        home_clinic: Option<String>,
    },
    /// Admin view: common columns only
    Admin,
}

/// Pet list row projected for the viewer's role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetListItem {
    /// Pet id
    pub id: i64,
    /// Pet name
    pub name: String,
    /// Species
    pub species: String,
    /// Breed
    pub breed: Option<String>,
    /// Status
    pub status: PetStatus,
    /// Birth date
    pub birthdate: Option<NaiveDate>,
    /// Role-specific columns
    pub extra: PetListExtra,
}

impl PetListItem {
    /// Project a wire row for the given role
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidData` when the birth date is malformed
    pub fn from_dto(dto: PetListItemDto, role: Role) -> ApiResult<Self> {
        let birthdate = dto.birthdate.as_deref().map(parse_birthdate).transpose()?;
        let extra = match role {
            Role::Vet => PetListExtra::Vet {
                owner_name: dto.owner_name,
                access: dto.access_level,
            },
            Role::PetOwner => PetListExtra::Owner {
                home_clinic: dto.home_clinic,
            },
            Role::Admin => PetListExtra::Admin,
        };
        Ok(Self {
            id: dto.id,
            name: dto.name,
            species: dto.species,
            breed: dto.breed,
            status: dto.status,
            birthdate,
            extra,
        })
    }
}

/// Body of `POST /api/pets/import`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPetRequest {
    /// QR token of the record to claim
    pub qr_code_token: String,
    /// Shared secret proving the right to claim
    pub edit_code: String,
}

/// Owner of a pet as returned by `GET /api/pets/{id}/owner`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDetail {
    /// Owner id
    pub id: i64,
    /// Full name
    pub full_name: String,
    /// E-mail
    pub email: String,
    /// Phone
    pub phone: String,
}

/// Body of `GET /api/pets/{id}/edit-code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCodeResponse {
    /// Current edit code of the pet
    pub edit_code: i64,
}
