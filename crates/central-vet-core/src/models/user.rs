// ABOUTME: Authenticated user model and role enumeration
// ABOUTME: Role is resolved by the whoami call and passed into the QR flow as context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform administrator
    Admin,
    /// Veterinarian attached to a clinic
    Vet,
    /// Pet owner
    PetOwner,
}

impl Role {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Vet => "VET",
            Self::PetOwner => "PET_OWNER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current user as returned by `GET /api/auth/whoami`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// User id
    pub id: i64,
    /// Login name
    pub username: String,
    /// Role
    pub role_name: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whoami_payload() {
        let user: UserDto =
            serde_json::from_str(r#"{"id":3,"username":"dra.soto","roleName":"VET"}"#).unwrap();
        assert_eq!(user.role_name, Role::Vet);
        assert_eq!(user.role_name.to_string(), "VET");
    }
}
