// ABOUTME: Vet registration payload carrying the captured face image
// ABOUTME: Debug output redacts the password and the image body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of `POST /api/auth/vet-with-face`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVetWithFaceRequest {
    /// Login name
    pub username: String,
    /// E-mail
    pub email: String,
    /// Password
    pub password: String,
    /// First name
    pub firstname: String,
    /// Last name
    pub lastname: String,
    /// Clinic id, as a string
    pub clinic_id: String,
    /// Mobile phone
    pub cel_num: String,
    /// Captured face as a data URL
    pub face_base64: String,
}

impl fmt::Debug for RegisterVetWithFaceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterVetWithFaceRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("clinic_id", &self.clinic_id)
            .field("cel_num", &self.cel_num)
            .field("face_base64", &format_args!("<{} bytes>", self.face_base64.len()))
            .finish()
    }
}
