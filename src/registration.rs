// ABOUTME: Two-step vet registration: account fields first, then a face capture
// ABOUTME: Submission is refused until the captured image holds a detected face
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! # Vet registration
//!
//! Step one collects the account fields and the clinic; step two captures a
//! face through [`FaceCaptureAdapter`]. The form keeps its values when going
//! back and forth between steps and is cleared after a successful submit or
//! an explicit [`VetRegistration::reset`].

use crate::api::AccountApi;
use crate::errors::{ApiError, UserFacing};
use crate::face::{EncodedImage, FaceCaptureAdapter, FaceCaptureArtifact, FaceError};
use central_vet_core::constants::messages;
use central_vet_core::models::{ClinicDto, RegisterVetWithFaceRequest};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::{info, warn};

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 6;

const REQUIRED: &str = "Requerido";
const PASSWORD_TOO_SHORT: &str = "Mínimo 6 caracteres";
const INVALID_EMAIL: &str = "Formato inválido";
const CLINIC_REQUIRED: &str = "Elige clínica";

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Account fields of step one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VetAccountForm {
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
    /// Mobile phone, optional
    pub cel_num: String,
    /// Chosen clinic
    pub clinic_id: Option<i64>,
}

/// A field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    /// Field name
    pub field: &'static str,
    /// Message shown under the field
    pub message: &'static str,
}

impl VetAccountForm {
    /// Validation failures, empty when the step may advance
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let mut fail = |field, message| errors.push(FieldError { field, message });

        if self.username.trim().is_empty() {
            fail("username", REQUIRED);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            fail("password", PASSWORD_TOO_SHORT);
        }
        let email = self.email.trim();
        if email.is_empty() {
            fail("email", REQUIRED);
        } else if !EMAIL_PATTERN.as_ref().is_some_and(|re| re.is_match(email)) {
            fail("email", INVALID_EMAIL);
        }
        if self.firstname.trim().is_empty() {
            fail("firstname", REQUIRED);
        }
        if self.lastname.trim().is_empty() {
            fail("lastname", REQUIRED);
        }
        if self.clinic_id.is_none() {
            fail("clinicId", CLINIC_REQUIRED);
        }
        errors
    }
}

/// Step of the registration wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    /// Account fields
    Account,
    /// Face capture
    Face,
}

/// Registration failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// Some account fields are invalid
    #[error("{} invalid field(s)", .0.len())]
    InvalidFields(Vec<FieldError>),

    /// No capture, or the capture holds no face
    #[error("a capture with a detected face is required")]
    FaceRequired,

    /// Operation not available at the current step
    #[error("not available at step {0:?}")]
    WrongStep(RegistrationStep),

    /// Face capture failed
    #[error(transparent)]
    Face(#[from] FaceError),

    /// The API refused or failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl UserFacing for RegistrationError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFields(fields) => fields
                .first()
                .map_or_else(|| self.to_string(), |f| f.message.to_owned()),
            Self::FaceRequired => messages::FACE_REQUIRED.to_owned(),
            Self::WrongStep(_) => self.to_string(),
            Self::Face(e) => e.user_message(),
            Self::Api(e) => e.user_message(),
        }
    }
}

/// Vet registration wizard
pub struct VetRegistration {
    api: Arc<dyn AccountApi>,
    step: RegistrationStep,
    form: VetAccountForm,
    capture: Option<FaceCaptureArtifact>,
    clinics: Vec<ClinicDto>,
}

impl VetRegistration {
    /// Empty wizard at step one
    #[must_use]
    pub fn new(api: Arc<dyn AccountApi>) -> Self {
        Self {
            api,
            step: RegistrationStep::Account,
            form: VetAccountForm::default(),
            capture: None,
            clinics: Vec::new(),
        }
    }

    /// Fetch the clinic picker options
    ///
    /// # Errors
    ///
    /// Returns the API failure
    pub async fn load_clinics(&mut self) -> Result<&[ClinicDto], RegistrationError> {
        self.clinics = self.api.clinics().await?;
        Ok(&self.clinics)
    }

    /// Clinics loaded so far
    #[must_use]
    pub fn clinics(&self) -> &[ClinicDto] {
        &self.clinics
    }

    /// Current step
    #[must_use]
    pub const fn step(&self) -> RegistrationStep {
        self.step
    }

    /// Account fields
    #[must_use]
    pub const fn form(&self) -> &VetAccountForm {
        &self.form
    }

    /// Account fields, editable
    pub fn form_mut(&mut self) -> &mut VetAccountForm {
        &mut self.form
    }

    /// Current capture
    #[must_use]
    pub const fn capture(&self) -> Option<&FaceCaptureArtifact> {
        self.capture.as_ref()
    }

    /// Step one → step two once the fields validate
    ///
    /// # Errors
    ///
    /// `RegistrationError::InvalidFields` with every failing field
    pub fn advance(&mut self) -> Result<(), RegistrationError> {
        if self.step != RegistrationStep::Account {
            return Err(RegistrationError::WrongStep(self.step));
        }
        let errors = self.form.validate();
        if !errors.is_empty() {
            return Err(RegistrationError::InvalidFields(errors));
        }
        self.step = RegistrationStep::Face;
        Ok(())
    }

    /// Step two → step one, keeping fields and capture
    pub fn back(&mut self) {
        self.step = RegistrationStep::Account;
    }

    /// Keep `artifact` as the capture; returns whether it holds exactly one face
    pub fn attach_capture(&mut self, artifact: FaceCaptureArtifact) -> bool {
        let valid = artifact.face_valid;
        self.capture = Some(artifact);
        valid
    }

    /// Analyze an uploaded image and keep it as the capture
    ///
    /// # Errors
    ///
    /// `RegistrationError::Face` when the model is not ready or detection fails
    pub fn capture_upload(
        &mut self,
        adapter: &FaceCaptureAdapter,
        image: EncodedImage,
    ) -> Result<bool, RegistrationError> {
        let artifact = adapter.analyze(image)?;
        Ok(self.attach_capture(artifact))
    }

    /// Take a photo with the running camera and keep it as the capture
    ///
    /// # Errors
    ///
    /// `RegistrationError::Face` when the model is not ready, the camera is
    /// off or detection fails
    pub async fn capture_photo(
        &mut self,
        adapter: &mut FaceCaptureAdapter,
    ) -> Result<bool, RegistrationError> {
        let artifact = adapter.take_photo().await?;
        Ok(self.attach_capture(artifact))
    }

    /// Drop the capture, e.g. before retaking it
    pub fn clear_capture(&mut self) {
        self.capture = None;
    }

    /// Submit the registration
    ///
    /// # Errors
    ///
    /// - `RegistrationError::WrongStep` before step two
    /// - `RegistrationError::InvalidFields` if fields changed since step one
    /// - `RegistrationError::FaceRequired` without a capture holding a face
    /// - `RegistrationError::Api` when the server refuses; the form is kept
    pub async fn submit(&mut self) -> Result<(), RegistrationError> {
        if self.step != RegistrationStep::Face {
            return Err(RegistrationError::WrongStep(self.step));
        }
        let errors = self.form.validate();
        if !errors.is_empty() {
            return Err(RegistrationError::InvalidFields(errors));
        }
        let face = match &self.capture {
            Some(artifact) if artifact.face_valid => artifact.data_url(),
            _ => return Err(RegistrationError::FaceRequired),
        };
        let Some(clinic_id) = self.form.clinic_id else {
            return Err(RegistrationError::InvalidFields(vec![FieldError {
                field: "clinicId",
                message: CLINIC_REQUIRED,
            }]));
        };

        let request = RegisterVetWithFaceRequest {
            username: self.form.username.trim().to_owned(),
            email: self.form.email.trim().to_owned(),
            password: self.form.password.clone(),
            firstname: self.form.firstname.trim().to_owned(),
            lastname: self.form.lastname.trim().to_owned(),
            clinic_id: clinic_id.to_string(),
            cel_num: self.form.cel_num.trim().to_owned(),
            face_base64: face,
        };

        if let Err(e) = self.api.register_vet_with_face(&request).await {
            warn!(error = %e, "vet registration rejected");
            return Err(e.into());
        }
        info!(username = %request.username, "vet registered");
        self.reset();
        Ok(())
    }

    /// Clear every field and the capture, back to step one
    pub fn reset(&mut self) {
        self.step = RegistrationStep::Account;
        self.form = VetAccountForm::default();
        self.capture = None;
    }
}
