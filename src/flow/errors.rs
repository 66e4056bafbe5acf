// ABOUTME: Errors of the scan/import flow and their inline notice texts
// ABOUTME: None of them close the flow; the current step stays active
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use super::mode::{FlowAction, FlowState};
use crate::camera::CameraError;
use crate::errors::{ApiError, AppError, ErrorCode, UserFacing};
use central_vet_core::constants::messages;
use thiserror::Error;

/// Scan/import flow failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlowError {
    /// Decoded text holds no UUID
    #[error("decoded text contains no pet token")]
    InvalidToken,

    /// Submit with an empty edit code
    #[error("edit code is empty")]
    EmptyEditCode,

    /// Lookup by token failed
    #[error("pet lookup failed: {0}")]
    LookupFailed(#[source] ApiError),

    /// Import rejected by the server
    #[error("import rejected: {message}")]
    ImportRejected {
        /// Server message, or the generic fallback
        message: String,
        /// Underlying API failure
        #[source]
        source: ApiError,
    },

    /// Import is not offered for this pet in this mode
    #[error("import is not offered for this pet")]
    ImportNotAllowed,

    /// Camera could not be used
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// The step already has a request in flight
    #[error("a request for this step is still running")]
    Busy,

    /// The flow was reset or closed while a request ran
    #[error("result discarded after the flow was reset")]
    Cancelled,

    /// The flow is closed
    #[error("flow is closed")]
    Closed,

    /// Scanning was requested away from the scan step
    #[error("scanning is only available at step scan, not {state}")]
    NotScanning {
        /// Current step
        state: FlowState,
    },

    /// Action not available at the current step
    #[error("`{action:?}` is not available at step {state}")]
    InvalidTransition {
        /// Current step
        state: FlowState,
        /// Rejected action
        action: FlowAction,
    },
}

impl UserFacing for FlowError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidToken => messages::INVALID_QR.to_owned(),
            Self::EmptyEditCode => messages::EDIT_CODE_REQUIRED.to_owned(),
            Self::LookupFailed(_) => messages::PET_NOT_FOUND.to_owned(),
            Self::ImportRejected { message, .. } => message.clone(),
            Self::ImportNotAllowed => messages::IMPORT_NOT_ALLOWED.to_owned(),
            Self::Camera(e) => e.user_message(),
            Self::Busy => messages::BUSY.to_owned(),
            Self::Cancelled
            | Self::Closed
            | Self::NotScanning { .. }
            | Self::InvalidTransition { .. } => self.to_string(),
        }
    }
}

impl From<FlowError> for AppError {
    fn from(error: FlowError) -> Self {
        match error {
            FlowError::LookupFailed(api) | FlowError::ImportRejected { source: api, .. } => {
                api.into()
            }
            FlowError::Camera(e) => Self::unavailable(e.to_string()).with_source(e),
            FlowError::Busy => Self::new(ErrorCode::ResourceLocked, error.to_string()),
            other => Self::invalid_input(other.user_message()),
        }
    }
}
