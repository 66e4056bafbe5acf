// ABOUTME: Error re-exports for the client crate and the inline notice seam
// ABOUTME: Domain errors of the flow and adapters implement UserFacing for UI display
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! # Error Handling
//!
//! The application-wide [`AppError`] and the remote [`ApiError`] live in
//! `central-vet-core` and are re-exported here. Module errors
//! (`FlowError`, `CameraError`, `FaceError`) are local `thiserror` enums and
//! convert into `AppError` at the edges.

pub use central_vet_core::errors::api::ApiErrorBody;
pub use central_vet_core::errors::{ApiError, ApiResult, AppError, AppResult, ErrorCode};

/// Errors that carry a message meant for the person in front of the screen
///
/// Nothing the flow or the adapters raise is fatal; the UI shows this text
/// inline and keeps the current step.
pub trait UserFacing {
    /// Inline notice text
    fn user_message(&self) -> String;
}

impl UserFacing for ApiError {
    fn user_message(&self) -> String {
        self.server_message()
            .map_or_else(|| self.to_string(), str::to_owned)
    }
}
