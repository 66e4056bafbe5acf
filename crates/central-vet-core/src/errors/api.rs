// ABOUTME: Structured error type for calls against the remote clinic API
// ABOUTME: Keeps the HTTP status and the server-provided message for inline display
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use super::{AppError, ErrorCode};
use serde::Deserialize;
use thiserror::Error;

/// Error body returned by the clinic API on failure
///
/// Only `message` is relied upon; other fields the backend adds are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable failure description
    #[serde(default)]
    pub message: Option<String>,
}

/// Errors returned by the remote clinic API
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The requested record does not exist (HTTP 404)
    #[error("{resource} not found")]
    NotFound {
        /// What was looked up
        resource: String,
    },

    /// The session is missing or expired (HTTP 401)
    #[error("authentication required")]
    Unauthorized,

    /// The server rejected the request (4xx other than 401/404)
    #[error("request rejected with status {status}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message provided by the server, if any
        message: Option<String>,
    },

    /// The server failed to process the request (5xx)
    #[error("server error {status}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message provided by the server, if any
        message: Option<String>,
    },

    /// The request never produced a response
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The response decoded but violates the expected shape
    #[error("invalid data from API: {0}")]
    InvalidData(String),
}

impl ApiError {
    /// Build an error from a non-success status and its raw body
    #[must_use]
    pub fn from_status(status: u16, resource: &str, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());

        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound {
                resource: resource.to_owned(),
            },
            400..=499 => Self::Rejected { status, message },
            _ => Self::Server { status, message },
        }
    }

    /// The message the server attached to this failure, if any
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } | Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Server message when present, otherwise the given fallback
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message().unwrap_or(fallback)
    }

    /// HTTP status of the failed response, if there was one
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Unauthorized => Some(401),
            Self::Rejected { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Network(_) | Self::Parse(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ApiError> for AppError {
    fn from(error: ApiError) -> Self {
        let code = match &error {
            ApiError::NotFound { .. } => ErrorCode::ResourceNotFound,
            ApiError::Unauthorized => ErrorCode::AuthRequired,
            ApiError::Rejected { status: 403, .. } => ErrorCode::PermissionDenied,
            ApiError::Rejected { .. } => ErrorCode::InvalidInput,
            ApiError::Server { .. } => ErrorCode::ExternalServiceError,
            ApiError::Network(_) => ErrorCode::ExternalServiceUnavailable,
            ApiError::Parse(_) | ApiError::InvalidData(_) => ErrorCode::SerializationError,
        };
        let message = error
            .server_message()
            .map_or_else(|| error.to_string(), str::to_owned);
        Self::new(code, message).with_source(error)
    }
}

#[cfg(feature = "http-errors")]
impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Parse(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

/// Result alias for remote API calls
pub type ApiResult<T> = Result<T, ApiError>;
