// ABOUTME: Face-capture adapter used by vet registration: model loading, live and still detection
// ABOUTME: The landmark model is an external collaborator behind the loader and landmarker traits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! # Face capture
//!
//! A vet registers with a photo that must contain exactly one face. The landmark
//! model is fetched from a remote asset in the background; until it is
//! ready every capture is refused with [`FaceError::ModelLoading`].
//!
//! Capture comes from two sources: an uploaded image ([`FaceCaptureAdapter::analyze`])
//! or the front camera (`start_camera` then `take_photo`). Either way the
//! result is a [`FaceCaptureArtifact`] whose `face_valid` flag gates
//! submission.

mod adapter;
mod image;

pub use adapter::{FaceCaptureAdapter, LiveDetection};
pub use image::{EncodedImage, FaceCaptureArtifact, LandmarkOverlay, Point};

use crate::camera::CameraError;
use crate::errors::UserFacing;
use async_trait::async_trait;
use central_vet_core::constants::{face, messages};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Face-capture tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceConfig {
    /// Minimum interval between two live detections
    pub detect_interval: Duration,
    /// Landmark model asset
    pub model_url: String,
    /// Faces the model is asked to report per image
    pub max_faces: usize,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            detect_interval: Duration::from_millis(face::DEFAULT_DETECT_INTERVAL_MS),
            model_url: face::DEFAULT_MODEL_URL.to_owned(),
            max_faces: face::MAX_FACES,
        }
    }
}

/// Landmarks of one detected face, normalized to `[0, 1]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FaceLandmarks {
    /// Landmark points
    pub points: Vec<Point>,
}

/// Face-capture failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FaceError {
    /// The model has not finished loading
    #[error("face model is still loading")]
    ModelLoading,

    /// The model could not be loaded
    #[error("face model failed to load: {0}")]
    ModelFailed(String),

    /// Camera acquisition or reading failed
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// The landmarker failed on an image
    #[error("face detection failed: {0}")]
    Detection(String),

    /// The supplied image could not be read
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

impl UserFacing for FaceError {
    fn user_message(&self) -> String {
        match self {
            Self::ModelLoading => messages::FACE_MODEL_LOADING.to_owned(),
            Self::ModelFailed(_) => messages::FACE_MODEL_FAILED.to_owned(),
            Self::Camera(e) => e.user_message(),
            Self::Detection(_) | Self::InvalidImage(_) => self.to_string(),
        }
    }
}

/// Loads the landmark model from its remote asset
#[async_trait]
pub trait LandmarkerLoader: Send + Sync {
    /// Load the model at `model_url`, configured to report up to `max_faces` faces
    async fn load(
        &self,
        model_url: &str,
        max_faces: usize,
    ) -> Result<Arc<dyn FaceLandmarker>, FaceError>;
}

/// A loaded face-landmark model
pub trait FaceLandmarker: Send + Sync {
    /// Faces found in `image`
    ///
    /// A capture is valid only when exactly one face comes back, whatever
    /// limit the model was loaded with.
    ///
    /// # Errors
    ///
    /// Returns `FaceError::Detection` when the model cannot process the image
    fn detect(&self, image: &EncodedImage) -> Result<Vec<FaceLandmarks>, FaceError>;
}
