// ABOUTME: Encoded capture images, data URL conversion and the landmark overlay in pixel space
// ABOUTME: FaceCaptureArtifact bundles the image with its face-valid verdict
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use super::{FaceError, FaceLandmarks};
use crate::camera::Frame;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use central_vet_core::constants::{face, messages};

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

/// Encoded image with its pixel size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// MIME type, e.g. `image/jpeg`
    pub mime: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Encoded bytes
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    /// Image from a captured camera frame
    #[must_use]
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            mime: face::CAPTURE_MIME.to_owned(),
            width: frame.width,
            height: frame.height,
            bytes: frame.data.clone(),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URL
    ///
    /// # Errors
    ///
    /// Returns `FaceError::InvalidImage` on a malformed URL or payload
    pub fn from_data_url(url: &str, width: u32, height: u32) -> Result<Self, FaceError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| FaceError::InvalidImage("not a data URL".to_owned()))?;
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| FaceError::InvalidImage("data URL is not base64".to_owned()))?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| FaceError::InvalidImage(e.to_string()))?;
        Ok(Self {
            mime: mime.to_owned(),
            width,
            height,
            bytes,
        })
    }

    /// `data:` URL as sent in `faceBase64`
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Landmarks of the first face scaled to image pixels, for drawing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkOverlay {
    /// Overlay width in pixels
    pub width: u32,
    /// Overlay height in pixels
    pub height: u32,
    /// Landmark positions in pixels
    pub points: Vec<Point>,
}

impl LandmarkOverlay {
    /// Scale normalized landmarks to a `width` × `height` image
    #[must_use]
    pub fn scaled(landmarks: &FaceLandmarks, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self {
            width,
            height,
            points: landmarks
                .points
                .iter()
                .map(|p| Point {
                    x: p.x * w,
                    y: p.y * h,
                })
                .collect(),
        }
    }
}

/// Result of a face capture
#[derive(Debug, Clone, PartialEq)]
pub struct FaceCaptureArtifact {
    /// The captured or uploaded image
    pub image: EncodedImage,
    /// Exactly one face was found in the image
    pub face_valid: bool,
    /// Landmarks of the face, when exactly one was found
    pub overlay: Option<LandmarkOverlay>,
    /// Notice to show when the image holds no face or several
    pub notice: Option<&'static str>,
}

impl FaceCaptureArtifact {
    pub(super) fn from_detection(
        image: EncodedImage,
        faces: &[FaceLandmarks],
        no_face_notice: &'static str,
    ) -> Self {
        match faces {
            [only] => Self {
                overlay: Some(LandmarkOverlay::scaled(only, image.width, image.height)),
                image,
                face_valid: true,
                notice: None,
            },
            [] => Self {
                image,
                face_valid: false,
                overlay: None,
                notice: Some(no_face_notice),
            },
            _ => Self {
                image,
                face_valid: false,
                overlay: None,
                notice: Some(messages::MULTIPLE_FACES),
            },
        }
    }

    /// Image as a `data:` URL
    #[must_use]
    pub fn data_url(&self) -> String {
        self.image.to_data_url()
    }
}
