// ABOUTME: Camera device and video stream seams shared by the QR scanner and face capture
// ABOUTME: A stream is exclusively owned by whoever opened it and must be stopped to release the device
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! # Camera
//!
//! The platform camera is an external collaborator. Implementations of
//! [`CameraDevice`] wrap whatever capture API the host offers; the client
//! only needs frames and a way to stop every track of the stream.

mod scripted;

pub use scripted::{ScriptedCamera, DEFAULT_FRAME_INTERVAL};

use async_trait::async_trait;
use crate::errors::UserFacing;
use central_vet_core::constants::messages;
use thiserror::Error;

/// Which camera to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Rear camera, used to scan QR codes
    Environment,
    /// Front camera, used for face capture
    User,
}

/// One captured video frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Encoded frame bytes
    pub data: Vec<u8>,
}

impl Frame {
    /// Frame with the given size and bytes
    #[must_use]
    pub const fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }
}

/// Failures acquiring or reading a camera
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    /// The user or the platform refused camera access
    #[error("camera permission denied")]
    PermissionDenied,

    /// No camera, or the device is busy or broken
    #[error("camera unavailable: {0}")]
    Unavailable(String),

    /// The stream stopped delivering frames
    #[error("camera stream ended")]
    StreamEnded,

    /// No scan session is running
    #[error("camera is not active")]
    Inactive,
}

impl UserFacing for CameraError {
    fn user_message(&self) -> String {
        messages::CAMERA_UNAVAILABLE.to_owned()
    }
}

/// A camera that can be opened
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Acquire a live stream from the camera facing `facing`
    async fn open(&self, facing: Facing) -> Result<Box<dyn VideoStream>, CameraError>;
}

/// A live camera stream
#[async_trait]
pub trait VideoStream: Send {
    /// Wait for the next frame
    async fn next_frame(&mut self) -> Result<Frame, CameraError>;

    /// Stop every track of the stream; idempotent
    fn stop(&mut self);

    /// Whether any track is still live
    fn is_live(&self) -> bool;
}
