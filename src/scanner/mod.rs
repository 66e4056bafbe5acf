// ABOUTME: QR scanning adapter turning camera frames into one decoded payload per session
// ABOUTME: Holds the scanner tuning and the decoder seam wrapping the QR decoding library
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! # QR scanner
//!
//! [`QrScanner`] owns the rear camera stream while a scan session runs. The
//! frame loop hands each frame to a [`QrDecoder`] at a fixed rate and stops
//! the stream as soon as one payload decodes, so a session never yields two.

mod session;

pub use session::{PendingDecode, QrScanner};

use crate::camera::Frame;
use central_vet_core::constants::scanner;
use std::time::Duration;

/// Scanner tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Decode attempts per second
    pub fps: u32,
}

impl ScannerConfig {
    /// Period between two decode attempts
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            fps: scanner::DEFAULT_FPS,
        }
    }
}

/// QR decoding library seam
pub trait QrDecoder: Send + Sync {
    /// Text of the QR code visible in `frame`, if any
    fn decode(&self, frame: &Frame) -> Option<String>;
}

/// Decoder for frames whose bytes already are the decoded text
///
/// Pairs with `camera::ScriptedCamera`; blank frames decode to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl QrDecoder for TextDecoder {
    fn decode(&self, frame: &Frame) -> Option<String> {
        if frame.data.is_empty() {
            return None;
        }
        String::from_utf8(frame.data.clone()).ok()
    }
}
