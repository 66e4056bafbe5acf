// ABOUTME: Scripted camera that replays queued frame payloads instead of real hardware
// ABOUTME: Drives the CLI and tests and reports how many streams are still live
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use super::{CameraDevice, CameraError, Facing, Frame, VideoStream};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

/// Frame period of a scripted stream (~30 fps)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);

struct Script {
    payloads: Mutex<VecDeque<Vec<u8>>>,
    failure: Option<CameraError>,
    frame_interval: Duration,
    live: AtomicUsize,
    opened: AtomicUsize,
    frames: AtomicUsize,
}

/// Camera replaying queued payloads, one per frame
///
/// Frames without a queued payload are blank (nothing in view). Clones share
/// the same queue and counters.
#[derive(Clone)]
pub struct ScriptedCamera {
    script: Arc<Script>,
}

impl ScriptedCamera {
    /// Camera delivering a frame every `frame_interval`
    #[must_use]
    pub fn new(frame_interval: Duration) -> Self {
        Self::build(frame_interval, None)
    }

    /// Camera whose every `open` fails with `error`
    #[must_use]
    pub fn failing(error: CameraError) -> Self {
        Self::build(DEFAULT_FRAME_INTERVAL, Some(error))
    }

    fn build(frame_interval: Duration, failure: Option<CameraError>) -> Self {
        Self {
            script: Arc::new(Script {
                payloads: Mutex::new(VecDeque::new()),
                failure,
                frame_interval,
                live: AtomicUsize::new(0),
                opened: AtomicUsize::new(0),
                frames: AtomicUsize::new(0),
            }),
        }
    }

    /// Queue a payload to appear in an upcoming frame
    pub fn show(&self, payload: impl Into<Vec<u8>>) {
        if let Ok(mut queue) = self.script.payloads.lock() {
            queue.push_back(payload.into());
        }
    }

    /// Streams opened and not yet stopped
    #[must_use]
    pub fn live_streams(&self) -> usize {
        self.script.live.load(Ordering::SeqCst)
    }

    /// Streams opened so far
    #[must_use]
    pub fn opened(&self) -> usize {
        self.script.opened.load(Ordering::SeqCst)
    }

    /// Frames delivered across all streams
    #[must_use]
    pub fn frames_delivered(&self) -> usize {
        self.script.frames.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedCamera {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

#[async_trait]
impl CameraDevice for ScriptedCamera {
    async fn open(&self, facing: Facing) -> Result<Box<dyn VideoStream>, CameraError> {
        if let Some(error) = &self.script.failure {
            return Err(error.clone());
        }
        self.script.opened.fetch_add(1, Ordering::SeqCst);
        self.script.live.fetch_add(1, Ordering::SeqCst);
        debug!(?facing, "scripted camera opened");
        Ok(Box::new(ScriptedStream {
            script: Arc::clone(&self.script),
            live: true,
        }))
    }
}

struct ScriptedStream {
    script: Arc<Script>,
    live: bool,
}

#[async_trait]
impl VideoStream for ScriptedStream {
    async fn next_frame(&mut self) -> Result<Frame, CameraError> {
        if !self.live {
            return Err(CameraError::StreamEnded);
        }
        tokio::time::sleep(self.script.frame_interval).await;
        let payload = self
            .script
            .payloads
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_default();
        self.script.frames.fetch_add(1, Ordering::SeqCst);
        Ok(Frame::new(FRAME_WIDTH, FRAME_HEIGHT, payload))
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.script.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.stop();
    }
}
