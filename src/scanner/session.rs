// ABOUTME: Scan session lifecycle: acquire the rear camera, run the decode loop, release on stop
// ABOUTME: The decoded payload travels over a oneshot channel so it is delivered at most once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use super::{QrDecoder, ScannerConfig};
use crate::camera::{CameraDevice, CameraError, Facing, VideoStream};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Payload of a running scan session, awaited without borrowing the scanner
#[derive(Debug)]
pub struct PendingDecode {
    receiver: oneshot::Receiver<Result<String, CameraError>>,
}

impl PendingDecode {
    /// Wait for the session's decoded text
    ///
    /// # Errors
    ///
    /// Returns `CameraError::StreamEnded` when the session stopped first, or
    /// the camera failure that ended it
    pub async fn recv(self) -> Result<String, CameraError> {
        self.receiver
            .await
            .unwrap_or(Err(CameraError::StreamEnded))
    }
}

struct ScanSession {
    shutdown: oneshot::Sender<()>,
    pending: Option<PendingDecode>,
    task: JoinHandle<()>,
}

/// Camera/decoder adapter
pub struct QrScanner {
    camera: Arc<dyn CameraDevice>,
    decoder: Arc<dyn QrDecoder>,
    config: ScannerConfig,
    session: Option<ScanSession>,
}

impl QrScanner {
    /// Scanner over the given camera and decoder
    #[must_use]
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        decoder: Arc<dyn QrDecoder>,
        config: ScannerConfig,
    ) -> Self {
        Self {
            camera,
            decoder,
            config,
            session: None,
        }
    }

    /// Start a scan session, stopping any previous one first
    ///
    /// # Errors
    ///
    /// Returns the camera failure when the stream cannot be acquired
    pub async fn start(&mut self) -> Result<(), CameraError> {
        self.stop().await;
        let stream = self.camera.open(Facing::Environment).await?;
        self.attach(stream).await;
        Ok(())
    }

    /// Camera the scanner opens, for acquiring a stream without holding the scanner
    #[must_use]
    pub fn device(&self) -> Arc<dyn CameraDevice> {
        Arc::clone(&self.camera)
    }

    /// Start a session over a stream acquired through [`Self::device`],
    /// stopping any previous one first
    pub async fn attach(&mut self, stream: Box<dyn VideoStream>) {
        self.stop().await;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (decoded_tx, decoded_rx) = oneshot::channel();
        let task = tokio::spawn(run_session(
            stream,
            Arc::clone(&self.decoder),
            self.config.frame_interval(),
            shutdown_rx,
            decoded_tx,
        ));

        self.session = Some(ScanSession {
            shutdown: shutdown_tx,
            pending: Some(PendingDecode {
                receiver: decoded_rx,
            }),
            task,
        });
        info!(fps = self.config.fps, "QR scan session started");
    }

    /// Take the current session's payload receiver
    ///
    /// Returns `None` when no session runs or its payload was already taken.
    pub fn take_pending(&mut self) -> Option<PendingDecode> {
        self.session.as_mut().and_then(|s| s.pending.take())
    }

    /// Wait for the current session's decoded payload
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Inactive` when no session runs or its payload
    /// was already consumed, otherwise see [`PendingDecode::recv`]
    pub async fn next_decoded(&mut self) -> Result<String, CameraError> {
        self.take_pending()
            .ok_or(CameraError::Inactive)?
            .recv()
            .await
    }

    /// Stop the session and wait until its camera tracks are released
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let _ = session.shutdown.send(());
        if let Err(e) = session.task.await {
            warn!(error = %e, "scan session task ended abnormally");
        }
        debug!("QR scan session stopped");
    }

    /// Whether a session is still reading frames
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }
}

impl Drop for QrScanner {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            let _ = session.shutdown.send(());
        }
    }
}

async fn run_session(
    mut stream: Box<dyn VideoStream>,
    decoder: Arc<dyn QrDecoder>,
    period: Duration,
    mut shutdown: oneshot::Receiver<()>,
    decoded: oneshot::Sender<Result<String, CameraError>>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let outcome = loop {
        tokio::select! {
            _ = &mut shutdown => break None,
            _ = ticker.tick() => match stream.next_frame().await {
                Ok(frame) => {
                    if let Some(text) = decoder.decode(&frame) {
                        debug!(len = text.len(), "QR code decoded");
                        break Some(Ok(text));
                    }
                }
                Err(e) => {
                    warn!(error = %e, "camera stream failed during scan");
                    break Some(Err(e));
                }
            },
        }
    };

    stream.stop();
    if let Some(result) = outcome {
        let _ = decoded.send(result);
    }
}
