// ABOUTME: Face-capture adapter: background model load, throttled live detection, still capture
// ABOUTME: Owns the front camera stream while the live preview runs and releases it on stop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use super::{EncodedImage, FaceCaptureArtifact, FaceConfig, FaceError, FaceLandmarker, LandmarkerLoader};
use crate::camera::{CameraDevice, CameraError, Facing, VideoStream};
use central_vet_core::constants::messages;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
enum ModelState {
    Loading,
    Ready(Arc<dyn FaceLandmarker>),
    Failed(String),
}

/// Latest verdict of the live preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiveDetection {
    /// Exactly one face is in view
    pub face_valid: bool,
    /// Notice to show under the preview
    pub notice: Option<&'static str>,
}

impl LiveDetection {
    fn from_count(faces: Option<usize>) -> Self {
        match faces {
            Some(1) => Self {
                face_valid: true,
                notice: None,
            },
            Some(n) if n > 1 => Self {
                face_valid: false,
                notice: Some(messages::MULTIPLE_FACES),
            },
            _ => Self {
                face_valid: false,
                notice: Some(messages::NO_FACE_LIVE),
            },
        }
    }
}

struct LiveSession {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Option<Box<dyn VideoStream>>>,
}

/// Face-capture adapter
pub struct FaceCaptureAdapter {
    config: FaceConfig,
    camera: Arc<dyn CameraDevice>,
    model: watch::Receiver<ModelState>,
    detection: watch::Sender<LiveDetection>,
    live: Option<LiveSession>,
}

impl FaceCaptureAdapter {
    /// Create the adapter and start loading the model in the background
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(
        config: FaceConfig,
        camera: Arc<dyn CameraDevice>,
        loader: Arc<dyn LandmarkerLoader>,
    ) -> Self {
        let (model_tx, model_rx) = watch::channel(ModelState::Loading);
        let model_url = config.model_url.clone();
        let max_faces = config.max_faces;
        tokio::spawn(async move {
            let state = match loader.load(&model_url, max_faces).await {
                Ok(landmarker) => {
                    info!(model = %model_url, "face model loaded");
                    ModelState::Ready(landmarker)
                }
                Err(e) => {
                    error!(model = %model_url, error = %e, "face model failed to load");
                    ModelState::Failed(e.to_string())
                }
            };
            let _ = model_tx.send(state);
        });

        let (detection, _) = watch::channel(LiveDetection::default());
        Self {
            config,
            camera,
            model: model_rx,
            detection,
            live: None,
        }
    }

    /// Whether the model finished loading
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.model.borrow(), ModelState::Ready(_))
    }

    /// Wait until the model is loaded
    ///
    /// # Errors
    ///
    /// Returns `FaceError::ModelFailed` when loading failed
    pub async fn wait_ready(&self) -> Result<(), FaceError> {
        let mut model = self.model.clone();
        loop {
            let state = model.borrow_and_update().clone();
            match state {
                ModelState::Ready(_) => return Ok(()),
                ModelState::Failed(reason) => return Err(FaceError::ModelFailed(reason)),
                ModelState::Loading => {}
            }
            if model.changed().await.is_err() {
                return Err(FaceError::ModelFailed("model loader stopped".to_owned()));
            }
        }
    }

    fn landmarker(&self) -> Result<Arc<dyn FaceLandmarker>, FaceError> {
        match &*self.model.borrow() {
            ModelState::Ready(landmarker) => Ok(Arc::clone(landmarker)),
            ModelState::Loading => Err(FaceError::ModelLoading),
            ModelState::Failed(reason) => Err(FaceError::ModelFailed(reason.clone())),
        }
    }

    /// Run still detection on an uploaded image
    ///
    /// # Errors
    ///
    /// Returns `FaceError::ModelLoading` before the model is ready, or the
    /// landmarker failure
    pub fn analyze(&self, image: EncodedImage) -> Result<FaceCaptureArtifact, FaceError> {
        let landmarker = self.landmarker()?;
        let faces = landmarker.detect(&image)?;
        debug!(faces = faces.len(), "analyzed uploaded image");
        Ok(FaceCaptureArtifact::from_detection(
            image,
            &faces,
            messages::NO_FACE_UPLOAD,
        ))
    }

    /// Open the front camera and run live detection
    ///
    /// Returns a receiver of the live verdict, refreshed at most once per
    /// `detect_interval`. It holds no notice until the first detection ran.
    ///
    /// # Errors
    ///
    /// Returns `FaceError::ModelLoading` before the model is ready, or the
    /// camera failure
    pub async fn start_camera(&mut self) -> Result<watch::Receiver<LiveDetection>, FaceError> {
        let landmarker = self.landmarker()?;
        self.stop_camera().await;

        let stream = self.camera.open(Facing::User).await?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(live_detection(
            stream,
            landmarker,
            self.config.detect_interval,
            shutdown_rx,
            self.detection.clone(),
        ));
        self.live = Some(LiveSession {
            shutdown: shutdown_tx,
            task,
        });
        info!("face camera started");
        Ok(self.detection.subscribe())
    }

    /// Capture the current frame, stop the camera and run still detection
    ///
    /// # Errors
    ///
    /// Returns `FaceError::ModelLoading` before the model is ready,
    /// `CameraError::Inactive` when the camera is not running, or the
    /// camera/landmarker failure
    pub async fn take_photo(&mut self) -> Result<FaceCaptureArtifact, FaceError> {
        let landmarker = self.landmarker()?;
        let mut stream = self.halt_live().await.ok_or(CameraError::Inactive)?;
        let frame = stream.next_frame().await;
        stream.stop();
        let image = EncodedImage::from_frame(&frame?);

        let faces = landmarker.detect(&image)?;
        debug!(faces = faces.len(), "analyzed captured photo");
        Ok(FaceCaptureArtifact::from_detection(
            image,
            &faces,
            messages::NO_FACE_PHOTO,
        ))
    }

    /// Stop the camera, releasing every track
    pub async fn stop_camera(&mut self) {
        if let Some(mut stream) = self.halt_live().await {
            stream.stop();
            debug!("face camera stopped");
        }
    }

    /// Whether the live preview runs
    #[must_use]
    pub fn camera_active(&self) -> bool {
        self.live.as_ref().is_some_and(|s| !s.task.is_finished())
    }

    async fn halt_live(&mut self) -> Option<Box<dyn VideoStream>> {
        let session = self.live.take()?;
        let _ = session.shutdown.send(());
        self.detection.send_replace(LiveDetection::default());
        match session.task.await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "live detection task ended abnormally");
                None
            }
        }
    }
}

impl Drop for FaceCaptureAdapter {
    fn drop(&mut self) {
        if let Some(session) = self.live.take() {
            let _ = session.shutdown.send(());
        }
    }
}

async fn live_detection(
    mut stream: Box<dyn VideoStream>,
    landmarker: Arc<dyn FaceLandmarker>,
    interval: Duration,
    mut shutdown: oneshot::Receiver<()>,
    detection: watch::Sender<LiveDetection>,
) -> Option<Box<dyn VideoStream>> {
    let mut last_detection: Option<Instant> = None;
    loop {
        tokio::select! {
            _ = &mut shutdown => return Some(stream),
            frame = stream.next_frame() => match frame {
                Ok(frame) => {
                    if last_detection.is_some_and(|at| at.elapsed() < interval) {
                        continue;
                    }
                    last_detection = Some(Instant::now());
                    let faces = landmarker
                        .detect(&EncodedImage::from_frame(&frame))
                        .map(|faces| faces.len());
                    if let Err(e) = &faces {
                        debug!(error = %e, "live detection failed on a frame");
                    }
                    let verdict = LiveDetection::from_count(faces.ok());
                    detection.send_if_modified(|current| {
                        let changed = *current != verdict;
                        *current = verdict;
                        changed
                    });
                }
                Err(e) => {
                    warn!(error = %e, "face camera stream failed");
                    stream.stop();
                    detection.send_replace(LiveDetection::default());
                    return None;
                }
            },
        }
    }
}
